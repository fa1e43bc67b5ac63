//! Queue order and record construction for a full company copy

use super::support::*;
use crm_record_copy::CrmRecord;
use std::sync::Arc;

fn describe(record: &CrmRecord) -> (String, String) {
    let field = match record.info_area_id.as_str() {
        "FI" | "KP" => 2,
        _ => 1,
    };
    (
        record.info_area_id.clone(),
        record.value(field).unwrap_or_default().to_string(),
    )
}

#[tokio::test]
async fn test_records_are_built_breadth_first() {
    let backend = Arc::new(company_backend());

    let report = copy_single_root(&backend, "CopyCompany", COMPANY, params(&[("Owner", "ABC")])).await;
    let records = report.result.unwrap();

    let order: Vec<(String, String)> = records.iter().map(describe).collect();
    assert_eq!(
        order,
        vec![
            ("FI".to_string(), "Copy of Acme".to_string()),
            ("KP".to_string(), "Smith".to_string()),
            ("KP".to_string(), "Doe".to_string()),
            ("MA".to_string(), "Call".to_string()),
            ("MA".to_string(), "Visit".to_string()),
            ("MA".to_string(), "Mail".to_string()),
        ]
    );
    assert!(report.skipped.is_empty());
}

#[tokio::test]
async fn test_queries_follow_queue_order() {
    let backend = Arc::new(company_backend());

    copy_single_root(&backend, "CopyCompany", COMPANY, params(&[])).await.result.unwrap();

    assert_eq!(
        backend.issued_requests(),
        vec![
            ("FI".to_string(), COMPANY.to_string()),
            ("KP".to_string(), COMPANY.to_string()),
            ("MA".to_string(), CONTACT_SMITH.to_string()),
            ("MA".to_string(), CONTACT_DOE.to_string()),
        ]
    );
}

#[tokio::test]
async fn test_repeated_runs_produce_identical_order() {
    let first_backend = Arc::new(company_backend());
    let second_backend = Arc::new(company_backend());

    let first = copy_single_root(&first_backend, "CopyCompany", COMPANY, params(&[]))
        .await
        .result
        .unwrap();
    let second = copy_single_root(&second_backend, "CopyCompany", COMPANY, params(&[]))
        .await
        .result
        .unwrap();

    let first: Vec<_> = first.iter().map(describe).collect();
    let second: Vec<_> = second.iter().map(describe).collect();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_children_link_to_their_new_parent() {
    let backend = Arc::new(company_backend());

    let records = copy_single_root(&backend, "CopyCompany", COMPANY, params(&[]))
        .await
        .result
        .unwrap();

    let company = &records[0];
    let smith = &records[1];
    let doe = &records[2];

    assert!(smith.is_linked_to(&company.identification));
    assert!(doe.is_linked_to(&company.identification));
    assert_eq!(smith.link_to_info_area("FI").map(|l| l.link_id), Some(0));

    assert!(records[3].is_linked_to(&smith.identification));
    assert!(records[4].is_linked_to(&doe.identification));
    assert!(records[5].is_linked_to(&doe.identification));
    assert_eq!(records[5].links[0].link_id, 1);
}

#[tokio::test]
async fn test_template_values_and_parameters_are_stamped() {
    let backend = Arc::new(company_backend());

    let records = copy_single_root(&backend, "CopyCompany", COMPANY, params(&[("Owner", "ABC")]))
        .await
        .result
        .unwrap();

    let company = &records[0];
    assert_eq!(company.value(2), Some("Copy of Acme"));
    assert_eq!(company.value(3), Some("Berlin"));

    for contact in &records[1..3] {
        assert_eq!(contact.value(5), Some("ABC"));
    }
    assert_eq!(records[1].value(3), Some("John"));
}

#[tokio::test]
async fn test_missing_parameter_leaves_field_unset() {
    let backend = Arc::new(company_backend());

    let records = copy_single_root(&backend, "CopyCompany", COMPANY, params(&[]))
        .await
        .result
        .unwrap();

    assert_eq!(records[1].value(5), None);
}

#[tokio::test]
async fn test_new_records_get_temporary_identifications() {
    let backend = Arc::new(company_backend());

    let records = copy_single_root(&backend, "CopyCompany", COMPANY, params(&[]))
        .await
        .result
        .unwrap();

    for record in &records {
        assert!(record.identification.is_new_record());
        assert_eq!(record.identification.info_area_id(), record.info_area_id);
    }
}

#[tokio::test]
async fn test_parameter_values_are_stamped_verbatim() {
    let backend = Arc::new(company_backend());

    let records = copy_single_root(&backend, "CopyCompany", COMPANY, params(&[("Owner", "{team}")]))
        .await
        .result
        .unwrap();

    for contact in &records[1..3] {
        assert_eq!(contact.value(5), Some("{team}"));
    }

    let backend = Arc::new(company_backend());
    let records = copy_single_root(&backend, "CopyCompany", COMPANY, params(&[("Owner", "{LastName}")]))
        .await
        .result
        .unwrap();

    assert_eq!(records[1].value(5), Some("{LastName}"));
    assert_eq!(records[1].value(2), Some("Smith"));
}
