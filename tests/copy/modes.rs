//! Single-root and explicit-destination runs, lifecycle and construction

use super::support::*;
use crm_record_copy::crm::{FilterDefinition, QueryTableNode};
use crm_record_copy::{
    CopyError, CopyOutcome, CopyState, RecordCopy, RecordIdentification, RequestOption,
    ViewReference,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

const DESTINATION: &str = "FI.00000099";

fn company_only_filter() -> FilterDefinition {
    FilterDefinition::new(
        "CopyCompanyOnly",
        QueryTableNode::new("FI").with_field_value(2, "Copy of {Name}"),
    )
}

#[tokio::test]
async fn test_single_root_creates_one_unlinked_root() {
    let backend = Arc::new(company_backend());

    let records = copy_single_root(&backend, "CopyCompany", COMPANY, params(&[]))
        .await
        .result
        .unwrap();

    let roots: Vec<_> = records.iter().filter(|r| r.info_area_id == "FI").collect();
    assert_eq!(roots.len(), 1);
    assert!(roots[0].links.is_empty());
    assert_eq!(records.len(), 6);
}

#[tokio::test]
async fn test_explicit_destination_creates_no_root() {
    let backend = Arc::new(company_backend());

    let report = copy_into_destination(&backend, "CopyCompany", COMPANY, DESTINATION).await;
    let records = report.result.unwrap();

    assert_eq!(
        summarize(&records, 2),
        vec![
            ("KP".to_string(), "Smith".to_string()),
            ("KP".to_string(), "Doe".to_string()),
            ("MA".to_string(), String::new()),
            ("MA".to_string(), String::new()),
            ("MA".to_string(), String::new()),
        ]
    );

    let destination = RecordIdentification::from(DESTINATION);
    for contact in &records[..2] {
        assert!(contact.is_linked_to(&destination));
        assert_eq!(contact.links[0].link_id, 0);
    }
    // Activities reach the destination through their new contact
    for activity in &records[2..] {
        let parent = &activity.links[0].target;
        assert!(records[..2].iter().any(|c| &c.identification == parent));
    }

    // The root template is never applied
    assert!(records.iter().all(|r| r.value(2) != Some("Copy of Acme")));
    assert_eq!(backend.issued_requests()[0], ("KP".to_string(), COMPANY.to_string()));
}

#[tokio::test]
async fn test_explicit_destination_without_child_tables_finishes_empty() {
    let backend = Arc::new(company_backend().with_filter(company_only_filter()));

    let report = copy_into_destination(&backend, "CopyCompanyOnly", COMPANY, DESTINATION).await;

    assert!(report.result.unwrap().is_empty());
    assert!(backend.issued_requests().is_empty());
}

#[tokio::test]
async fn test_second_start_is_rejected_while_running() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(
        company_backend()
            .with_filter(company_only_filter())
            .gated(gate.clone()),
    );
    let (delegate, receiver) = CountingDelegate::new();

    let copy = RecordCopy::new("CopyCompanyOnly", services(&backend), delegate.clone())
        .unwrap()
        .with_logger(quiet_logger());

    assert_eq!(copy.state(), CopyState::Idle);
    assert!(copy.start_with_source_record_identification(COMPANY.into(), HashMap::new()));
    assert_eq!(copy.state(), CopyState::Running);
    assert!(copy.is_running());

    assert!(!copy.start_with_source_record_identification(COMPANY.into(), HashMap::new()));
    assert!(!copy.start_with_source_and_destination(
        COMPANY.into(),
        DESTINATION.into(),
        HashMap::new()
    ));

    gate.notify_one();
    let report = receiver.wait().await;

    assert_eq!(report.result.unwrap().len(), 1);
    assert_eq!(copy.state(), CopyState::Finished(CopyOutcome::Success));
    assert_eq!(delegate.finished(), 1);
    assert_eq!(delegate.failed(), 0);
    assert_eq!(backend.issued_requests().len(), 1);
}

#[tokio::test]
async fn test_finished_copy_cannot_restart() {
    let backend = Arc::new(company_backend().with_filter(company_only_filter()));
    let (delegate, receiver) = CountingDelegate::new();

    let copy = RecordCopy::new("CopyCompanyOnly", services(&backend), delegate.clone())
        .unwrap()
        .with_logger(quiet_logger());
    assert!(copy.start_with_source_record_identification(COMPANY.into(), HashMap::new()));
    receiver.wait().await.result.unwrap();

    assert_eq!(copy.state(), CopyState::Finished(CopyOutcome::Success));
    assert!(!copy.start_with_source_record_identification(COMPANY.into(), HashMap::new()));
    assert_eq!(copy.state(), CopyState::Finished(CopyOutcome::Success));
    assert_eq!(delegate.finished(), 1);
    assert_eq!(backend.issued_requests().len(), 1);
}

#[test]
fn test_start_outside_runtime_is_rejected() {
    let backend = Arc::new(company_backend());
    let (delegate, _receiver) = CountingDelegate::new();

    let copy = RecordCopy::new("CopyCompany", services(&backend), delegate).unwrap();

    assert!(!copy.start_with_source_record_identification(COMPANY.into(), HashMap::new()));
    assert_eq!(copy.state(), CopyState::Idle);
}

#[tokio::test]
async fn test_unknown_template_filter_fails_construction() {
    let backend = Arc::new(company_backend());
    let (delegate, _receiver) = CountingDelegate::new();

    let error = match RecordCopy::new("NoSuchFilter", services(&backend), delegate.clone()) {
        Ok(_) => panic!("copy bound to an unknown filter"),
        Err(error) => error,
    };

    assert!(matches!(&error, CopyError::Configuration { filter } if filter == "NoSuchFilter"));
    assert!(error.is_configuration_error());
    assert_eq!(delegate.finished(), 0);
    assert_eq!(delegate.failed(), 0);
}

#[tokio::test]
async fn test_view_reference_requires_template_filter() {
    let backend = Arc::new(company_backend());
    let (delegate, _receiver) = CountingDelegate::new();

    let view = ViewReference::new("RecordCopy").with_argument("TemplateFilter", "");
    let result = RecordCopy::from_view_reference(&view, services(&backend), delegate);

    assert!(matches!(result, Err(CopyError::MissingTemplateFilter)));
}

#[tokio::test]
async fn test_view_reference_applies_request_option() {
    let backend = Arc::new(company_backend());

    let view = ViewReference::new("RecordCopy")
        .with_argument("TemplateFilter", "CopyCompany")
        .with_argument("RequestOption", "online");
    let (delegate, _receiver) = CountingDelegate::new();
    let copy = RecordCopy::from_view_reference(&view, services(&backend), delegate).unwrap();
    assert_eq!(copy.template_filter().name, "CopyCompany");
    assert_eq!(copy.request_option(), RequestOption::Online);

    let view = ViewReference::new("RecordCopy")
        .with_argument("TemplateFilter", "CopyCompany")
        .with_argument("RequestOption", "sometimes");
    let (delegate, _receiver) = CountingDelegate::new();
    let copy = RecordCopy::from_view_reference(&view, services(&backend), delegate).unwrap();
    assert_eq!(copy.request_option(), RequestOption::PreferOffline);
}
