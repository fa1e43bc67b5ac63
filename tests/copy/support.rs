//! Scripted CRM backend and delegates shared by the copy engine tests

use crm_record_copy::copy::{CopyReport, MonitoringConfig};
use crm_record_copy::crm::{
    ConfigurationStore, CrmRecord, FetchRequest, FieldControl, FieldControlMode, FieldDefinition,
    FilterDefinition, LinkReader, QueryError, QueryHandle, QueryResult, QueryService,
    QueryTableNode, RecordIdentification, ResultRow, SearchAndList,
};
use crm_record_copy::{
    ChannelDelegate, CopyError, CopyServices, CopyReceiver, RecordCopy, RecordCopyDelegate,
    SkippedStep,
};
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const COMPANY: &str = "FI.00000001";
pub const CONTACT_SMITH: &str = "KP.00000010";
pub const CONTACT_DOE: &str = "KP.00000011";

pub enum Scripted {
    Rows(Vec<ResultRow>),
    ServerRows(Vec<ResultRow>),
    StartFailure(QueryError),
    RuntimeFailure(QueryError),
}

#[derive(Default)]
pub struct ScriptedBackend {
    filters: HashMap<String, FilterDefinition>,
    searches: HashMap<String, SearchAndList>,
    controls: HashMap<(String, FieldControlMode), FieldControl>,
    responses: HashMap<(String, String), Scripted>,
    links: HashMap<(String, String), RecordIdentification>,
    requests: Mutex<Vec<FetchRequest>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    pub fn with_filter(mut self, filter: FilterDefinition) -> Self {
        self.filters.insert(filter.name.clone(), filter);
        self
    }

    pub fn with_search(mut self, search: SearchAndList) -> Self {
        self.searches.insert(search.name.clone(), search);
        self
    }

    pub fn with_control(mut self, control: FieldControl) -> Self {
        self.controls
            .insert((control.name.clone(), control.mode), control);
        self
    }

    /// Scripted answer for queries of `info_area` linked to `link_record`
    pub fn respond(mut self, info_area: &str, link_record: &str, scripted: Scripted) -> Self {
        self.responses
            .insert((info_area.to_string(), link_record.to_string()), scripted);
        self
    }

    pub fn with_offline_link(mut self, source: &str, link: &str, target: &str) -> Self {
        self.links
            .insert((source.to_string(), link.to_string()), target.into());
        self
    }

    /// Queries stay in flight until the gate is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn issued_requests(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.field_control.info_area_id.clone(), r.link_record.to_string()))
            .collect()
    }
}

impl ConfigurationStore for ScriptedBackend {
    fn filter_by_name(&self, name: &str) -> Option<FilterDefinition> {
        self.filters.get(name).cloned()
    }

    fn search_and_list_by_name(&self, name: &str) -> Option<SearchAndList> {
        self.searches.get(name).cloned()
    }

    fn field_control_by_name(&self, name: &str, mode: FieldControlMode) -> Option<FieldControl> {
        self.controls.get(&(name.to_string(), mode)).cloned()
    }
}

impl QueryService for ScriptedBackend {
    fn execute(&self, request: FetchRequest) -> Result<QueryHandle, QueryError> {
        self.requests.lock().unwrap().push(request.clone());

        let key = (
            request.field_control.info_area_id.clone(),
            request.link_record.to_string(),
        );
        let tables = request.field_control.result_tables();
        let outcome = match self.responses.get(&key) {
            None => Ok(QueryResult::new(tables, Vec::new(), false)),
            Some(Scripted::Rows(rows)) => Ok(QueryResult::new(tables, rows.clone(), false)),
            Some(Scripted::ServerRows(rows)) => Ok(QueryResult::new(tables, rows.clone(), true)),
            Some(Scripted::StartFailure(error)) => return Err(error.clone()),
            Some(Scripted::RuntimeFailure(error)) => Err(error.clone()),
        };

        let gate = self.gate.clone();
        Ok(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            outcome
        }
        .boxed())
    }
}

impl LinkReader for ScriptedBackend {
    fn linked_record(&self, source: &RecordIdentification, link: &str) -> Option<RecordIdentification> {
        self.links
            .get(&(source.to_string(), link.to_string()))
            .cloned()
    }
}

/// Counts callbacks and forwards them to a channel delegate
pub struct CountingDelegate {
    pub finished: AtomicUsize,
    pub failed: AtomicUsize,
    pub skipped: AtomicUsize,
    inner: Arc<ChannelDelegate>,
}

impl CountingDelegate {
    pub fn new() -> (Arc<Self>, CopyReceiver) {
        let (inner, receiver) = ChannelDelegate::new();
        let delegate = Arc::new(Self {
            finished: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            inner,
        });
        (delegate, receiver)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }
}

impl RecordCopyDelegate for CountingDelegate {
    fn record_copy_did_finish(&self, copy: &RecordCopy, records: Vec<CrmRecord>) {
        self.finished.fetch_add(1, Ordering::SeqCst);
        self.inner.record_copy_did_finish(copy, records);
    }

    fn record_copy_did_fail(&self, copy: &RecordCopy, error: CopyError) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.inner.record_copy_did_fail(copy, error);
    }

    fn record_copy_did_skip_step(&self, copy: &RecordCopy, skipped: &SkippedStep) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.inner.record_copy_did_skip_step(copy, skipped);
    }
}

pub fn company_control() -> FieldControl {
    FieldControl::new("FI", FieldControlMode::Edit, "FI")
        .with_field(FieldDefinition::new("FI", 2).with_function("Name"))
        .with_field(FieldDefinition::new("FI", 3).with_function("City"))
}

pub fn contact_control() -> FieldControl {
    FieldControl::new("KP", FieldControlMode::Edit, "KP")
        .with_field(FieldDefinition::new("KP", 2).with_function("LastName"))
        .with_field(FieldDefinition::new("KP", 3))
}

pub fn activity_control() -> FieldControl {
    FieldControl::new("MA", FieldControlMode::Edit, "MA")
        .with_field(FieldDefinition::new("MA", 1).with_function("Subject"))
}

/// Company -> contacts (link 0) -> activities (link 1)
pub fn company_filter() -> FilterDefinition {
    FilterDefinition::new(
        "CopyCompany",
        QueryTableNode::new("FI")
            .with_field_value(2, "Copy of {Name}")
            .with_sub_table(
                QueryTableNode::new("KP")
                    .with_link_id(0)
                    .with_field_value(5, "$Owner")
                    .with_sub_table(QueryTableNode::new("MA").with_link_id(1)),
            ),
    )
}

pub fn row(control: &FieldControl, ids: &[Option<&str>], values: &[&str]) -> ResultRow {
    ResultRow::for_field_control(
        control,
        ids.iter().map(|id| id.map(RecordIdentification::from)).collect(),
        values.iter().map(|v| v.to_string()).collect(),
    )
}

/// Backend answering the company scenario:
/// one company, two contacts, one activity for Smith and two for Doe
pub fn company_backend() -> ScriptedBackend {
    ScriptedBackend::default()
        .with_filter(company_filter())
        .with_control(company_control())
        .with_control(contact_control())
        .with_control(activity_control())
        .respond(
            "FI",
            COMPANY,
            Scripted::Rows(vec![row(&company_control(), &[Some(COMPANY)], &["Acme", "Berlin"])]),
        )
        .respond(
            "KP",
            COMPANY,
            Scripted::Rows(vec![
                row(&contact_control(), &[Some(CONTACT_SMITH)], &["Smith", "John"]),
                row(&contact_control(), &[Some(CONTACT_DOE)], &["Doe", "Jane"]),
            ]),
        )
        .respond(
            "MA",
            CONTACT_SMITH,
            Scripted::Rows(vec![row(&activity_control(), &[Some("MA.00000100")], &["Call"])]),
        )
        .respond(
            "MA",
            CONTACT_DOE,
            Scripted::Rows(vec![
                row(&activity_control(), &[Some("MA.00000101")], &["Visit"]),
                row(&activity_control(), &[Some("MA.00000102")], &["Mail"]),
            ]),
        )
}

pub fn services(backend: &Arc<ScriptedBackend>) -> CopyServices {
    CopyServices::from_backend(backend.clone())
}

pub fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Starts a single-root copy of `source` and waits for its report
pub async fn copy_single_root(
    backend: &Arc<ScriptedBackend>,
    filter: &str,
    source: &str,
    parameters: HashMap<String, String>,
) -> CopyReport {
    let (delegate, receiver) = ChannelDelegate::new();
    let copy = RecordCopy::new(filter, services(backend), delegate)
        .unwrap()
        .with_logger(quiet_logger());
    assert!(copy.start_with_source_record_identification(source.into(), parameters));
    receiver.wait().await
}

/// Starts an explicit-destination copy and waits for its report
pub async fn copy_into_destination(
    backend: &Arc<ScriptedBackend>,
    filter: &str,
    source: &str,
    destination: &str,
) -> CopyReport {
    let (delegate, receiver) = ChannelDelegate::new();
    let copy = RecordCopy::new(filter, services(backend), delegate)
        .unwrap()
        .with_logger(quiet_logger());
    assert!(copy.start_with_source_and_destination(source.into(), destination.into(), HashMap::new()));
    receiver.wait().await
}

pub fn quiet_logger() -> crm_record_copy::copy::CopyLogger {
    crm_record_copy::copy::CopyLogger::new(MonitoringConfig::quiet())
}

/// (info-area, field value) pairs in record order
pub fn summarize(records: &[CrmRecord], field_id: u32) -> Vec<(String, String)> {
    records
        .iter()
        .map(|r| {
            (
                r.info_area_id.clone(),
                r.value(field_id).unwrap_or_default().to_string(),
            )
        })
        .collect()
}
