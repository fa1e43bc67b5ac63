//! Copy orchestration
//!
//! A `RecordCopy` seeds a FIFO queue of copy steps and runs it on one
//! spawned task: the head step's query is issued, its result turned into
//! records, child steps appended to the end of the queue, and the next head
//! executed. Exactly one query is in flight at any time, so the order of the
//! created records is deterministic (breadth-first, row order within a step).

use super::builder::RecordBuilder;
use super::delegate::RecordCopyDelegate;
use super::error::{CopyError, SkippedStep};
use super::logging::{CopyContext, CopyLogger, CopyStatistics};
use super::step::CopyStep;
use crate::crm::{
    ConfigurationStore, CrmRecord, FilterDefinition, LinkReader, QueryService,
    RecordIdentification, RequestOption,
};
use log::{error, info};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// View-reference argument naming the template filter
pub const TEMPLATE_FILTER_ARGUMENT: &str = "TemplateFilter";

/// View-reference argument overriding the request option
pub const REQUEST_OPTION_ARGUMENT: &str = "RequestOption";

/// The CRM backends a copy talks to
#[derive(Clone)]
pub struct CopyServices {
    pub config_store: Arc<dyn ConfigurationStore>,
    pub query_service: Arc<dyn QueryService>,
    pub link_reader: Arc<dyn LinkReader>,
}

impl CopyServices {
    pub fn new(
        config_store: Arc<dyn ConfigurationStore>,
        query_service: Arc<dyn QueryService>,
        link_reader: Arc<dyn LinkReader>,
    ) -> Self {
        Self {
            config_store,
            query_service,
            link_reader,
        }
    }

    /// All three services from one backend
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ConfigurationStore + QueryService + LinkReader + 'static,
    {
        Self {
            config_store: backend.clone(),
            query_service: backend.clone(),
            link_reader: backend,
        }
    }
}

/// Parameter bag a caller uses to describe a copy
#[derive(Debug, Clone, Default)]
pub struct ViewReference {
    pub view_name: String,
    pub arguments: HashMap<String, String>,
}

impl ViewReference {
    pub fn new(view_name: impl Into<String>) -> Self {
        Self {
            view_name: view_name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .get(name)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Success,
    Error,
}

/// Lifecycle of a `RecordCopy`. There is no way back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    Idle,
    Running,
    Finished(CopyOutcome),
}

/// One copy intent bound to a template filter.
///
/// Clones share the same lifecycle; a finished instance stays finished and
/// must be replaced for the next copy.
#[derive(Clone)]
pub struct RecordCopy {
    template_filter: Arc<FilterDefinition>,
    services: CopyServices,
    delegate: Arc<dyn RecordCopyDelegate>,
    request_option: RequestOption,
    apply_default_values: bool,
    logger: CopyLogger,
    state: Arc<Mutex<CopyState>>,
}

impl RecordCopy {
    /// Binds a copy to the named template filter
    pub fn new(
        template_filter_name: &str,
        services: CopyServices,
        delegate: Arc<dyn RecordCopyDelegate>,
    ) -> Result<Self, CopyError> {
        let template_filter = services
            .config_store
            .filter_by_name(template_filter_name)
            .ok_or_else(|| CopyError::Configuration {
                filter: template_filter_name.to_string(),
            })?;

        Ok(Self {
            template_filter: Arc::new(template_filter),
            services,
            delegate,
            request_option: RequestOption::default(),
            apply_default_values: true,
            logger: CopyLogger::default(),
            state: Arc::new(Mutex::new(CopyState::Idle)),
        })
    }

    /// Binds a copy described by a view reference's `TemplateFilter` and
    /// optional `RequestOption` arguments
    pub fn from_view_reference(
        view_reference: &ViewReference,
        services: CopyServices,
        delegate: Arc<dyn RecordCopyDelegate>,
    ) -> Result<Self, CopyError> {
        let filter_name = view_reference
            .argument(TEMPLATE_FILTER_ARGUMENT)
            .ok_or(CopyError::MissingTemplateFilter)?;

        let mut copy = Self::new(filter_name, services, delegate)?;
        if let Some(option) = view_reference.argument(REQUEST_OPTION_ARGUMENT) {
            match option.parse() {
                Ok(option) => copy.request_option = option,
                Err(e) => log::warn!("Ignoring request option of view '{}': {}", view_reference.view_name, e),
            }
        }
        Ok(copy)
    }

    pub fn with_request_option(mut self, request_option: RequestOption) -> Self {
        self.request_option = request_option;
        self
    }

    /// Whether unresolved `$curDay`-style placeholders take built-in defaults
    pub fn with_apply_default_values(mut self, apply_default_values: bool) -> Self {
        self.apply_default_values = apply_default_values;
        self
    }

    pub fn with_logger(mut self, logger: CopyLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn template_filter(&self) -> &FilterDefinition {
        &self.template_filter
    }

    pub fn request_option(&self) -> RequestOption {
        self.request_option
    }

    pub fn state(&self) -> CopyState {
        *self.lock_state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == CopyState::Running
    }

    /// Copies `source` and the configured dependent records into a new
    /// destination root. Returns false if this instance was already started.
    pub fn start_with_source_record_identification(
        &self,
        source: RecordIdentification,
        parameters: HashMap<String, String>,
    ) -> bool {
        if !self.begin() {
            return false;
        }

        let filter = self
            .template_filter
            .replaced_with_parameters(&parameters, self.apply_default_values);
        let context = self
            .logger
            .start_copy(&filter.name, source.as_str(), "single-root");

        let root_step = CopyStep::resolved(
            self.services.config_store.as_ref(),
            source,
            None,
            filter.root,
        );

        self.spawn_run(VecDeque::from([root_step]), context);
        true
    }

    /// Copies the records below `source` under the existing `destination`.
    /// One step per child table of the filter root is seeded; no root record
    /// is created. Returns false if this instance was already started.
    pub fn start_with_source_and_destination(
        &self,
        source: RecordIdentification,
        destination: RecordIdentification,
        parameters: HashMap<String, String>,
    ) -> bool {
        if !self.begin() {
            return false;
        }

        let filter = self
            .template_filter
            .replaced_with_parameters(&parameters, self.apply_default_values);
        let context = self
            .logger
            .start_copy(&filter.name, source.as_str(), "explicit-destination");

        let destination_root = CrmRecord::from_identification(destination);
        let queue = filter
            .root
            .sub_tables
            .into_iter()
            .map(|table| {
                CopyStep::resolved(
                    self.services.config_store.as_ref(),
                    source.clone(),
                    Some(destination_root.identification.clone()),
                    table,
                )
            })
            .collect();

        self.spawn_run(queue, context);
        true
    }

    fn lock_state(&self) -> MutexGuard<'_, CopyState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// `Idle -> Running`; the only guard against concurrent runs
    fn begin(&self) -> bool {
        if tokio::runtime::Handle::try_current().is_err() {
            error!("Record copy must be started from within a tokio runtime");
            return false;
        }

        let mut state = self.lock_state();
        if *state != CopyState::Idle {
            info!(
                "Record copy for '{}' already started, ignoring start request",
                self.template_filter.name
            );
            return false;
        }
        *state = CopyState::Running;
        true
    }

    fn spawn_run(&self, queue: VecDeque<CopyStep>, context: CopyContext) {
        let run = CopyRun {
            copy: self.clone(),
            queue,
            result_records: Vec::new(),
            statistics: CopyStatistics::default(),
            context,
        };

        tokio::spawn(async move {
            let mut guard = RunGuard {
                copy: run.copy.clone(),
                completed: false,
            };
            let (copy, outcome) = run.execute().await;
            guard.completed = true;
            copy.finish(outcome);
        });
    }

    fn finish(&self, outcome: Result<Vec<CrmRecord>, CopyError>) {
        match outcome {
            Ok(records) => {
                *self.lock_state() = CopyState::Finished(CopyOutcome::Success);
                self.delegate.record_copy_did_finish(self, records);
            }
            Err(error) => {
                *self.lock_state() = CopyState::Finished(CopyOutcome::Error);
                self.delegate.record_copy_did_fail(self, error);
            }
        }
    }
}

/// Reports `Aborted` if the run task unwinds before delivering an outcome
struct RunGuard {
    copy: RecordCopy,
    completed: bool,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.completed {
            error!("Record copy task ended without an outcome");
            self.copy.finish(Err(CopyError::Aborted));
        }
    }
}

/// State owned by the task executing one run
struct CopyRun {
    copy: RecordCopy,
    queue: VecDeque<CopyStep>,
    result_records: Vec<CrmRecord>,
    statistics: CopyStatistics,
    context: CopyContext,
}

impl CopyRun {
    async fn execute(mut self) -> (RecordCopy, Result<Vec<CrmRecord>, CopyError>) {
        let outcome = self.run_queue().await;
        match &outcome {
            Ok(_) => self.copy.logger.copy_finished(&self.context, &self.statistics),
            Err(e) => self.copy.logger.copy_failed(&self.context, e, &self.statistics),
        }
        (self.copy, outcome)
    }

    async fn run_queue(&mut self) -> Result<Vec<CrmRecord>, CopyError> {
        while self.execute_next_step().await? {}
        Ok(std::mem::take(&mut self.result_records))
    }

    /// Runs the queue head. `Ok(false)` once the queue is empty.
    async fn execute_next_step(&mut self) -> Result<bool, CopyError> {
        let Some(step) = self.queue.front() else {
            return Ok(false);
        };

        let Some(request) = step.fetch_request(self.copy.request_option) else {
            self.skip_head();
            return Ok(true);
        };

        self.copy
            .logger
            .step_started(&self.context, step, self.queue.len());
        let info_area_id = step.info_area_id().to_string();
        let source_record = step.source_record_identification.clone();
        let started = Instant::now();

        let handle = self
            .copy
            .services
            .query_service
            .execute(request)
            .map_err(|source| CopyError::QueryStart {
                info_area_id: info_area_id.clone(),
                source_record: source_record.clone(),
                source,
            })?;
        self.statistics.queries_issued += 1;

        let result = handle.await.map_err(|source| CopyError::Query {
            info_area_id,
            source_record,
            source,
        })?;

        // The finished step is always the queue head
        let Some(step) = self.queue.pop_front() else {
            return Ok(false);
        };

        let builder = RecordBuilder::new(
            self.copy.services.config_store.as_ref(),
            self.copy.services.link_reader.as_ref(),
        );
        let processed = builder.process_result(&step, &result);

        self.statistics.steps_executed += 1;
        self.statistics.rows_received += result.len();
        self.statistics.records_built += processed.records.len();
        self.copy.logger.step_completed(
            &self.context,
            &step,
            result.len(),
            processed.child_steps.len(),
            started.elapsed(),
        );

        self.queue.extend(processed.child_steps);
        self.result_records.extend(processed.records);
        Ok(true)
    }

    fn skip_head(&mut self) {
        let Some(step) = self.queue.pop_front() else {
            return;
        };

        let skipped = SkippedStep {
            info_area_id: step.info_area_id().to_string(),
            source_record: step.source_record_identification,
            destination_record: step.destination_record,
            reason: format!(
                "no search-and-list or field control resolved for table {}",
                step.query_table.info_area_id
            ),
        };

        self.statistics.steps_skipped += 1;
        self.copy.logger.step_skipped(&self.context, &skipped);
        self.copy
            .delegate
            .record_copy_did_skip_step(&self.copy, &skipped);
    }
}
