use crate::crm::{QueryError, RecordIdentification};
use thiserror::Error;

/// Fatal copy failures. Any of these ends the run without delivering records.
#[derive(Debug, Clone, Error)]
pub enum CopyError {
    #[error("Template filter '{filter}' could not be resolved")]
    Configuration { filter: String },

    #[error("View reference does not name a template filter")]
    MissingTemplateFilter,

    #[error("Could not start query for {info_area_id} linked to {source_record}: {source}")]
    QueryStart {
        info_area_id: String,
        source_record: RecordIdentification,
        source: QueryError,
    },

    #[error("Query for {info_area_id} linked to {source_record} failed: {source}")]
    Query {
        info_area_id: String,
        source_record: RecordIdentification,
        source: QueryError,
    },

    #[error("Copy ended without delivering an outcome")]
    Aborted,
}

impl CopyError {
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CopyError::Configuration { .. } | CopyError::MissingTemplateFilter
        )
    }
}

/// A step dropped because no fetch configuration resolved for its table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStep {
    pub info_area_id: String,
    pub source_record: RecordIdentification,
    pub destination_record: Option<RecordIdentification>,
    pub reason: String,
}
