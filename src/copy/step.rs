//! Copy steps: one pending (source record, query table) unit of work

use super::resolver::resolve_step_configuration;
use crate::crm::{
    ConfigurationStore, FetchRequest, FieldControl, QueryTableNode, RecordIdentification,
    RequestOption, SearchAndList,
};

/// How a step fetches the source field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchConfig {
    /// A named search-and-list and the list field group it points at
    SearchAndList {
        search: SearchAndList,
        field_control: FieldControl,
    },
    /// A field control resolved directly by name
    FieldControl(FieldControl),
    /// Neither resolved; the step is skipped when it reaches the queue head
    Unresolved,
}

impl FetchConfig {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, FetchConfig::Unresolved)
    }

    pub fn field_control(&self) -> Option<&FieldControl> {
        match self {
            FetchConfig::SearchAndList { field_control, .. } => Some(field_control),
            FetchConfig::FieldControl(field_control) => Some(field_control),
            FetchConfig::Unresolved => None,
        }
    }

    pub fn search_and_list(&self) -> Option<&SearchAndList> {
        match self {
            FetchConfig::SearchAndList { search, .. } => Some(search),
            _ => None,
        }
    }

    /// Info-area the fetch returns rows for
    pub fn info_area_id(&self) -> Option<&str> {
        match self {
            FetchConfig::SearchAndList { search, .. } => Some(&search.info_area_id),
            FetchConfig::FieldControl(field_control) => Some(&field_control.info_area_id),
            FetchConfig::Unresolved => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FetchConfig::SearchAndList { search, field_control } => {
                format!("search '{}' ({} {})", search.name, field_control.name, field_control.mode)
            }
            FetchConfig::FieldControl(field_control) => {
                format!("field control '{}' ({})", field_control.name, field_control.mode)
            }
            FetchConfig::Unresolved => "unresolved".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CopyStep {
    /// Existing record whose fields this step reads
    pub source_record_identification: RecordIdentification,
    /// New record the fetched records are attached to; `None` for the step
    /// producing the destination root
    pub destination_record: Option<RecordIdentification>,
    pub query_table: QueryTableNode,
    pub fetch_config: FetchConfig,
}

impl CopyStep {
    /// Step with its fetch configuration resolved against `store`
    pub fn resolved(
        store: &dyn ConfigurationStore,
        source_record_identification: RecordIdentification,
        destination_record: Option<RecordIdentification>,
        query_table: QueryTableNode,
    ) -> Self {
        let fetch_config = resolve_step_configuration(store, &query_table);
        Self {
            source_record_identification,
            destination_record,
            query_table,
            fetch_config,
        }
    }

    pub fn info_area_id(&self) -> &str {
        &self.query_table.info_area_id
    }

    /// Query for this step's source data, `None` when the step has no
    /// usable configuration
    pub fn fetch_request(&self, request_option: RequestOption) -> Option<FetchRequest> {
        let field_control = self.fetch_config.field_control()?;
        Some(FetchRequest {
            search_and_list: self.fetch_config.search_and_list().cloned(),
            field_control: field_control.clone(),
            link_record: self.source_record_identification.clone(),
            link_id: self.query_table.link_id,
            request_option,
        })
    }
}
