//! In-process CRM backend answering from a fixture

use super::fixture::{Fixture, StoredRecord};
use crate::crm::{
    ConfigurationStore, FetchRequest, FieldControl, FieldControlMode, FilterDefinition,
    LINK_ID_ANY, LinkReader, QueryError, QueryHandle, QueryResult, QueryService,
    RecordIdentification, RequestOption, ResultRow, ResultTable, SearchAndList,
    parse_link_descriptor,
};
use futures::FutureExt;
use futures::future;
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

/// Configuration store, query service and link reader over one fixture
#[derive(Debug, Clone)]
pub struct OfflineStore {
    fixture: Arc<Fixture>,
    server_mode: bool,
    joined_identifications: bool,
    failing_starts: HashSet<String>,
    failing_queries: HashSet<String>,
}

impl OfflineStore {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture: Arc::new(fixture),
            server_mode: false,
            joined_identifications: true,
            failing_starts: HashSet::new(),
            failing_queries: HashSet::new(),
        }
    }

    /// Answer as if the rows came from the server
    pub fn with_server_mode(mut self, server_mode: bool) -> Self {
        self.server_mode = server_mode;
        self
    }

    /// Leave joined-table identifications out of result rows
    pub fn without_joined_identifications(mut self) -> Self {
        self.joined_identifications = false;
        self
    }

    /// Refuse to start queries for `info_area_id`
    pub fn fail_starts_for(mut self, info_area_id: &str) -> Self {
        self.failing_starts.insert(info_area_id.to_string());
        self
    }

    /// Start queries for `info_area_id` but fail them when awaited
    pub fn fail_queries_for(mut self, info_area_id: &str) -> Self {
        self.failing_queries.insert(info_area_id.to_string());
        self
    }

    fn matching_records(&self, request: &FetchRequest) -> Vec<&StoredRecord> {
        let info_area_id = request.field_control.info_area_id.as_str();

        if request.link_record.info_area_id() == info_area_id {
            return self.fixture.record(&request.link_record).into_iter().collect();
        }

        self.fixture
            .records
            .iter()
            .filter(|record| record.info_area_id() == info_area_id)
            .filter(|record| {
                record.links.iter().any(|link| {
                    link.target == request.link_record
                        && (request.link_id == LINK_ID_ANY || link.link_id == request.link_id)
                })
            })
            .collect()
    }

    fn linked(&self, record: &StoredRecord, table: &ResultTable) -> Option<RecordIdentification> {
        record
            .links
            .iter()
            .find(|link| {
                link.target.info_area_id() == table.info_area_id
                    && (table.link_id == LINK_ID_ANY || link.link_id == table.link_id)
            })
            .map(|link| link.target.clone())
    }

    fn build_row(&self, field_control: &FieldControl, tables: &[ResultTable], record: &StoredRecord) -> ResultRow {
        let joined: Vec<Option<RecordIdentification>> = tables
            .iter()
            .skip(1)
            .map(|table| self.linked(record, table))
            .collect();

        let raw_values = field_control
            .fields
            .iter()
            .map(|field| {
                if field.info_area_id == field_control.info_area_id {
                    return record.value(field.field_id).unwrap_or_default().to_string();
                }
                tables
                    .iter()
                    .skip(1)
                    .position(|t| t.info_area_id == field.info_area_id && t.link_id == field.link_id)
                    .and_then(|index| joined[index].as_ref())
                    .and_then(|id| self.fixture.record(id))
                    .and_then(|linked| linked.value(field.field_id))
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();

        let mut identifications = vec![Some(record.identification.clone())];
        if self.joined_identifications {
            identifications.extend(joined);
        } else {
            identifications.extend(std::iter::repeat_n(None, joined.len()));
        }

        ResultRow::for_field_control(field_control, identifications, raw_values)
    }
}

impl ConfigurationStore for OfflineStore {
    fn filter_by_name(&self, name: &str) -> Option<FilterDefinition> {
        self.fixture.filter(name).cloned()
    }

    fn search_and_list_by_name(&self, name: &str) -> Option<SearchAndList> {
        self.fixture.search_and_list(name).cloned()
    }

    fn field_control_by_name(&self, name: &str, mode: FieldControlMode) -> Option<FieldControl> {
        self.fixture.field_control(name, mode).cloned()
    }
}

impl QueryService for OfflineStore {
    fn execute(&self, request: FetchRequest) -> Result<QueryHandle, QueryError> {
        let info_area_id = request.field_control.info_area_id.clone();

        if self.failing_starts.contains(&info_area_id) {
            return Err(QueryError::Unavailable(format!(
                "no offline data for {}",
                info_area_id
            )));
        }
        if request.request_option == RequestOption::Online && !self.server_mode {
            return Err(QueryError::Unavailable(
                "online request against an offline store".to_string(),
            ));
        }

        if self.failing_queries.contains(&info_area_id) {
            let failure: Result<QueryResult, QueryError> = Err(QueryError::Server {
                status: 500,
                message: format!("query for {} failed", info_area_id),
            });
            return Ok(future::ready(failure).boxed());
        }

        let tables = request.field_control.result_tables();
        let rows = self
            .matching_records(&request)
            .into_iter()
            .map(|record| self.build_row(&request.field_control, &tables, record))
            .collect::<Vec<_>>();

        debug!(
            "Offline query {} linked to {} ({}) returned {} rows",
            info_area_id,
            request.link_record,
            request.link_id,
            rows.len()
        );

        let result: Result<QueryResult, QueryError> =
            Ok(QueryResult::new(tables, rows, self.server_mode));
        Ok(future::ready(result).boxed())
    }
}

impl LinkReader for OfflineStore {
    fn linked_record(
        &self,
        source: &RecordIdentification,
        link: &str,
    ) -> Option<RecordIdentification> {
        let (info_area_id, link_id) = parse_link_descriptor(link)?;
        let table = ResultTable {
            info_area_id: info_area_id.to_string(),
            link_id,
        };
        let record = self.fixture.record(source)?;
        self.linked(record, &table)
    }
}
