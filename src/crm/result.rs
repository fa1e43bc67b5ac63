//! Query results
//!
//! Rows expose raw field values by result position, the record
//! identification of every joined table, and the values of function-tagged
//! fields.

use super::config_store::{FieldControl, ResultTable};
use super::identification::RecordIdentification;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub tables: Vec<ResultTable>,
    pub rows: Vec<ResultRow>,
    /// False when the rows came from local offline data
    pub is_server_response: bool,
}

impl QueryResult {
    pub fn new(tables: Vec<ResultTable>, rows: Vec<ResultRow>, is_server_response: bool) -> Self {
        Self {
            tables,
            rows,
            is_server_response,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultRow {
    pub record_identifications: Vec<Option<RecordIdentification>>,
    pub raw_values: Vec<String>,
    pub function_values: HashMap<String, String>,
}

impl ResultRow {
    /// Builds a row for `field_control`; `raw_values` follow its field order
    /// and function-tagged values are derived from it.
    pub fn for_field_control(
        field_control: &FieldControl,
        record_identifications: Vec<Option<RecordIdentification>>,
        raw_values: Vec<String>,
    ) -> Self {
        let function_values = field_control
            .fields
            .iter()
            .zip(raw_values.iter())
            .filter_map(|(field, value)| {
                field
                    .function
                    .as_ref()
                    .map(|function| (function.clone(), value.clone()))
            })
            .collect();

        Self {
            record_identifications,
            raw_values,
            function_values,
        }
    }

    /// Identification of the row's record in the joined table at `table_index`
    pub fn record_identification(&self, table_index: usize) -> Option<&RecordIdentification> {
        self.record_identifications
            .get(table_index)
            .and_then(|id| id.as_ref())
            .filter(|id| !id.is_empty())
    }

    pub fn root_record_identification(&self) -> Option<&RecordIdentification> {
        self.record_identification(0)
    }

    pub fn raw_value(&self, position: usize) -> Option<&str> {
        self.raw_values.get(position).map(|v| v.as_str())
    }

    pub fn values_by_function(&self) -> &HashMap<String, String> {
        &self.function_values
    }
}
