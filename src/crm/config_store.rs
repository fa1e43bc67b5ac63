//! Configuration lookups consumed by the copy engine
//!
//! Search-and-list configurations and field controls describe which fields
//! a query fetches; template filters describe what a copy creates.

use super::query_table::{FilterDefinition, LINK_ID_ANY};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldControlMode {
    Edit,
    List,
}

impl fmt::Display for FieldControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldControlMode::Edit => f.write_str("Edit"),
            FieldControlMode::List => f.write_str("List"),
        }
    }
}

/// A named search definition pointing at the field group it lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchAndList {
    pub name: String,
    pub info_area_id: String,
    pub field_group_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub info_area_id: String,
    #[serde(default = "default_link_id")]
    pub link_id: i32,
    pub field_id: u32,
    #[serde(default)]
    pub function: Option<String>,
}

fn default_link_id() -> i32 {
    LINK_ID_ANY
}

impl FieldDefinition {
    pub fn new(info_area_id: impl Into<String>, field_id: u32) -> Self {
        Self {
            info_area_id: info_area_id.into(),
            link_id: LINK_ID_ANY,
            field_id,
            function: None,
        }
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn with_link_id(mut self, link_id: i32) -> Self {
        self.link_id = link_id;
        self
    }
}

/// One joined table of a query: index 0 is the fetched info-area itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    pub info_area_id: String,
    pub link_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldControl {
    pub name: String,
    pub mode: FieldControlMode,
    pub info_area_id: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl FieldControl {
    pub fn new(
        name: impl Into<String>,
        mode: FieldControlMode,
        info_area_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mode,
            info_area_id: info_area_id.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Fields of the control's own info-area with their result positions
    pub fn primary_fields(&self) -> impl Iterator<Item = (usize, &FieldDefinition)> {
        self.fields
            .iter()
            .enumerate()
            .filter(move |(_, field)| field.info_area_id == self.info_area_id)
    }

    /// Tables a query over this control returns, primary table first
    pub fn result_tables(&self) -> Vec<ResultTable> {
        let mut tables = vec![ResultTable {
            info_area_id: self.info_area_id.clone(),
            link_id: LINK_ID_ANY,
        }];

        for field in &self.fields {
            if field.info_area_id == self.info_area_id {
                continue;
            }
            let exists = tables
                .iter()
                .skip(1)
                .any(|t| t.info_area_id == field.info_area_id && t.link_id == field.link_id);
            if !exists {
                tables.push(ResultTable {
                    info_area_id: field.info_area_id.clone(),
                    link_id: field.link_id,
                });
            }
        }

        tables
    }
}

/// Read-only configuration store
pub trait ConfigurationStore: Send + Sync {
    fn filter_by_name(&self, name: &str) -> Option<FilterDefinition>;

    fn search_and_list_by_name(&self, name: &str) -> Option<SearchAndList>;

    fn field_control_by_name(&self, name: &str, mode: FieldControlMode) -> Option<FieldControl>;
}
