//! Records built by a copy
//!
//! A `CrmRecord` is a not-yet-persisted record: its field values and the
//! links to the records it belongs to. Saving it is someone else's job.

use super::identification::RecordIdentification;
use super::query_table::QueryTableNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLink {
    pub target: RecordIdentification,
    pub link_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmRecord {
    pub identification: RecordIdentification,
    pub info_area_id: String,
    #[serde(default)]
    pub values: BTreeMap<u32, String>,
    #[serde(default)]
    pub links: Vec<RecordLink>,
}

impl CrmRecord {
    /// New record with a temporary identification
    pub fn new_with_info_area(info_area_id: &str) -> Self {
        Self {
            identification: RecordIdentification::new_record(info_area_id),
            info_area_id: info_area_id.to_string(),
            values: BTreeMap::new(),
            links: Vec::new(),
        }
    }

    /// Record standing for an existing identification
    pub fn from_identification(identification: RecordIdentification) -> Self {
        let info_area_id = identification.info_area_id().to_string();
        Self {
            identification,
            info_area_id,
            values: BTreeMap::new(),
            links: Vec::new(),
        }
    }

    pub fn add_link(&mut self, target: RecordIdentification, link_id: i32) {
        self.links.push(RecordLink { target, link_id });
    }

    pub fn set_value(&mut self, field_id: u32, value: impl Into<String>) {
        self.values.insert(field_id, value.into());
    }

    pub fn value(&self, field_id: u32) -> Option<&str> {
        self.values.get(&field_id).map(|v| v.as_str())
    }

    pub fn is_linked_to(&self, target: &RecordIdentification) -> bool {
        self.links.iter().any(|link| &link.target == target)
    }

    pub fn link_to_info_area(&self, info_area_id: &str) -> Option<&RecordLink> {
        self.links
            .iter()
            .find(|link| link.target.info_area_id() == info_area_id)
    }

    /// Stamps the table's template values onto the record. Without
    /// `override_values` an existing non-empty value is kept.
    pub fn apply_template(&mut self, table: &QueryTableNode, override_values: bool) {
        for field in &table.field_values {
            let occupied = self
                .values
                .get(&field.field_id)
                .is_some_and(|current| !current.is_empty());
            if override_values || !occupied {
                self.values.insert(field.field_id, field.value.clone());
            }
        }
    }
}
