//! Fixture files describing an offline CRM data set
//!
//! A fixture carries the configuration (template filters, searches, field
//! controls) and the records the offline store answers queries from. TOML
//! and JSON are both accepted.

use crate::crm::{
    FieldControl, FieldControlMode, FilterDefinition, RecordIdentification, RecordLink,
    SearchAndList,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML fixture: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Failed to parse JSON fixture: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid fixture: {0}")]
    Invalid(String),
}

/// A stored record; field values are keyed by field id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub identification: RecordIdentification,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(default)]
    pub links: Vec<RecordLink>,
}

impl StoredRecord {
    pub fn new(identification: impl Into<RecordIdentification>) -> Self {
        Self {
            identification: identification.into(),
            values: BTreeMap::new(),
            links: Vec::new(),
        }
    }

    pub fn with_value(mut self, field_id: u32, value: impl Into<String>) -> Self {
        self.values.insert(field_id.to_string(), value.into());
        self
    }

    pub fn with_link(mut self, target: impl Into<RecordIdentification>, link_id: i32) -> Self {
        self.links.push(RecordLink {
            target: target.into(),
            link_id,
        });
        self
    }

    pub fn info_area_id(&self) -> &str {
        self.identification.info_area_id()
    }

    pub fn value(&self, field_id: u32) -> Option<&str> {
        self.values.get(&field_id.to_string()).map(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub filters: Vec<FilterDefinition>,
    #[serde(default)]
    pub search_and_lists: Vec<SearchAndList>,
    #[serde(default)]
    pub field_controls: Vec<FieldControl>,
    #[serde(default)]
    pub records: Vec<StoredRecord>,
}

impl Fixture {
    pub fn from_toml_str(content: &str) -> Result<Self, FixtureError> {
        let fixture: Fixture = toml::from_str(content)?;
        fixture.validate()?;
        Ok(fixture)
    }

    pub fn from_json_str(content: &str) -> Result<Self, FixtureError> {
        let fixture: Fixture = serde_json::from_str(content)?;
        fixture.validate()?;
        Ok(fixture)
    }

    /// Loads a `.json` fixture as JSON and anything else as TOML
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn filter(&self, name: &str) -> Option<&FilterDefinition> {
        self.filters.iter().find(|f| f.name == name)
    }

    pub fn search_and_list(&self, name: &str) -> Option<&SearchAndList> {
        self.search_and_lists.iter().find(|s| s.name == name)
    }

    pub fn field_control(&self, name: &str, mode: FieldControlMode) -> Option<&FieldControl> {
        self.field_controls
            .iter()
            .find(|fc| fc.name == name && fc.mode == mode)
    }

    pub fn record(&self, identification: &RecordIdentification) -> Option<&StoredRecord> {
        self.records
            .iter()
            .find(|r| &r.identification == identification)
    }

    fn validate(&self) -> Result<(), FixtureError> {
        let mut filter_names = HashSet::new();
        for filter in &self.filters {
            if !filter_names.insert(filter.name.as_str()) {
                return Err(FixtureError::Invalid(format!(
                    "duplicate filter '{}'",
                    filter.name
                )));
            }
        }

        let mut identifications = HashSet::new();
        for record in &self.records {
            if record.identification.info_area_id().is_empty() {
                return Err(FixtureError::Invalid(format!(
                    "record '{}' has no info-area",
                    record.identification
                )));
            }
            if !identifications.insert(&record.identification) {
                return Err(FixtureError::Invalid(format!(
                    "duplicate record '{}'",
                    record.identification
                )));
            }
        }

        Ok(())
    }
}
