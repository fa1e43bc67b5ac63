//! Record identifications
//!
//! A record identification encodes an info-area code and a record id as
//! `"<InfoArea>.<RecordId>"`, e.g. `FI.x1234-5678`. It is the key used to
//! reference records from links, queries and new records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifications of this many characters or fewer never name a linkable record.
pub const MINIMUM_VALID_RECORD_IDENTIFICATION_LENGTH: usize = 8;

const SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordIdentification(String);

impl RecordIdentification {
    pub fn new(info_area_id: &str, record_id: &str) -> Self {
        Self(format!("{}{}{}", info_area_id, SEPARATOR, record_id))
    }

    /// Temporary identification for a record that has not been saved yet
    pub fn new_record(info_area_id: &str) -> Self {
        Self::new(info_area_id, &format!("new{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn info_area_id(&self) -> &str {
        match self.0.split_once(SEPARATOR) {
            Some((info_area, _)) => info_area,
            None => "",
        }
    }

    pub fn record_id(&self) -> &str {
        match self.0.split_once(SEPARATOR) {
            Some((_, record_id)) => record_id,
            None => &self.0,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this identification is long enough to be attached as a link
    pub fn is_valid_link(&self) -> bool {
        self.0.chars().count() > MINIMUM_VALID_RECORD_IDENTIFICATION_LENGTH
    }

    pub fn is_new_record(&self) -> bool {
        self.record_id().starts_with("new")
    }
}

impl fmt::Display for RecordIdentification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordIdentification {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordIdentification {
    fn from(value: String) -> Self {
        Self(value)
    }
}
