//! Query execution contract
//!
//! Starting a query is synchronous and may fail immediately; the returned
//! handle completes later with the rows or a runtime error.

use super::config_store::{FieldControl, SearchAndList};
use super::identification::RecordIdentification;
use super::result::QueryResult;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Where a query should be answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestOption {
    Online,
    Offline,
    Fastest,
    PreferOnline,
    #[default]
    PreferOffline,
}

impl RequestOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestOption::Online => "online",
            RequestOption::Offline => "offline",
            RequestOption::Fastest => "fastest",
            RequestOption::PreferOnline => "prefer-online",
            RequestOption::PreferOffline => "prefer-offline",
        }
    }
}

impl fmt::Display for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "online" => Ok(RequestOption::Online),
            "offline" => Ok(RequestOption::Offline),
            "fastest" => Ok(RequestOption::Fastest),
            "prefer-online" => Ok(RequestOption::PreferOnline),
            "prefer-offline" => Ok(RequestOption::PreferOffline),
            other => Err(format!("Unknown request option: {}", other)),
        }
    }
}

/// A fetch of `field_control` records linked to `link_record` via `link_id`
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub search_and_list: Option<SearchAndList>,
    pub field_control: FieldControl,
    pub link_record: RecordIdentification,
    pub link_id: i32,
    pub request_option: RequestOption,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("CRM data is unavailable: {0}")]
    Unavailable(String),
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type QueryHandle = BoxFuture<'static, Result<QueryResult, QueryError>>;

pub trait QueryService: Send + Sync {
    /// Starts a query. `Err` means the query could not even be started.
    fn execute(&self, request: FetchRequest) -> Result<QueryHandle, QueryError>;
}

/// Offline lookup of a linked record
pub trait LinkReader: Send + Sync {
    /// `link` is an `"InfoArea:LinkId"` descriptor
    fn linked_record(
        &self,
        source: &RecordIdentification,
        link: &str,
    ) -> Option<RecordIdentification>;
}

/// Builds the `"InfoArea:LinkId"` descriptor a `LinkReader` expects
pub fn link_descriptor(info_area_id: &str, link_id: i32) -> String {
    format!("{}:{}", info_area_id, link_id)
}

/// Splits an `"InfoArea:LinkId"` descriptor
pub fn parse_link_descriptor(link: &str) -> Option<(&str, i32)> {
    let (info_area, link_id) = link.split_once(':')?;
    let link_id = link_id.parse().ok()?;
    Some((info_area, link_id))
}
