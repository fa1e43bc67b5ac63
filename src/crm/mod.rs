//! CRM contract consumed by the copy engine
//!
//! Configuration lookups, query execution, offline link resolution and the
//! record model. Backends implement `ConfigurationStore`, `QueryService`
//! and `LinkReader`.

pub mod config_store;
pub mod identification;
pub mod query;
pub mod query_table;
pub mod record;
pub mod result;

pub use config_store::{
    ConfigurationStore, FieldControl, FieldControlMode, FieldDefinition, ResultTable, SearchAndList,
};
pub use identification::{MINIMUM_VALID_RECORD_IDENTIFICATION_LENGTH, RecordIdentification};
pub use query::{
    FetchRequest, LinkReader, QueryError, QueryHandle, QueryService, RequestOption,
    link_descriptor, parse_link_descriptor,
};
pub use query_table::{FieldValue, FilterDefinition, LINK_ID_ANY, QueryTableNode, SOURCE_CONFIG_PROPERTY};
pub use record::{CrmRecord, RecordLink};
pub use result::{QueryResult, ResultRow};
