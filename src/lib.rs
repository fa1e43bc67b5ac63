//! Hierarchical CRM record copy engine
//!
//! Duplicates a source record tree into a new destination record tree,
//! driven by a template filter whose query-table hierarchy describes which
//! dependent records are fetched and which default values are stamped on
//! each new record.

pub mod config;
pub mod copy;
pub mod crm;
pub mod offline;

pub use copy::{
    ChannelDelegate, CopyError, CopyOutcome, CopyReceiver, CopyServices, CopyState, RecordCopy,
    RecordCopyDelegate, SkippedStep, ViewReference,
};
pub use crm::{
    ConfigurationStore, CrmRecord, FieldControl, FilterDefinition, LinkReader, QueryResult,
    QueryService, QueryTableNode, RecordIdentification, RequestOption,
};
pub use offline::{Fixture, OfflineStore};
