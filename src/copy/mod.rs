//! Hierarchical record copy engine
//!
//! Copies a source record and its configured dependent records into new,
//! unsaved destination records, one (source record, query table) step at a
//! time.

pub mod builder;
pub mod delegate;
pub mod engine;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod step;

pub use builder::{ProcessedStep, RecordBuilder};
pub use delegate::{ChannelDelegate, CopyReceiver, CopyReport, RecordCopyDelegate};
pub use engine::{
    CopyOutcome, CopyServices, CopyState, REQUEST_OPTION_ARGUMENT, RecordCopy,
    TEMPLATE_FILTER_ARGUMENT, ViewReference,
};
pub use error::{CopyError, SkippedStep};
pub use logging::{CopyLogger, CopyStatistics, LogLevel, MonitoringConfig};
pub use resolver::resolve_step_configuration;
pub use step::{CopyStep, FetchConfig};
