//! Offline CRM backend
//!
//! Serves configuration lookups, queries and link resolution from a fixture
//! file. Used by the command line tool and by tests.

pub mod fixture;
pub mod store;

pub use fixture::{Fixture, FixtureError, StoredRecord};
pub use store::OfflineStore;
