//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod cache;
mod record_store;

pub use auth::{AuthError, IdentityProvider};
pub use cache::{Cache, CacheError};
pub use record_store::{Filter, Order, Query, Record, RecordStore, StoredRecord, query_records};
