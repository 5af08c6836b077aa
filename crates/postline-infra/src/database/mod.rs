//! Record store implementations.

mod memory;

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres_store;

pub use memory::InMemoryRecordStore;

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, connect};
#[cfg(feature = "postgres")]
pub use postgres_store::PostgresRecordStore;

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
