//! # eduhub-database
//!
//! PostgreSQL connection management, the store traits consumed by the
//! notification engine, their sqlx repository implementations, and an
//! in-memory store for single-node runs and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;
pub mod transaction;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{
    FanoutStore, FanoutUnit, NotificationSink, PreferenceStore, RelationshipDirectory,
    RelationshipStore,
};
pub use transaction::PgFanoutStore;
