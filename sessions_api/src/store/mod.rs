//! Record store abstraction over persistent storage of typed records.
//!
//! Records belong to a named kind (e.g. `User`), carry a generated string
//! identifier, and hold their fields as a JSON object. Queries are
//! field-equality matches. Uniqueness constraints are declared per kind and
//! enforced by the backing implementation.
//!
//! Two implementations ship with this crate:
//! - [`MemoryStore`]: in-process, used by the test suites and when running
//!   without a database
//! - [`PgRecordStore`]: PostgreSQL-backed via `sqlx`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub mod config;
pub mod memory;
pub mod postgres;

pub use config::DatabaseConfig;
pub use memory::MemoryStore;
pub use postgres::PgRecordStore;

/// Generated record identifier
pub type RecordId = String;

/// A stored record: generated id plus its fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: Map<String, Value>,
}

/// A declared uniqueness constraint on one field of a record kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueIndex {
    pub kind: String,
    pub field: String,
}

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Insert violated a declared uniqueness constraint
    #[error("Duplicate value for unique field `{field}` on {kind}")]
    Conflict { kind: String, field: String },

    /// Delete of a nonexistent record
    #[error("{kind} record not found")]
    NotFound { kind: String },

    /// Field serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Capability contract for record storage.
///
/// Implementations must serialize concurrent inserts enough to enforce the
/// declared uniqueness constraints (check-then-insert under a write lock, or
/// a unique index at the storage layer).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a record of the named kind, returning its generated id
    ///
    /// # Errors
    ///
    /// * `StoreError::Conflict` - A declared uniqueness constraint was violated
    async fn insert(&self, kind: &str, fields: Map<String, Value>) -> StoreResult<RecordId>;

    /// Find at most one record of the named kind whose fields equal every
    /// field of `query`. The special key `id` matches the record identifier.
    async fn find(&self, kind: &str, query: &Map<String, Value>) -> StoreResult<Option<Record>>;

    /// Delete a record by id
    ///
    /// # Errors
    ///
    /// * `StoreError::NotFound` - No record of that kind has the given id
    async fn delete(&self, kind: &str, id: &str) -> StoreResult<()>;
}
