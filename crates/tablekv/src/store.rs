use crate::types::{Key, Outcome, Record};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("record is missing key property {name}")]
    MissingKeyProperty { name: &'static str },

    #[error("malformed entity: {0}")]
    MalformedEntity(String),

    #[error("conflict: an entity with this key already exists")]
    Conflict,

    #[error("precondition failed for target entity")]
    PreconditionFailed,

    #[error("protocol error: status {status}")]
    Protocol { status: u16, body: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value contract over a tabular backend. One network round-trip per
/// call; no retries at this layer, callers retry the idempotent operations
/// (`update`, `delete`, `find`).
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn insert(&self, table: &str, key: &Key, record: &Record) -> StorageResult<Outcome>;

    /// Unconditional replace of an existing entity.
    async fn update(&self, table: &str, key: &Key, record: &Record) -> StorageResult<Outcome>;

    async fn delete(&self, table: &str, key: &Key) -> StorageResult<Outcome>;

    async fn find(&self, table: &str, key: &Key) -> StorageResult<Outcome>;
}
