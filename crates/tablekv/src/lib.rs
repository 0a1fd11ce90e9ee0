pub mod memory;
pub mod store;
pub mod types;

pub use memory::MemoryStore;
pub use store::{KeyValueStore, StorageError, StorageResult};
pub use types::{Key, Outcome, Record, Value};
