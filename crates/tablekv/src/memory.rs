use crate::store::{KeyValueStore, StorageError, StorageResult};
use crate::types::{Key, Outcome, Record};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, Default)]
struct MemoryState {
    tables: BTreeMap<String, BTreeMap<Key, Record>>,
}

/// In-memory reference implementation of the key-value contract. Mirrors
/// the tabular backend's outcome mapping: duplicate insert is a conflict,
/// update/delete of a missing entity fails the unconditional precondition.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, MemoryState>> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Transport("memory store mutex poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn insert(&self, table: &str, key: &Key, record: &Record) -> StorageResult<Outcome> {
        let mut state = self.lock()?;
        let entries = state.tables.entry(table.to_string()).or_default();
        if entries.contains_key(key) {
            return Err(StorageError::Conflict);
        }
        entries.insert(key.clone(), record.clone());
        Ok(Outcome::Created(record.clone()))
    }

    async fn update(&self, table: &str, key: &Key, record: &Record) -> StorageResult<Outcome> {
        let mut state = self.lock()?;
        let entries = state.tables.entry(table.to_string()).or_default();
        if !entries.contains_key(key) {
            return Err(StorageError::PreconditionFailed);
        }
        entries.insert(key.clone(), record.clone());
        Ok(Outcome::Updated)
    }

    async fn delete(&self, table: &str, key: &Key) -> StorageResult<Outcome> {
        let mut state = self.lock()?;
        let entries = state.tables.entry(table.to_string()).or_default();
        if entries.remove(key).is_none() {
            return Err(StorageError::PreconditionFailed);
        }
        Ok(Outcome::Deleted)
    }

    async fn find(&self, table: &str, key: &Key) -> StorageResult<Outcome> {
        let state = self.lock()?;
        match state.tables.get(table).and_then(|entries| entries.get(key)) {
            Some(record) => Ok(Outcome::Found(record.clone())),
            None => Ok(Outcome::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn sample_record() -> Record {
        let mut record = Record::new();
        record.push("name", "Test");
        record.push("value", 1);
        record
    }

    #[tokio::test(flavor = "current_thread")]
    async fn insert_existing_key_expected_conflict() {
        let store = MemoryStore::new();
        let key = Key::composite("foo", "100");

        store
            .insert("stdClass", &key, &sample_record())
            .await
            .expect("first insert should succeed");
        let error = store
            .insert("stdClass", &key, &sample_record())
            .await
            .expect_err("duplicate insert should fail");

        assert!(matches!(error, StorageError::Conflict));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn find_missing_key_expected_not_found() {
        let store = MemoryStore::new();

        let outcome = store
            .find("stdClass", &Key::simple("missing"))
            .await
            .expect("find should succeed");

        assert_eq!(outcome, Outcome::NotFound);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn update_missing_key_expected_precondition_failed() {
        let store = MemoryStore::new();

        let error = store
            .update("stdClass", &Key::composite("foo", "100"), &sample_record())
            .await
            .expect_err("update of a missing entity should fail");

        assert!(matches!(error, StorageError::PreconditionFailed));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn delete_then_find_expected_not_found() {
        let store = MemoryStore::new();
        let key = Key::composite("foo", "100");
        store
            .insert("stdClass", &key, &sample_record())
            .await
            .expect("insert should succeed");

        let deleted = store
            .delete("stdClass", &key)
            .await
            .expect("delete should succeed");
        assert_eq!(deleted, Outcome::Deleted);

        let outcome = store
            .find("stdClass", &key)
            .await
            .expect("find should succeed");
        assert_eq!(outcome, Outcome::NotFound);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn update_existing_key_expected_replaced_record() {
        let store = MemoryStore::new();
        let key = Key::composite("foo", "100");
        store
            .insert("stdClass", &key, &sample_record())
            .await
            .expect("insert should succeed");

        let mut replacement = Record::new();
        replacement.push("value", 2);
        store
            .update("stdClass", &key, &replacement)
            .await
            .expect("update should succeed");

        let outcome = store
            .find("stdClass", &key)
            .await
            .expect("find should succeed");
        let Outcome::Found(found) = outcome else {
            panic!("expected found outcome");
        };
        assert_eq!(found.get("value"), Some(&Value::Int(2)));
        assert_eq!(found.get("name"), None);
    }
}
