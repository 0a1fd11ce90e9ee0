use async_trait::async_trait;
use tablekv::{Key, KeyValueStore, Outcome, Record, StorageResult, Value};

use crate::address::extract_address;
use crate::auth::AuthorizationScheme;
use crate::clock::{Clock, SystemClock};
use crate::request::RequestBuilder;
use crate::response::{Operation, interpret};
use crate::transport::HttpTransport;

/// Key-value storage over the Azure Table service. Holds no state across
/// calls beyond the account name and the injected collaborators; each
/// operation is one signed request, one transport exchange, one
/// interpretation.
pub struct AzureTableStore<T, A, C = SystemClock> {
    account: String,
    transport: T,
    auth: A,
    clock: C,
}

impl<T, A> AzureTableStore<T, A, SystemClock> {
    pub fn new(account: impl Into<String>, transport: T, auth: A) -> Self {
        Self::with_clock(account, transport, auth, SystemClock)
    }
}

impl<T, A, C> AzureTableStore<T, A, C> {
    pub fn with_clock(account: impl Into<String>, transport: T, auth: A, clock: C) -> Self {
        Self {
            account: account.into(),
            transport,
            auth,
            clock,
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// The wire record for insert/update: composite addressing first, then
    /// the caller's properties in their original order.
    fn wire_record(key: &Key, record: &Record) -> StorageResult<(Key, Record)> {
        let address = match key {
            Key::Composite { .. } => key.clone(),
            Key::Simple(_) => extract_address(record)?,
        };

        let mut wire = Record::new();
        if let Key::Composite { partition, row } = &address {
            wire.push("PartitionKey", Value::String(partition.clone()));
            wire.push("RowKey", Value::String(row.clone()));
        }
        for (name, value) in record.iter() {
            if name == "PartitionKey" || name == "RowKey" {
                continue;
            }
            wire.push(name, value.clone());
        }
        Ok((address, wire))
    }
}

impl<T, A, C> AzureTableStore<T, A, C>
where
    A: AuthorizationScheme,
    C: Clock,
{
    fn builder(&self) -> RequestBuilder<'_> {
        RequestBuilder::new(&self.account, &self.auth, self.clock.now())
    }
}

#[async_trait]
impl<T, A, C> KeyValueStore for AzureTableStore<T, A, C>
where
    T: HttpTransport,
    A: AuthorizationScheme,
    C: Clock,
{
    async fn insert(&self, table: &str, key: &Key, record: &Record) -> StorageResult<Outcome> {
        let (_, wire) = Self::wire_record(key, record)?;
        let request = self.builder().insert(table, &wire);
        let response = self.transport.execute(&request).await?;
        interpret(Operation::Insert, &response)
    }

    async fn update(&self, table: &str, key: &Key, record: &Record) -> StorageResult<Outcome> {
        let (address, wire) = Self::wire_record(key, record)?;
        let request = self.builder().update(table, &address, &wire);
        let response = self.transport.execute(&request).await?;
        interpret(Operation::Update, &response)
    }

    async fn delete(&self, table: &str, key: &Key) -> StorageResult<Outcome> {
        let request = self.builder().delete(table, key);
        let response = self.transport.execute(&request).await?;
        interpret(Operation::Delete, &response)
    }

    async fn find(&self, table: &str, key: &Key) -> StorageResult<Outcome> {
        let request = self.builder().find(table, key);
        let response = self.transport.execute(&request).await?;
        interpret(Operation::Find, &response)
    }
}
