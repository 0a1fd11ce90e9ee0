//! Key addressing for entity URLs.

use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, utf8_percent_encode};
use tablekv::{Key, Record, StorageError, StorageResult};

use crate::entity::wire_text;

/// Raw URL encoding: everything except the unreserved characters.
const RAW_URL: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Standard path-segment escaping for simple keys.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Unencoded address literal. Composite keys take the form
/// `(PartitionKey='<p>', RowKey='<r>')` with embedded single quotes doubled.
pub fn address_literal(key: &Key) -> String {
    match key {
        Key::Composite { partition, row } => format!(
            "(PartitionKey='{}', RowKey='{}')",
            escape_quotes(partition),
            escape_quotes(row)
        ),
        Key::Simple(id) => id.clone(),
    }
}

/// URL path-segment form of the key, appended directly after the table name.
pub fn address_segment(key: &Key) -> String {
    match key {
        Key::Composite { .. } => utf8_percent_encode(&address_literal(key), RAW_URL).to_string(),
        Key::Simple(id) => utf8_percent_encode(id, PATH_SEGMENT).to_string(),
    }
}

/// Read the composite addressing properties back out of a record.
pub fn extract_address(record: &Record) -> StorageResult<Key> {
    let partition = key_component(record, "PartitionKey")?;
    let row = key_component(record, "RowKey")?;
    Ok(Key::composite(partition, row))
}

fn key_component(record: &Record, name: &'static str) -> StorageResult<String> {
    match record.get(name) {
        Some(value) => Ok(wire_text(value)),
        None => Err(StorageError::MissingKeyProperty { name }),
    }
}

fn escape_quotes(component: &str) -> String {
    component.replace('\'', "''")
}
