//! Maps HTTP status and body back into store-level outcomes.

use tablekv::{Outcome, Record, StorageError, StorageResult};

use crate::entity::decode_entry;
use crate::transport::HttpResponse;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Update,
    Delete,
    Find,
}

/// Classify one response for the operation that produced it. Entity bodies
/// are decoded only on the statuses that carry one (201, 200); a success
/// status with an undecodable body is a malformed-entity failure, never
/// silently ignored.
pub fn interpret(operation: Operation, response: &HttpResponse) -> StorageResult<Outcome> {
    match (operation, response.status) {
        (Operation::Insert, 201) => Ok(Outcome::Created(decode_body(response)?)),
        (Operation::Update, 204) => Ok(Outcome::Updated),
        (Operation::Delete, 204) => Ok(Outcome::Deleted),
        (Operation::Find, 200) => Ok(Outcome::Found(decode_body(response)?)),
        (Operation::Find, 404) => Ok(Outcome::NotFound),
        (Operation::Insert, 409) => Err(StorageError::Conflict),
        (Operation::Update | Operation::Delete, 412) => Err(StorageError::PreconditionFailed),
        (_, status) => Err(StorageError::Protocol {
            status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }),
    }
}

fn decode_body(response: &HttpResponse) -> StorageResult<Record> {
    if response.body.is_empty() {
        return Err(StorageError::MalformedEntity(
            "empty response body on success status".to_string(),
        ));
    }
    decode_entry(&response.body)
}
