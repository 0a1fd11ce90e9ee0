#![doc = r#"
Azure Table storage adapter for the `tablekv` key-value contract.

Operation mapping:

| `KeyValueStore` method | HTTP request | success |
| --- | --- | --- |
| `insert` | `POST https://<account>.table.core.windows.net/<table>` | `201 Created` + entity body |
| `update` | `PUT .../<table>(PartitionKey='..', RowKey='..')` with `If-Match: *` | `204 No Content` |
| `delete` | `DELETE .../<table>(PartitionKey='..', RowKey='..')` with `If-Match: *` | `204 No Content` |
| `find` | `GET .../<table>(PartitionKey='..', RowKey='..')` | `200 OK` + entity body |

Implementation notes:
- Entities travel as Atom entries with Edm-typed properties. Typed values
  round-trip exactly; an element without an `m:type` attribute always
  decodes as a string.
- Composite key segments are raw-URL encoded; embedded single quotes in a
  key component are doubled before encoding.
- Both date headers (`x-ms-date`, `Date`) carry the same RFC-1123 instant,
  generated once per call from the injected clock.
- Signing is delegated to an `AuthorizationScheme`; its output becomes the
  `Authorization` header verbatim.
- No retries at this layer. Callers retry the idempotent operations
  (`find`, plus `update`/`delete`, which always send `If-Match: *`).
"#]

pub mod address;
pub mod auth;
pub mod clock;
pub mod entity;
pub mod request;
pub mod response;
pub mod store;
pub mod testing;
pub mod transport;

pub use crate::address::{address_literal, address_segment, extract_address};
pub use crate::auth::{AuthorizationScheme, StaticAuthorization};
pub use crate::clock::{Clock, SystemClock};
pub use crate::entity::{decode_entry, encode_entry};
pub use crate::request::{RequestBuilder, RequestDescriptor, SignedRequest};
pub use crate::response::{Operation, interpret};
pub use crate::store::AzureTableStore;
pub use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport};
