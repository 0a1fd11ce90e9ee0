use chrono::{DateTime, Timelike, Utc};

/// Source of the per-request instant. Injected so request stamping is
/// deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// RFC-1123 GMT form carried by the `x-ms-date` and `Date` headers.
pub fn http_date(instant: DateTime<Utc>) -> String {
    instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// ISO-8601 with exactly seven fractional digits and a `Z` suffix, the form
/// the tabular service uses for Edm.DateTime values and the Atom `updated`
/// element.
pub fn edm_datetime(instant: DateTime<Utc>) -> String {
    format!(
        "{}.{:07}Z",
        instant.format("%Y-%m-%dT%H:%M:%S"),
        instant.nanosecond() / 100
    )
}
