//! Outbound request assembly.
//!
//! Every operation stamps one instant into both date headers and hands the
//! unsigned request metadata to the authorization scheme; the scheme's
//! output becomes the `Authorization` header verbatim.

use chrono::{DateTime, Utc};
use tablekv::{Key, Record};

use crate::address::{address_literal, address_segment};
use crate::auth::AuthorizationScheme;
use crate::clock::http_date;
use crate::entity::encode_entry;

pub const CONTENT_TYPE_ATOM: &str = "application/atom+xml";

/// A fully assembled, signed HTTP request ready for the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: &'static str,
    pub url: String,
    pub body: Vec<u8>,
    pub headers: Vec<(&'static str, String)>,
}

impl SignedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The request metadata an authorization scheme is given to sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestDescriptor<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub date: &'a str,
}

/// Per-call builder bound to one account, one scheme, and one instant.
pub struct RequestBuilder<'a> {
    account: &'a str,
    auth: &'a dyn AuthorizationScheme,
    now: DateTime<Utc>,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(account: &'a str, auth: &'a dyn AuthorizationScheme, now: DateTime<Utc>) -> Self {
        Self { account, auth, now }
    }

    pub fn insert(&self, table: &str, record: &Record) -> SignedRequest {
        let url = self.table_url(table);
        let body = encode_entry(record, None, self.now);
        self.build("POST", url, body, false)
    }

    pub fn update(&self, table: &str, key: &Key, record: &Record) -> SignedRequest {
        let url = self.entity_url(table, key);
        let resource_id = format!("{}{}", self.table_url(table), address_literal(key));
        let body = encode_entry(record, Some(&resource_id), self.now);
        self.build("PUT", url, body, true)
    }

    pub fn delete(&self, table: &str, key: &Key) -> SignedRequest {
        let url = self.entity_url(table, key);
        self.build("DELETE", url, Vec::new(), true)
    }

    pub fn find(&self, table: &str, key: &Key) -> SignedRequest {
        let url = self.entity_url(table, key);
        self.build("GET", url, Vec::new(), false)
    }

    fn table_url(&self, table: &str) -> String {
        format!("https://{}.table.core.windows.net/{}", self.account, table)
    }

    fn entity_url(&self, table: &str, key: &Key) -> String {
        format!("{}{}", self.table_url(table), address_segment(key))
    }

    fn build(
        &self,
        method: &'static str,
        url: String,
        body: Vec<u8>,
        if_match: bool,
    ) -> SignedRequest {
        let date = http_date(self.now);
        let mut headers: Vec<(&'static str, String)> = vec![
            ("Content-Type", CONTENT_TYPE_ATOM.to_string()),
            ("Content-Length", body.len().to_string()),
            ("x-ms-date", date.clone()),
            ("Date", date.clone()),
        ];
        if if_match {
            headers.push(("If-Match", "*".to_string()));
        }
        let authorization = self.auth.sign_request(&RequestDescriptor {
            method,
            url: &url,
            date: &date,
        });
        headers.push(("Authorization", authorization));

        SignedRequest {
            method,
            url,
            body,
            headers,
        }
    }
}
