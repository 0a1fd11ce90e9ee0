use crate::request::RequestDescriptor;

/// Pluggable authorization capability. Implementations see the unsigned
/// request metadata and return the literal `Authorization` header value,
/// e.g. `SharedKeyLite <account>:<base64 signature>`. The adapter never
/// interprets the result.
pub trait AuthorizationScheme: Send + Sync {
    fn sign_request(&self, request: &RequestDescriptor<'_>) -> String;
}

/// Scheme that returns a pre-computed header value, for callers that sign
/// out of process and for wire fixtures.
#[derive(Clone, Debug)]
pub struct StaticAuthorization {
    value: String,
}

impl StaticAuthorization {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl AuthorizationScheme for StaticAuthorization {
    fn sign_request(&self, _request: &RequestDescriptor<'_>) -> String {
        self.value.clone()
    }
}
