use async_trait::async_trait;
use tablekv::{StorageError, StorageResult};

use crate::request::SignedRequest;

/// What came back from one HTTP exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }
}

/// HTTP transport capability. The adapter never opens sockets or manages
/// TLS itself; timeouts and pooling belong to the implementation.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: &SignedRequest) -> StorageResult<HttpResponse>;
}

/// Production transport over a shared `reqwest` client.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &SignedRequest) -> StorageResult<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|err| StorageError::Transport(err.to_string()))?;

        let mut outbound = self.client.request(method, request.url.as_str());
        for (name, value) in &request.headers {
            outbound = outbound.header(*name, value.as_str());
        }
        if !request.body.is_empty() {
            outbound = outbound.body(request.body.clone());
        }

        let response = outbound
            .send()
            .await
            .map_err(|err| StorageError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|err| StorageError::Transport(err.to_string()))?
            .to_vec();

        Ok(HttpResponse {
            status,
            body,
            headers,
        })
    }
}
