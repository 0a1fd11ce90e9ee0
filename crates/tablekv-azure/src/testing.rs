//! Test doubles for the transport and clock seams.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tablekv::{StorageError, StorageResult};

use crate::clock::Clock;
use crate::request::SignedRequest;
use crate::transport::{HttpResponse, HttpTransport};

/// Clock pinned to a single instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Default)]
struct ScriptedState {
    responses: VecDeque<HttpResponse>,
    requests: Vec<SignedRequest>,
}

/// Transport double that records every outbound request and replays
/// scripted responses in order.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<ScriptedState>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, response: HttpResponse) {
        self.inner
            .lock()
            .expect("scripted transport mutex poisoned")
            .responses
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<SignedRequest> {
        self.inner
            .lock()
            .expect("scripted transport mutex poisoned")
            .requests
            .clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: &SignedRequest) -> StorageResult<HttpResponse> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| StorageError::Transport("scripted transport mutex poisoned".to_string()))?;
        state.requests.push(request.clone());
        state
            .responses
            .pop_front()
            .ok_or_else(|| StorageError::Transport("no scripted response left".to_string()))
    }
}
