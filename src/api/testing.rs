//! In-memory transport for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::transport::{OutboundRequest, Transport, TransportError, TransportResponse};

type Outcome = std::result::Result<TransportResponse, TransportError>;

/// Records every request and replays queued outcomes in order.
///
/// With nothing queued, requests get an empty `200`.
#[derive(Debug, Default)]
pub struct MockTransport {
    outcomes: Mutex<VecDeque<Outcome>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, outcome: Outcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn respond(&self, status: u16, body: Value) {
        self.push(Ok(TransportResponse::new(status, body)));
    }

    pub fn fail(&self, message: &str) {
        self.push(Err(TransportError::Unreachable(message.to_string())));
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: OutboundRequest) -> Outcome {
        self.requests.lock().unwrap().push(request);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TransportResponse::new(200, Value::Null)))
    }
}
