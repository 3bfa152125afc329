use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::time::Instant;
use dinorelay::delivery::transport::PostFuture;
use dinorelay::delivery::{RawResponse, Transport, TransportError};

/// One recorded POST.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub body: String,
    pub at: Instant,
}

impl SentRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

/// A fake transport that:
/// - records every request body and when it was sent
/// - answers from a script, falling back to `200 {"ok":true}` once the
///   script runs out.
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    script: Arc<Mutex<VecDeque<Result<RawResponse, TransportError>>>>,
    sent: Arc<Mutex<Vec<SentRequest>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.script.lock().unwrap().push_back(Ok(RawResponse {
            status,
            body: body.to_string(),
        }));
        self
    }

    pub fn fail(self, error: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(TransportError(error.to_string())));
        self
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    fn post(&self, body: String) -> PostFuture<'_> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(SentRequest {
                body,
                at: Instant::now(),
            });
            self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
                Ok(RawResponse {
                    status: 200,
                    body: "{\"ok\":true}".to_string(),
                })
            })
        })
    }
}
