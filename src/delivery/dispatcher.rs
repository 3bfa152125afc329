// src/delivery/dispatcher.rs

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

use crate::logging::truncate_for_log;
use crate::types::RelayEvent;

use super::classify::{classify_response, AuthWallDetector, DeliveryOutcome};
use super::payload::EventPayload;
use super::transport::Transport;

/// Fixed-delay, bounded retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Always >= 1.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// What happened to one event after all attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempts: u32,
    /// Outcome of the last attempt; `None` if the payload never left.
    pub last: Option<DeliveryOutcome>,
}

impl DeliveryReport {
    pub fn delivered(&self) -> bool {
        self.last.as_ref().is_some_and(|o| o.success)
    }

    pub fn hit_auth_wall(&self) -> bool {
        self.last.as_ref().is_some_and(|o| o.auth_wall)
    }
}

/// Sends [`RelayEvent`]s through a [`Transport`], retrying transient
/// failures. Delivery never fails the caller: an event that cannot be
/// delivered is logged and dropped.
pub struct Dispatcher<T: Transport> {
    transport: T,
    policy: RetryPolicy,
    detector: AuthWallDetector,
    category: String,
}

impl<T: Transport> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("policy", &self.policy)
            .field("detector", &self.detector)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(
        transport: T,
        policy: RetryPolicy,
        detector: AuthWallDetector,
        category: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            policy,
            detector,
            category: category.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn deliver(&self, event: &RelayEvent) -> DeliveryReport {
        let payload = EventPayload::from_event(event, &self.category);
        info!(
            subject = %event.subject,
            event = event.kind.wire_name(),
            data = %truncate_for_log(&payload.data),
            "sending event"
        );

        let body = match serde_json::to_string(&payload) {
            Ok(body) => body,
            Err(e) => {
                error!(subject = %event.subject, "error serializing event payload: {e}");
                return DeliveryReport {
                    attempts: 0,
                    last: None,
                };
            }
        };

        let max_attempts = self.policy.max_attempts.max(1);
        let mut last = None;

        for attempt in 1..=max_attempts {
            let started = Instant::now();
            let result = self.transport.post(body.clone()).await;
            let outcome = classify_response(result, &self.detector, started.elapsed());
            log_outcome(event, &outcome, attempt);

            if outcome.success {
                return DeliveryReport {
                    attempts: attempt,
                    last: Some(outcome),
                };
            }

            if outcome.auth_wall {
                warn!(
                    subject = %event.subject,
                    "API returned HTML page (likely authentication required), stopping retries"
                );
                return DeliveryReport {
                    attempts: attempt,
                    last: Some(outcome),
                };
            }

            last = Some(outcome);
            if attempt < max_attempts {
                info!(
                    subject = %event.subject,
                    "attempt {attempt} failed, retrying in {:?}",
                    self.policy.delay
                );
                sleep(self.policy.delay).await;
            }
        }

        error!(
            subject = %event.subject,
            event = event.kind.wire_name(),
            "all {max_attempts} attempts failed, dropping event"
        );
        DeliveryReport {
            attempts: max_attempts,
            last,
        }
    }
}

fn log_outcome(event: &RelayEvent, outcome: &DeliveryOutcome, attempt: u32) {
    let status = outcome.status.map(i32::from).unwrap_or(0);
    if outcome.success {
        info!(
            outcome = outcome.label(),
            event = event.kind.wire_name(),
            subject = %event.subject,
            http = status,
            elapsed = ?outcome.elapsed,
            attempt,
            body = %outcome.body,
            "api response"
        );
    } else {
        warn!(
            outcome = outcome.label(),
            event = event.kind.wire_name(),
            subject = %event.subject,
            http = status,
            elapsed = ?outcome.elapsed,
            attempt,
            error = outcome.error.as_deref().unwrap_or(""),
            body = %outcome.body,
            "api response"
        );
    }
}
