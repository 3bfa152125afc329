// src/delivery/mod.rs

//! Outbound event delivery.
//!
//! - [`payload`] builds the wire body and guarantees `data` is valid JSON.
//! - [`classify`] turns an HTTP response into a [`DeliveryOutcome`],
//!   including the authentication-wall heuristic.
//! - [`transport`] provides the `Transport` trait and the `reqwest`-backed
//!   [`HttpTransport`]; tests swap in a fake.
//! - [`dispatcher`] owns the bounded retry loop.

pub mod classify;
pub mod dispatcher;
pub mod payload;
pub mod transport;

pub use classify::{classify_response, AuthWallDetector, DeliveryOutcome};
pub use dispatcher::{DeliveryReport, Dispatcher, RetryPolicy};
pub use payload::{normalize_data, EventPayload};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};
