// src/delivery/classify.rs

//! Response classification.
//!
//! The endpoint sits behind a login proxy that answers misrouted or
//! unauthenticated requests with an HTML sign-in page, often with status 200.
//! [`AuthWallDetector`] is the single place that sniffs for that page; the
//! retry loop only consults [`DeliveryOutcome::auth_wall`].

use std::time::Duration;

use crate::logging::truncate_for_log;

use super::transport::{RawResponse, TransportError};

/// Markers used when no `auth_wall_markers` are configured.
pub const DEFAULT_AUTH_WALL_MARKERS: &[&str] = &["<!DOCTYPE html>", "<html", "Steam", "Sign In"];

/// Substring heuristic for "this is a login page, not an API response".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthWallDetector {
    markers: Vec<String>,
}

impl AuthWallDetector {
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn is_auth_wall(&self, body: &str) -> bool {
        self.markers.iter().any(|m| body.contains(m.as_str()))
    }
}

impl Default for AuthWallDetector {
    fn default() -> Self {
        Self::new(
            DEFAULT_AUTH_WALL_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        )
    }
}

/// Result of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// HTTP status, absent when no response was received.
    pub status: Option<u16>,
    /// Response body, truncated for logging.
    pub body: String,
    pub success: bool,
    /// The endpoint answered with an HTML login page.
    pub auth_wall: bool,
    pub error: Option<String>,
    pub elapsed: Duration,
}

impl DeliveryOutcome {
    /// Worth another attempt: failed, but not because of an auth wall.
    pub fn is_retryable(&self) -> bool {
        !self.success && !self.auth_wall
    }

    /// Status label used in the structured outcome log line.
    pub fn label(&self) -> &'static str {
        if self.success {
            "SUCCESS"
        } else if self.auth_wall {
            "HTML_RESPONSE"
        } else {
            "ERROR"
        }
    }
}

/// Classify the result of one POST.
///
/// An auth-wall body is flagged regardless of status code and is never a
/// success.
pub fn classify_response(
    result: Result<RawResponse, TransportError>,
    detector: &AuthWallDetector,
    elapsed: Duration,
) -> DeliveryOutcome {
    match result {
        Err(e) => DeliveryOutcome {
            status: None,
            body: String::new(),
            success: false,
            auth_wall: false,
            error: Some(e.to_string()),
            elapsed,
        },
        Ok(resp) => {
            let auth_wall = detector.is_auth_wall(&resp.body);
            let success = (200..300).contains(&resp.status) && !auth_wall;
            let error = if auth_wall {
                Some(
                    "server returned HTML page instead of JSON (likely authentication required or wrong endpoint)"
                        .to_string(),
                )
            } else if !success {
                Some(format!("unexpected HTTP status {}", resp.status))
            } else {
                None
            };

            DeliveryOutcome {
                status: Some(resp.status),
                body: truncate_for_log(&resp.body).into_owned(),
                success,
                auth_wall,
                error,
                elapsed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> Result<RawResponse, TransportError> {
        Ok(RawResponse {
            status,
            body: body.to_string(),
        })
    }

    #[test]
    fn default_markers_match_login_pages_only() {
        let detector = AuthWallDetector::default();
        assert_eq!(detector.markers(), DEFAULT_AUTH_WALL_MARKERS);
        assert!(detector.is_auth_wall("<html><head><title>Steam Community</title>"));
        assert!(!detector.is_auth_wall("{\"ok\":true}"));

        let custom = AuthWallDetector::new(vec!["<title>Login".to_string()]);
        assert!(!custom.is_auth_wall("<!DOCTYPE html>"));
        assert!(custom.is_auth_wall("<title>Login required</title>"));
    }

    #[test]
    fn json_2xx_is_success() {
        let out = classify_response(
            response(201, "{\"ok\":true}"),
            &AuthWallDetector::default(),
            Duration::ZERO,
        );
        assert!(out.success);
        assert!(!out.is_retryable());
        assert_eq!(out.label(), "SUCCESS");
    }

    #[test]
    fn html_200_is_auth_wall() {
        let out = classify_response(
            response(200, "<!DOCTYPE html><html><body>Sign In</body></html>"),
            &AuthWallDetector::default(),
            Duration::ZERO,
        );
        assert!(!out.success);
        assert!(out.auth_wall);
        assert!(!out.is_retryable());
        assert_eq!(out.label(), "HTML_RESPONSE");
    }

    #[test]
    fn server_error_is_retryable() {
        let out = classify_response(
            response(503, "{\"error\":\"busy\"}"),
            &AuthWallDetector::default(),
            Duration::ZERO,
        );
        assert!(!out.success);
        assert!(out.is_retryable());
        assert_eq!(out.status, Some(503));
    }

    #[test]
    fn transport_error_is_retryable() {
        let out = classify_response(
            Err(TransportError("connection refused".to_string())),
            &AuthWallDetector::default(),
            Duration::ZERO,
        );
        assert_eq!(out.status, None);
        assert!(out.is_retryable());
        assert_eq!(out.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn custom_markers_replace_defaults() {
        let detector = AuthWallDetector::new(vec!["<title>Login".to_string()]);
        assert!(detector.is_auth_wall("<html><title>Login</title>"));
        assert!(!detector.is_auth_wall("{\"msg\":\"Steam ok\"}"));
    }
}
