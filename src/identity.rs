//! Write-once response identity shared by every listener.
//!
//! Computed once at startup from the configured server id, then read-only:
//! the session cookie value and the canned response body are both derived
//! from the id and never change for the process lifetime.

use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderValue;

/// Name of the session cookie attached to every HTTP/HTTPS response.
pub const SESSION_COOKIE: &str = "JSESSIONID";

/// Identity of this backend instance.
#[derive(Debug, Clone)]
pub struct ServerIdentity {
    id: String,
    cookie: HeaderValue,
}

impl ServerIdentity {
    /// Build the identity from the configured id.
    ///
    /// Fails only when the id cannot be embedded in a cookie header value
    /// (control characters and the like), which is a startup configuration
    /// error.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidHeaderValue> {
        let id = id.into();
        let cookie = HeaderValue::from_str(&format!("{SESSION_COOKIE}={id}"))?;
        Ok(Self { id, cookie })
    }

    /// The configured server id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The canned response body, equal to the server id.
    pub fn body(&self) -> &str {
        &self.id
    }

    /// `Set-Cookie` value identifying this backend to session-persistence
    /// checks.
    pub fn cookie(&self) -> HeaderValue {
        self.cookie.clone()
    }
}
