//! Session cookie serialization and attributes
//!
//! The whole session lives in a single cookie value: the JSON-serialized
//! [`Session`]. A corrupt value on read is indistinguishable from an absent
//! cookie by design, so parsing resolves to `Option` rather than an error.

use chrono::{DateTime, Utc};

use crate::error::SessionStoreError;
use crate::session::Session;
use crate::types::OAuthConfig;

/// `SameSite` cookie attribute values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// Cookie sent only for same-site requests
    Strict,
    /// Cookie sent for same-site requests and top-level navigations
    Lax,
    /// Cookie sent for all requests (requires `Secure`)
    None,
}

impl SameSite {
    /// Attribute value as it appears in a `Set-Cookie` header
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// Attributes applied to the session cookie
///
/// The contract for session state: `HttpOnly`, `SameSite=Lax`, `Path=/`,
/// `Secure` per configuration, and a `Max-Age` that expires with the access
/// token (clamped at zero for already-expired sessions).
#[derive(Debug, Clone)]
pub struct CookieAttributes {
    /// `HttpOnly` flag (always set for session cookies)
    pub http_only: bool,
    /// `SameSite` policy
    pub same_site: SameSite,
    /// Cookie path
    pub path: String,
    /// `Secure` flag
    pub secure: bool,
    /// `Max-Age` in seconds
    pub max_age: i64,
}

impl CookieAttributes {
    /// Attributes for persisting `session` at time `now`
    #[must_use]
    pub fn for_session(session: &Session, config: &OAuthConfig, now: DateTime<Utc>) -> Self {
        Self {
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            secure: config.secure_cookies,
            max_age: session.token_set.seconds_until_expiry(now).max(0),
        }
    }
}

/// Serialize a session into its cookie value and attributes
///
/// # Errors
/// Returns a [`SessionStoreError`] if the session fails to serialize, which
/// indicates a bug rather than runtime state.
pub fn session_cookie(
    session: &Session,
    config: &OAuthConfig,
    now: DateTime<Utc>,
) -> Result<(String, CookieAttributes), SessionStoreError> {
    let value = serde_json::to_string(session)
        .map_err(|err| SessionStoreError(format!("session serialization failed: {err}")))?;

    Ok((value, CookieAttributes::for_session(session, config, now)))
}

/// Parse a cookie value back into a session
///
/// Malformed JSON resolves to `None`: a corrupt cookie is treated exactly
/// like a missing one and never surfaced as an error.
#[must_use]
pub fn parse_session_cookie(value: &str) -> Option<Session> {
    serde_json::from_str(value).ok()
}
