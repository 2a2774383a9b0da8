//! Error types for OAuth protocol and session operations
//!
//! Provider-side failures carry the HTTP status and status text verbatim for
//! diagnostics. Revocation failures are deliberately absent from the taxonomy:
//! they are logged warnings, never errors (revocation must not block logout).

use thiserror::Error;

/// Errors raised by the OAuth protocol client
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The token endpoint rejected an authorization-code exchange
    #[error("token exchange failed: {status} {status_text}")]
    TokenExchange {
        /// HTTP status code returned by the provider
        status: u16,
        /// HTTP status text returned by the provider
        status_text: String,
    },

    /// The token endpoint rejected a refresh-token grant
    #[error("token refresh failed: {status} {status_text}")]
    TokenRefresh {
        /// HTTP status code returned by the provider
        status: u16,
        /// HTTP status text returned by the provider
        status_text: String,
    },

    /// The userinfo endpoint rejected the bearer token
    #[error("user info request failed: {status} {status_text}")]
    UserInfo {
        /// HTTP status code returned by the provider
        status: u16,
        /// HTTP status text returned by the provider
        status_text: String,
    },

    /// The introspection endpoint rejected the request
    #[error("token introspection failed: {status} {status_text}")]
    Introspection {
        /// HTTP status code returned by the provider
        status: u16,
        /// HTTP status text returned by the provider
        status_text: String,
    },

    /// Network-level failure before an HTTP status was available
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A configured or derived endpoint URL failed to parse
    #[error("invalid endpoint url: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Errors raised by PKCE parameter generation
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PkceError {
    /// Requested verifier length is outside the RFC 7636 bounds (43..=128)
    #[error("code verifier length {requested} outside 43..=128")]
    VerifierLength {
        /// The out-of-range length that was requested
        requested: usize,
    },

    /// Requested state length is outside the supported bounds (16..=32 bytes)
    #[error("state length {requested} outside 16..=32 bytes")]
    StateLength {
        /// The out-of-range length that was requested
        requested: usize,
    },
}

/// Error raised by a [`SessionStore`](crate::traits::SessionStore) adapter
#[derive(Debug, Error)]
#[error("session store error: {0}")]
pub struct SessionStoreError(pub String);

/// Errors raised while creating a session
///
/// `check_session` never surfaces these: refresh failures and store
/// corruption resolve to "no session" by contract.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A provider-side or transport failure from the OAuth client
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// The cookie-backed store failed to persist the session
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for error display formats.
    use super::*;

    #[test]
    fn test_provider_errors_carry_status_verbatim() {
        let err = OAuthError::TokenExchange { status: 400, status_text: "Bad Request".to_string() };
        assert_eq!(err.to_string(), "token exchange failed: 400 Bad Request");

        let err = OAuthError::TokenRefresh {
            status: 401,
            status_text: "Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "token refresh failed: 401 Unauthorized");
    }

    #[test]
    fn test_session_error_is_transparent() {
        let inner = OAuthError::UserInfo { status: 403, status_text: "Forbidden".to_string() };
        let err = SessionError::from(inner);
        assert_eq!(err.to_string(), "user info request failed: 403 Forbidden");

        let err = SessionError::from(SessionStoreError("cookie write rejected".to_string()));
        assert_eq!(err.to_string(), "session store error: cookie write rejected");
    }
}
