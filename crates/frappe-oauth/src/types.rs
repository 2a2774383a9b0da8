//! OAuth 2.0 / OpenID Connect types and configuration
//!
//! Defines the configuration supplied by the caller, the wire types exchanged
//! with the Frappe token/userinfo/introspection endpoints, and the immutable
//! `TokenSet` owned by a session. None of these values are mutated after
//! construction; a refresh produces a replacement `TokenSet`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "frappe_oauth_session";

/// Default authorization endpoint path.
const AUTHORIZE_PATH: &str = "/oauth/authorize";
/// Default token endpoint path.
const TOKEN_PATH: &str = "/oauth/token";
/// Default revocation endpoint path.
const REVOKE_PATH: &str = "/oauth/revoke_token";
/// Default OpenID userinfo endpoint path.
const USERINFO_PATH: &str = "/api/method/frappe.integrations.oauth2.openid_profile";
/// Default introspection endpoint path.
const INTROSPECT_PATH: &str = "/api/method/frappe.integrations.oauth2.introspect_token";

/// Per-endpoint URL overrides
///
/// Any endpoint left as `None` resolves to the provider default under
/// [`OAuthConfig::server_url`].
#[derive(Debug, Clone, Default)]
pub struct EndpointOverrides {
    /// Authorization endpoint override
    pub authorization: Option<String>,
    /// Token endpoint override
    pub token: Option<String>,
    /// Revocation endpoint override
    pub revocation: Option<String>,
    /// OpenID userinfo endpoint override
    pub userinfo: Option<String>,
    /// Introspection endpoint override
    pub introspection: Option<String>,
}

/// OAuth client configuration for a single Frappe identity provider
///
/// Immutable once handed to [`OAuthClient`](crate::client::OAuthClient);
/// clients hold no session data, only this config.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Base URL of the Frappe server (trailing slash stripped)
    pub server_url: String,

    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret (confidential clients only; used exclusively in
    /// token-endpoint requests, never in the authorization URL)
    pub client_secret: Option<String>,

    /// Redirect URI registered with the provider
    pub redirect_uri: String,

    /// Scopes to request (space-separated); omitted from the authorization
    /// URL when `None`
    pub scope: Option<String>,

    /// Whether the authorization flow uses PKCE (default `true`)
    pub use_pkce: bool,

    /// Session cookie name (default [`DEFAULT_COOKIE_NAME`])
    pub cookie_name: String,

    /// Whether session cookies carry the `Secure` attribute (default `true`;
    /// disable for plain-HTTP local development only)
    pub secure_cookies: bool,

    /// Per-endpoint URL overrides; defaults derive from `server_url`
    pub endpoints: EndpointOverrides,
}

impl OAuthConfig {
    /// Create a configuration with provider defaults
    ///
    /// The server URL is normalized by stripping a trailing slash so endpoint
    /// paths concatenate cleanly.
    #[must_use]
    pub fn new(server_url: &str, client_id: &str, redirect_uri: &str) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client_secret: None,
            redirect_uri: redirect_uri.to_string(),
            scope: None,
            use_pkce: true,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            secure_cookies: true,
            endpoints: EndpointOverrides::default(),
        }
    }

    /// Set the client secret (confidential client)
    #[must_use]
    pub fn with_client_secret(mut self, secret: &str) -> Self {
        self.client_secret = Some(secret.to_string());
        self
    }

    /// Set the requested scope
    #[must_use]
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    /// Override the session cookie name
    #[must_use]
    pub fn with_cookie_name(mut self, name: &str) -> Self {
        self.cookie_name = name.to_string();
        self
    }

    /// Enable or disable PKCE for the authorization flow
    #[must_use]
    pub const fn with_pkce(mut self, use_pkce: bool) -> Self {
        self.use_pkce = use_pkce;
        self
    }

    /// Enable or disable the `Secure` cookie attribute
    #[must_use]
    pub const fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Resolved authorization endpoint (override, else provider default)
    #[must_use]
    pub fn authorization_endpoint(&self) -> String {
        self.endpoints
            .authorization
            .clone()
            .unwrap_or_else(|| format!("{}{AUTHORIZE_PATH}", self.server_url))
    }

    /// Resolved token endpoint (override, else provider default)
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        self.endpoints.token.clone().unwrap_or_else(|| format!("{}{TOKEN_PATH}", self.server_url))
    }

    /// Resolved revocation endpoint (override, else provider default)
    #[must_use]
    pub fn revocation_endpoint(&self) -> String {
        self.endpoints
            .revocation
            .clone()
            .unwrap_or_else(|| format!("{}{REVOKE_PATH}", self.server_url))
    }

    /// Resolved OpenID userinfo endpoint (override, else provider default)
    #[must_use]
    pub fn userinfo_endpoint(&self) -> String {
        self.endpoints
            .userinfo
            .clone()
            .unwrap_or_else(|| format!("{}{USERINFO_PATH}", self.server_url))
    }

    /// Resolved introspection endpoint (override, else provider default)
    #[must_use]
    pub fn introspection_endpoint(&self) -> String {
        self.endpoints
            .introspection
            .clone()
            .unwrap_or_else(|| format!("{}{INTROSPECT_PATH}", self.server_url))
    }

    /// Snapshot of the resolved endpoints for diagnostics or discovery
    #[must_use]
    pub fn server_info(&self) -> ServerInfo {
        ServerInfo {
            server_url: self.server_url.clone(),
            authorization_endpoint: self.authorization_endpoint(),
            token_endpoint: self.token_endpoint(),
            revocation_endpoint: self.revocation_endpoint(),
            userinfo_endpoint: self.userinfo_endpoint(),
            introspection_endpoint: self.introspection_endpoint(),
        }
    }
}

/// Resolved endpoint snapshot returned by [`OAuthConfig::server_info`]
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Base server URL
    pub server_url: String,
    /// Resolved authorization endpoint
    pub authorization_endpoint: String,
    /// Resolved token endpoint
    pub token_endpoint: String,
    /// Resolved revocation endpoint
    pub revocation_endpoint: String,
    /// Resolved userinfo endpoint
    pub userinfo_endpoint: String,
    /// Resolved introspection endpoint
    pub introspection_endpoint: String,
}

/// OAuth token response from the authorization server
///
/// Standard RFC 6749 token response, deserialized from the token endpoint for
/// both the `authorization_code` and `refresh_token` grants. Frappe may also
/// return an absolute `expires_at` (epoch seconds) which, when present, takes
/// precedence over `expires_in`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Access token for API authentication
    pub access_token: String,
    /// Token type (always "Bearer" in practice)
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    /// Refresh token, when the provider issues one
    pub refresh_token: Option<String>,
    /// OpenID Connect ID token
    pub id_token: Option<String>,
    /// Granted scopes (space-separated)
    pub scope: Option<String>,
    /// Provider-supplied absolute expiry (epoch seconds); takes precedence
    /// over `expires_in` when present
    pub expires_at: Option<i64>,
}

/// Access and refresh tokens with an absolute expiry
///
/// Produced only by a successful token exchange or refresh. Immutable: a
/// refresh builds a replacement via [`TokenSet::refreshed`] and the old value
/// is discarded once the new one is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for API authentication
    pub access_token: String,

    /// Token type (always "Bearer" for OAuth 2.0)
    pub token_type: String,

    /// Refresh token for obtaining new access tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token (JWT) containing user claims (OpenID Connect)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Granted scopes (space-separated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Absolute expiration timestamp, persisted as epoch seconds
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Build a token set from a token response
    ///
    /// `expires_at` is the provider's absolute value when supplied, otherwise
    /// `now + expires_in`.
    #[must_use]
    pub fn from_response(response: &TokenResponse, now: DateTime<Utc>) -> Self {
        let expires_at = response
            .expires_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(|| now + Duration::seconds(response.expires_in));

        Self {
            access_token: response.access_token.clone(),
            token_type: response.token_type.clone(),
            refresh_token: response.refresh_token.clone(),
            id_token: response.id_token.clone(),
            scope: response.scope.clone(),
            expires_at,
        }
    }

    /// Build the replacement token set after a refresh
    ///
    /// The refresh token, ID token, and scope are replaced only when the
    /// provider returned new ones; otherwise the existing values carry
    /// forward unchanged. Access token, token type, and expiry always come
    /// from the response.
    #[must_use]
    pub fn refreshed(&self, response: &TokenResponse, now: DateTime<Utc>) -> Self {
        let fresh = Self::from_response(response, now);

        Self {
            refresh_token: fresh.refresh_token.or_else(|| self.refresh_token.clone()),
            id_token: fresh.id_token.or_else(|| self.id_token.clone()),
            scope: fresh.scope.or_else(|| self.scope.clone()),
            ..fresh
        }
    }

    /// Check whether the token expires within `threshold` of `now`
    #[must_use]
    pub fn expires_within(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        now + threshold >= self.expires_at
    }

    /// Seconds until expiry relative to `now` (negative when past expiry)
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }
}

/// OpenID Connect user profile snapshot
///
/// Frappe returns arbitrary provider claims alongside the standard ones;
/// unknown claims are preserved in `claims`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    /// Subject identifier
    pub sub: String,

    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    /// Frappe roles granted to the user
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// Any additional provider claims
    #[serde(flatten)]
    pub claims: serde_json::Map<String, serde_json::Value>,
}

/// Token introspection response (RFC 7662)
///
/// Only `active` is guaranteed; everything else is provider-dependent.
#[derive(Debug, Clone, Deserialize)]
pub struct IntrospectionResponse {
    /// Whether the token is currently active
    pub active: bool,
    /// Client the token was issued to
    pub client_id: Option<String>,
    /// Expiry as epoch seconds
    pub exp: Option<i64>,
    /// Issued-at as epoch seconds
    pub iat: Option<i64>,
    /// Granted scopes
    pub scope: Option<String>,
    /// Subject identifier
    pub sub: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Frappe roles
    #[serde(default)]
    pub roles: Vec<String>,
    /// Any additional fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Hint passed to the introspection endpoint (`token_type_hint`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTypeHint {
    /// The token is an access token
    AccessToken,
    /// The token is a refresh token
    RefreshToken,
}

impl TokenTypeHint {
    /// Wire value for the `token_type_hint` form field
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for types.
    use super::*;

    fn sample_response() -> TokenResponse {
        TokenResponse {
            access_token: "access123".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
            refresh_token: Some("refresh456".to_string()),
            id_token: Some("id789".to_string()),
            scope: Some("openid all".to_string()),
            expires_at: None,
        }
    }

    #[test]
    fn test_server_url_trailing_slash_stripped() {
        let config = OAuthConfig::new("https://erp.example.com/", "client", "http://localhost/cb");
        assert_eq!(config.server_url, "https://erp.example.com");
        assert_eq!(config.token_endpoint(), "https://erp.example.com/oauth/token");
    }

    #[test]
    fn test_endpoint_defaults() {
        let config = OAuthConfig::new("https://erp.example.com", "client", "http://localhost/cb");

        assert_eq!(config.authorization_endpoint(), "https://erp.example.com/oauth/authorize");
        assert_eq!(config.token_endpoint(), "https://erp.example.com/oauth/token");
        assert_eq!(config.revocation_endpoint(), "https://erp.example.com/oauth/revoke_token");
        assert_eq!(
            config.userinfo_endpoint(),
            "https://erp.example.com/api/method/frappe.integrations.oauth2.openid_profile"
        );
        assert_eq!(
            config.introspection_endpoint(),
            "https://erp.example.com/api/method/frappe.integrations.oauth2.introspect_token"
        );
    }

    #[test]
    fn test_endpoint_overrides_take_precedence() {
        let mut config = OAuthConfig::new("https://erp.example.com", "client", "http://cb");
        config.endpoints.token = Some("https://sso.example.com/token".to_string());

        assert_eq!(config.token_endpoint(), "https://sso.example.com/token");
        // Untouched endpoints still resolve to defaults
        assert_eq!(config.authorization_endpoint(), "https://erp.example.com/oauth/authorize");
    }

    #[test]
    fn test_server_info_snapshot() {
        let config = OAuthConfig::new("https://erp.example.com", "client", "http://cb");
        let info = config.server_info();

        assert_eq!(info.server_url, "https://erp.example.com");
        assert_eq!(info.token_endpoint, config.token_endpoint());
        assert_eq!(info.userinfo_endpoint, config.userinfo_endpoint());
    }

    #[test]
    fn test_token_set_from_response_relative_expiry() {
        let now = Utc::now();
        let token_set = TokenSet::from_response(&sample_response(), now);

        assert_eq!(token_set.access_token, "access123");
        assert_eq!(token_set.token_type, "Bearer");
        assert_eq!(token_set.refresh_token, Some("refresh456".to_string()));
        assert_eq!(token_set.expires_at, now + Duration::seconds(3600));
    }

    #[test]
    fn test_token_set_absolute_expiry_takes_precedence() {
        let mut response = sample_response();
        response.expires_at = Some(1_900_000_000);

        let token_set = TokenSet::from_response(&response, Utc::now());
        assert_eq!(token_set.expires_at.timestamp(), 1_900_000_000);
    }

    #[test]
    fn test_refreshed_carries_forward_omitted_fields() {
        let now = Utc::now();
        let original = TokenSet::from_response(&sample_response(), now);

        let refresh_response = TokenResponse {
            access_token: "access-new".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 7200,
            refresh_token: None,
            id_token: None,
            scope: None,
            expires_at: None,
        };

        let replacement = original.refreshed(&refresh_response, now);

        assert_eq!(replacement.access_token, "access-new");
        assert_eq!(replacement.expires_at, now + Duration::seconds(7200));
        // Provider omitted these: old values carry forward unchanged
        assert_eq!(replacement.refresh_token, Some("refresh456".to_string()));
        assert_eq!(replacement.id_token, Some("id789".to_string()));
        assert_eq!(replacement.scope, Some("openid all".to_string()));
    }

    #[test]
    fn test_refreshed_adopts_rotated_refresh_token() {
        let now = Utc::now();
        let original = TokenSet::from_response(&sample_response(), now);

        let refresh_response = TokenResponse {
            access_token: "access-new".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 7200,
            refresh_token: Some("refresh-rotated".to_string()),
            id_token: None,
            scope: None,
            expires_at: None,
        };

        let replacement = original.refreshed(&refresh_response, now);
        assert_eq!(replacement.refresh_token, Some("refresh-rotated".to_string()));
    }

    #[test]
    fn test_expires_within() {
        let now = Utc::now();
        let mut response = sample_response();
        response.expires_in = 3600;
        let token_set = TokenSet::from_response(&response, now);

        assert!(!token_set.expires_within(now, Duration::seconds(300)));
        assert!(token_set.expires_within(now, Duration::seconds(7200)));
        assert_eq!(token_set.seconds_until_expiry(now), 3600);
    }

    #[test]
    fn test_token_set_serializes_expiry_as_epoch_seconds() {
        let now = Utc::now();
        let token_set = TokenSet::from_response(&sample_response(), now);

        let json = serde_json::to_value(&token_set).expect("serializes");
        assert_eq!(json["expires_at"], serde_json::json!((now.timestamp() + 3600)));

        let round_tripped: TokenSet = serde_json::from_value(json).expect("deserializes");
        assert_eq!(round_tripped.access_token, token_set.access_token);
        assert_eq!(round_tripped.expires_at.timestamp(), token_set.expires_at.timestamp());
    }

    #[test]
    fn test_user_info_preserves_unknown_claims() {
        let json = serde_json::json!({
            "sub": "user@example.com",
            "name": "Test User",
            "roles": ["System Manager"],
            "frappe_site": "erp.example.com"
        });

        let info: UserInfo = serde_json::from_value(json).expect("deserializes");
        assert_eq!(info.sub, "user@example.com");
        assert_eq!(info.roles, vec!["System Manager".to_string()]);
        assert_eq!(
            info.claims.get("frappe_site").and_then(|v| v.as_str()),
            Some("erp.example.com")
        );
    }

    #[test]
    fn test_introspection_only_requires_active() {
        let json = serde_json::json!({ "active": false });
        let response: IntrospectionResponse = serde_json::from_value(json).expect("deserializes");

        assert!(!response.active);
        assert!(response.sub.is_none());
        assert!(response.roles.is_empty());
    }

    #[test]
    fn test_token_type_hint_wire_values() {
        assert_eq!(TokenTypeHint::AccessToken.as_str(), "access_token");
        assert_eq!(TokenTypeHint::RefreshToken.as_str(), "refresh_token");
    }
}
