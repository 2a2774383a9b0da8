//! OAuth 2.0 / OpenID Connect protocol client
//!
//! Encapsulates all HTTP interaction with the Frappe provider's
//! authorization, token, revocation, userinfo, and introspection endpoints.
//! The client is stateless: it holds only configuration and an HTTP client,
//! is cheap to clone, and is safe for concurrent use. Per-attempt values
//! (PKCE verifier, CSRF state) belong to the caller.
//!
//! Every network call is a single unretried request; retry/backoff policy and
//! request timeouts are the caller's concern (inject a configured
//! [`reqwest::Client`] via [`OAuthClient::with_http_client`]).

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::error::OAuthError;
use crate::types::{
    IntrospectionResponse, OAuthConfig, TokenResponse, TokenSet, TokenTypeHint, UserInfo,
};

/// Stateless OAuth 2.0 + PKCE client for a Frappe identity provider
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    http: Client,
}

impl OAuthClient {
    /// Create a client with a default HTTP client
    ///
    /// No request timeout is imposed here; callers needing one should build
    /// their own `reqwest::Client` and use [`OAuthClient::with_http_client`].
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self { config, http: Client::new() }
    }

    /// Create a client with a caller-configured HTTP client
    #[must_use]
    pub const fn with_http_client(config: OAuthConfig, http: Client) -> Self {
        Self { config, http }
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub const fn config(&self) -> &OAuthConfig {
        &self.config
    }

    pub(crate) const fn http(&self) -> &Client {
        &self.http
    }

    /// Build the authorization URL for redirecting the user
    ///
    /// Always includes `response_type=code`, `client_id`, `redirect_uri`, and
    /// `state`; includes `scope` only when configured and the PKCE
    /// `code_challenge` + `code_challenge_method=S256` only when a challenge
    /// is supplied. The client secret never appears here — its use is
    /// confined to token-endpoint requests.
    ///
    /// # Errors
    /// Returns [`OAuthError::InvalidEndpoint`] when the configured
    /// authorization endpoint is not a valid URL.
    pub fn authorization_url(
        &self,
        state: &str,
        code_challenge: Option<&str>,
    ) -> Result<Url, OAuthError> {
        let mut url = Url::parse(&self.config.authorization_endpoint())?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.config.client_id)
                .append_pair("redirect_uri", &self.config.redirect_uri)
                .append_pair("state", state);

            if let Some(scope) = &self.config.scope {
                pairs.append_pair("scope", scope);
            }

            if let Some(challenge) = code_challenge {
                pairs.append_pair("code_challenge", challenge);
                pairs.append_pair("code_challenge_method", "S256");
            }
        }

        Ok(url)
    }

    /// Exchange an authorization code for tokens
    ///
    /// # Arguments
    /// * `code` - Authorization code from the redirect callback
    /// * `code_verifier` - PKCE verifier generated for this attempt, when
    ///   PKCE was used
    ///
    /// # Errors
    /// Returns [`OAuthError::TokenExchange`] carrying the provider's status
    /// verbatim on any non-2xx response, or [`OAuthError::Transport`] on a
    /// network-level failure.
    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<TokenResponse, OAuthError> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];

        if let Some(verifier) = code_verifier {
            params.push(("code_verifier", verifier));
        }

        if let Some(secret) = &self.config.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        debug!(endpoint = %self.config.token_endpoint(), "exchanging authorization code");

        let response = self.http.post(self.config.token_endpoint()).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuthError::TokenExchange {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        Ok(response.json().await?)
    }

    /// Refresh the access token using a refresh token
    ///
    /// # Errors
    /// Returns [`OAuthError::TokenRefresh`] carrying the provider's status
    /// verbatim on any non-2xx response, or [`OAuthError::Transport`] on a
    /// network-level failure.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, OAuthError> {
        let mut params = vec![
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("refresh_token", refresh_token),
        ];

        if let Some(secret) = &self.config.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        debug!(endpoint = %self.config.token_endpoint(), "refreshing access token");

        let response = self.http.post(self.config.token_endpoint()).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuthError::TokenRefresh {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        Ok(response.json().await?)
    }

    /// Revoke a token, best-effort
    ///
    /// A non-2xx response from the revocation endpoint is logged as a warning
    /// and swallowed: revocation failure must never block logout. Only a
    /// network-level failure is reported to the caller.
    ///
    /// # Errors
    /// Returns [`OAuthError::Transport`] when the request could not be sent.
    pub async fn revoke_token(&self, token: &str) -> Result<(), OAuthError> {
        let params = [("token", token), ("client_id", self.config.client_id.as_str())];

        let response =
            self.http.post(self.config.revocation_endpoint()).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                status_text = status.canonical_reason().unwrap_or_default(),
                "token revocation warning"
            );
        }

        Ok(())
    }

    /// Revoke all tokens of a session
    ///
    /// Revokes the access token, then the refresh token if present. Returns
    /// `true` only when both attempted revocations completed without a
    /// network-level failure; HTTP-status failures were already downgraded to
    /// warnings by [`OAuthClient::revoke_token`]. This operation never
    /// returns an error.
    pub async fn logout(&self, tokens: &TokenSet) -> bool {
        if let Err(err) = self.revoke_token(&tokens.access_token).await {
            warn!(error = %err, "access token revocation failed during logout");
            return false;
        }

        if let Some(refresh) = &tokens.refresh_token {
            if let Err(err) = self.revoke_token(refresh).await {
                warn!(error = %err, "refresh token revocation failed during logout");
                return false;
            }
        }

        true
    }

    /// Fetch the OpenID user profile for an access token
    ///
    /// # Errors
    /// Returns [`OAuthError::UserInfo`] carrying the provider's status
    /// verbatim on any non-2xx response, or [`OAuthError::Transport`] on a
    /// network-level failure.
    pub async fn get_user_info(&self, access_token: &str) -> Result<UserInfo, OAuthError> {
        let response = self
            .http
            .get(self.config.userinfo_endpoint())
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuthError::UserInfo {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        Ok(response.json().await?)
    }

    /// Introspect a token's validity and metadata
    ///
    /// # Arguments
    /// * `token` - The token to introspect
    /// * `hint` - Optional `token_type_hint` for the provider
    ///
    /// # Errors
    /// Returns [`OAuthError::Introspection`] carrying the provider's status
    /// verbatim on any non-2xx response, or [`OAuthError::Transport`] on a
    /// network-level failure.
    pub async fn introspect_token(
        &self,
        token: &str,
        hint: Option<TokenTypeHint>,
    ) -> Result<IntrospectionResponse, OAuthError> {
        let mut params = vec![("token", token), ("client_id", self.config.client_id.as_str())];

        if let Some(hint) = hint {
            params.push(("token_type_hint", hint.as_str()));
        }

        let response =
            self.http.post(self.config.introspection_endpoint()).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuthError::Introspection {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        Ok(response.json().await?)
    }
}
