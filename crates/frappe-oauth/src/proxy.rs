//! Bearer-forwarding proxy to the provider's API
//!
//! Lets a backend forward an authenticated request to the Frappe API on
//! behalf of a session, attaching the session's access token as bearer auth.
//! The provider's status code is passed through untouched so the caller can
//! relay it; only network-level failures are errors.

use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::client::OAuthClient;
use crate::error::OAuthError;
use crate::session::Session;

/// Response relayed from the provider's API
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    /// HTTP status returned by the provider, passed through verbatim
    pub status: u16,
    /// JSON body, or `Value::Null` when the provider returned none
    pub body: Value,
}

impl OAuthClient {
    /// Forward an API request to the provider with the session's bearer token
    ///
    /// `path` is resolved against the configured server URL. The body, when
    /// given, is sent as JSON. Non-2xx provider responses are not errors;
    /// their status and body are relayed in the [`ProxyResponse`].
    ///
    /// # Errors
    /// Returns [`OAuthError::InvalidEndpoint`] for an unparseable target URL
    /// or [`OAuthError::Transport`] when the provider is unreachable.
    pub async fn proxy_api_request(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ProxyResponse, OAuthError> {
        let base = Url::parse(&self.config().server_url)?;
        let url = base.join(path)?;

        debug!(%method, %url, "proxying api request");

        let mut request =
            self.http().request(method, url).bearer_auth(&session.token_set.access_token);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);

        Ok(ProxyResponse { status, body })
    }
}
