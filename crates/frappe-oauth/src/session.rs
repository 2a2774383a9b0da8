//! Session entity and lifecycle management
//!
//! A [`Session`] owns exactly one [`TokenSet`] plus an optional user-profile
//! snapshot, and lives only in the cookie-backed store. The
//! [`SessionManager`] evaluates a session's relationship to wall-clock time
//! lazily at the point of use (refresh-on-read) — there is no background
//! timer, no in-process cache, and no lock. Two concurrent requests may both
//! refresh the same expiring session; that race is benign and documented:
//! both produce valid token sets and the last cookie write wins.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::OAuthClient;
use crate::cookie::{parse_session_cookie, session_cookie};
use crate::error::SessionError;
use crate::traits::SessionStore;
use crate::types::{TokenResponse, TokenSet, UserInfo};

/// Default skew buffer in seconds subtracted from token expiry to trigger
/// proactive refresh before actual expiry.
pub const DEFAULT_REFRESH_SKEW_SECS: i64 = 300;

/// Authenticated session persisted as a single cookie value
///
/// Replaced wholesale on every refresh — the old value is discarded once the
/// new one is persisted — and destroyed on logout or when read back corrupt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The tokens this session owns
    pub token_set: TokenSet,

    /// OpenID profile snapshot captured at login, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

impl Session {
    /// Create a session from a token set and optional profile snapshot
    #[must_use]
    pub const fn new(token_set: TokenSet, user: Option<UserInfo>) -> Self {
        Self { token_set, user }
    }

    /// Evaluate this session's state at `now` with the given skew buffer
    ///
    /// A session inside the skew window (or past expiry) with a refresh token
    /// is [`SessionState::Refreshable`]; refresh tokens outlive access
    /// tokens, so the refresh window is not cut off at the raw expiry.
    /// Without a refresh token the same session is terminally
    /// [`SessionState::Expired`].
    #[must_use]
    pub fn state(&self, now: DateTime<Utc>, skew: Duration) -> SessionState {
        if !self.token_set.expires_within(now, skew) {
            SessionState::Valid
        } else if self.token_set.refresh_token.is_some() {
            SessionState::Refreshable
        } else {
            SessionState::Expired
        }
    }
}

/// A session's relationship to wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Comfortably before expiry; usable as-is
    Valid,
    /// Inside the skew window (or past expiry) with a refresh token present
    Refreshable,
    /// Expired with no way to refresh
    Expired,
}

/// Session lifecycle manager: issue, refresh-on-read, invalidate
///
/// Stateless between calls; every operation takes the cookie-backed store
/// explicitly. Safe for concurrent use from multiple request handlers.
#[derive(Debug, Clone)]
pub struct SessionManager {
    client: OAuthClient,
    refresh_skew: Duration,
}

impl SessionManager {
    /// Create a manager with the default skew buffer
    /// ([`DEFAULT_REFRESH_SKEW_SECS`])
    #[must_use]
    pub fn new(client: OAuthClient) -> Self {
        Self { client, refresh_skew: Duration::seconds(DEFAULT_REFRESH_SKEW_SECS) }
    }

    /// Override the skew buffer
    #[must_use]
    pub const fn with_refresh_skew(mut self, skew: Duration) -> Self {
        self.refresh_skew = skew;
        self
    }

    /// The protocol client this manager refreshes through
    #[must_use]
    pub const fn client(&self) -> &OAuthClient {
        &self.client
    }

    fn cookie_name(&self) -> &str {
        &self.client.config().cookie_name
    }

    /// Read the stored session without evaluating expiry
    ///
    /// A missing, unreadable, or corrupt cookie resolves to `None`; store
    /// errors are never surfaced.
    pub async fn read_session(&self, store: &dyn SessionStore) -> Option<Session> {
        match store.read(self.cookie_name()).await {
            Ok(Some(value)) => parse_session_cookie(&value),
            Ok(None) => None,
            Err(err) => {
                debug!(error = %err, "session cookie read failed");
                None
            }
        }
    }

    /// Build and persist a session from a successful token exchange
    ///
    /// When `fetch_user_info` is set, the OpenID profile is fetched in the
    /// same transaction; a failure there is logged and swallowed — the
    /// session is still returned, just without the snapshot. Profile
    /// enrichment is never a hard dependency for authentication succeeding.
    ///
    /// # Errors
    /// Returns [`SessionError::Store`] if the cookie write fails.
    pub async fn create_session(
        &self,
        store: &dyn SessionStore,
        response: &TokenResponse,
        fetch_user_info: bool,
    ) -> Result<Session, SessionError> {
        let now = Utc::now();
        let token_set = TokenSet::from_response(response, now);

        let user = if fetch_user_info {
            match self.client.get_user_info(&token_set.access_token).await {
                Ok(info) => Some(info),
                Err(err) => {
                    warn!(error = %err, "user info enrichment failed; session created without profile");
                    None
                }
            }
        } else {
            None
        };

        let session = Session::new(token_set, user);
        self.persist(store, &session, now).await?;

        info!(expires_at = %session.token_set.expires_at, "session created");
        Ok(session)
    }

    /// Validate the stored session, refreshing it transparently when needed
    ///
    /// - `Valid`: returned unchanged.
    /// - `Refreshable`: the refresh token is exchanged for a new token set;
    ///   the replacement session is persisted and returned. A failed refresh
    ///   clears the stored session and resolves to `None` — it never leaves a
    ///   stale session behind.
    /// - `Expired` (no refresh token): cleared, `None`.
    /// - Missing or corrupt cookie: `None`.
    pub async fn check_session(&self, store: &dyn SessionStore) -> Option<Session> {
        let session = self.read_session(store).await?;
        let now = Utc::now();

        match session.state(now, self.refresh_skew) {
            SessionState::Valid => Some(session),
            SessionState::Refreshable => self.refresh_session(store, session, now).await,
            SessionState::Expired => {
                debug!("session expired with no refresh token");
                self.clear(store).await;
                None
            }
        }
    }

    /// Revoke the stored session's tokens and clear the cookie
    ///
    /// The cookie is cleared regardless of revocation outcome. Returns the
    /// revocation result (`true` when no session existed); never errors —
    /// logout must always complete.
    pub async fn destroy_session(&self, store: &dyn SessionStore) -> bool {
        let revoked = match self.read_session(store).await {
            Some(session) => self.client.logout(&session.token_set).await,
            None => true,
        };

        self.clear(store).await;
        info!(revoked, "session destroyed");
        revoked
    }

    async fn refresh_session(
        &self,
        store: &dyn SessionStore,
        session: Session,
        now: DateTime<Utc>,
    ) -> Option<Session> {
        // state() only returns Refreshable when a refresh token is present
        let refresh_token = session.token_set.refresh_token.clone()?;

        match self.client.refresh_token(&refresh_token).await {
            Ok(response) => {
                let token_set = session.token_set.refreshed(&response, now);
                let renewed = Session::new(token_set, session.user);

                if let Err(err) = self.persist(store, &renewed, now).await {
                    warn!(error = %err, "failed to persist refreshed session");
                    self.clear(store).await;
                    return None;
                }

                debug!(expires_at = %renewed.token_set.expires_at, "session refreshed");
                Some(renewed)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed; clearing session");
                self.clear(store).await;
                None
            }
        }
    }

    async fn persist(
        &self,
        store: &dyn SessionStore,
        session: &Session,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let (value, attributes) = session_cookie(session, self.client.config(), now)?;
        store.write(self.cookie_name(), &value, &attributes).await?;
        Ok(())
    }

    async fn clear(&self, store: &dyn SessionStore) {
        if let Err(err) = store.delete(self.cookie_name()).await {
            warn!(error = %err, "failed to clear session cookie");
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the session state machine; manager flows against a live
    //! mock provider are covered by the wiremock integration suite.
    use super::*;

    fn token_set(expires_in: i64, refresh: Option<&str>, now: DateTime<Utc>) -> TokenSet {
        let response = TokenResponse {
            access_token: "access".to_string(),
            token_type: "Bearer".to_string(),
            expires_in,
            refresh_token: refresh.map(String::from),
            id_token: None,
            scope: None,
            expires_at: None,
        };
        TokenSet::from_response(&response, now)
    }

    #[test]
    fn test_state_valid_outside_skew_window() {
        let now = Utc::now();
        let session = Session::new(token_set(3600, Some("rt"), now), None);

        assert_eq!(session.state(now, Duration::seconds(300)), SessionState::Valid);
    }

    #[test]
    fn test_state_refreshable_inside_skew_window() {
        let now = Utc::now();
        let session = Session::new(token_set(30, Some("rt"), now), None);

        assert_eq!(session.state(now, Duration::seconds(300)), SessionState::Refreshable);
    }

    #[test]
    fn test_state_refreshable_past_expiry_with_refresh_token() {
        let now = Utc::now();
        let mut session = Session::new(token_set(3600, Some("rt"), now), None);
        session.token_set.expires_at = now - Duration::seconds(60);

        assert_eq!(session.state(now, Duration::seconds(300)), SessionState::Refreshable);
    }

    #[test]
    fn test_state_expired_without_refresh_token() {
        let now = Utc::now();
        let session = Session::new(token_set(30, None, now), None);

        assert_eq!(session.state(now, Duration::seconds(300)), SessionState::Expired);
    }

    #[test]
    fn test_skew_boundary_is_exclusive_for_valid() {
        let now = Utc::now();
        // expires_at exactly now + skew: inside the window, not Valid
        let session = Session::new(token_set(300, Some("rt"), now), None);

        assert_eq!(session.state(now, Duration::seconds(300)), SessionState::Refreshable);
    }

    #[test]
    fn test_legacy_minimal_skew_variant() {
        let now = Utc::now();
        let session = Session::new(token_set(120, None, now), None);

        // With the legacy 60s buffer the same session is still valid
        assert_eq!(session.state(now, Duration::seconds(60)), SessionState::Valid);
        assert_eq!(session.state(now, Duration::seconds(300)), SessionState::Expired);
    }

    #[test]
    fn test_session_serde_round_trip() {
        let now = Utc::now();
        let session = Session::new(token_set(3600, Some("rt"), now), None);

        let json = serde_json::to_string(&session).expect("serializes");
        let parsed: Session = serde_json::from_str(&json).expect("deserializes");

        assert_eq!(parsed.token_set.access_token, "access");
        assert_eq!(parsed.token_set.refresh_token, Some("rt".to_string()));
        assert!(parsed.user.is_none());
    }
}
