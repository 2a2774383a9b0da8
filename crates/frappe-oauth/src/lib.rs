//! OAuth 2.0 Authorization Code + PKCE client and session lifecycle for
//! Frappe identity providers
//!
//! This crate implements the browser-redirect OAuth 2.0 flow with PKCE and
//! OpenID Connect profile retrieval against a single Frappe backend, plus
//! session lifecycle management (issue, refresh, invalidate) persisted in one
//! HTTP cookie.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  SessionManager  │  Session lifecycle (issue / refresh-on-read / invalidate)
//! └────────┬─────────┘
//!          │
//!          ├──► OAuthClient     (stateless protocol client: exchange,
//!          │                     refresh, revoke, userinfo, introspection)
//!          ├──► SessionStore    (cookie read/write/delete, implemented by
//!          │                     the calling framework)
//!          └──► PKCE utilities  (verifier / challenge / state generation)
//! ```
//!
//! The `OAuthClient` is immutable after construction and holds no session
//! data; per-attempt values (PKCE verifier, CSRF state) stay with the caller
//! between the redirect and the callback. The `SessionManager` checks session
//! freshness lazily at the point of use and refreshes through the client when
//! a session enters its expiry skew window; a failed refresh clears the
//! stored session rather than leaving a stale one behind.
//!
//! # Usage Example
//!
//! ```no_run
//! use frappe_oauth::{OAuthClient, OAuthConfig, PkcePair, SessionManager};
//! use frappe_oauth::pkce::generate_state;
//! use frappe_oauth::testing::MemoryCookieJar;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OAuthConfig::new(
//!     "https://erp.example.com",
//!     "client_id",
//!     "https://app.example.com/api/auth/callback",
//! )
//! .with_scope("openid all");
//!
//! let client = OAuthClient::new(config);
//! let manager = SessionManager::new(client.clone());
//!
//! // Redirect leg: send the user to the authorization URL
//! let pkce = PkcePair::generate()?;
//! let state = generate_state(32)?;
//! let auth_url = client.authorization_url(&state, Some(&pkce.code_challenge))?;
//! println!("redirect to: {auth_url}");
//!
//! // Callback leg: exchange the code and issue the session cookie
//! let store = MemoryCookieJar::new(); // a real adapter wraps the framework response
//! let tokens = client.exchange_code_for_token("auth_code", Some(&pkce.code_verifier)).await?;
//! let session = manager.create_session(&store, &tokens, true).await?;
//!
//! // Subsequent requests: validate (and transparently refresh) the session
//! if let Some(session) = manager.check_session(&store).await {
//!     println!("authenticated as {:?}", session.user.map(|u| u.sub));
//! }
//!
//! // Logout: revoke tokens best-effort, clear the cookie
//! manager.destroy_session(&store).await;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`pkce`]: PKCE verifier/challenge and CSRF state generation
//! - [`types`]: configuration, wire types, `TokenSet`, profile claims
//! - [`client`]: stateless OAuth/OIDC protocol client
//! - [`session`]: `Session` entity, state machine, `SessionManager`
//! - [`cookie`]: cookie value serialization and attribute contract
//! - [`traits`]: the `SessionStore` collaborator seam
//! - [`proxy`]: bearer-forwarding helper for provider API calls
//! - [`testing`]: in-memory store double for tests
//!
//! # Concurrency
//!
//! All operations are async request/response calls with no shared mutable
//! state. Two concurrent requests may race to refresh the same expiring
//! session; both produce valid token sets and the last cookie write wins.
//! Strict single-flight refresh would require an external lock and is out of
//! scope. No internal timeout or retry is imposed: bound requests by
//! injecting a configured `reqwest::Client`.

pub mod client;
pub mod cookie;
pub mod error;
pub mod pkce;
pub mod proxy;
pub mod session;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export commonly used types and functions
pub use client::OAuthClient;
pub use cookie::{CookieAttributes, SameSite};
pub use error::{OAuthError, PkceError, SessionError, SessionStoreError};
pub use pkce::{generate_code_challenge, generate_code_verifier, generate_state, validate_state, PkcePair};
pub use proxy::ProxyResponse;
pub use session::{Session, SessionManager, SessionState, DEFAULT_REFRESH_SKEW_SECS};
pub use traits::SessionStore;
pub use types::{
    EndpointOverrides, IntrospectionResponse, OAuthConfig, ServerInfo, TokenResponse, TokenSet,
    TokenTypeHint, UserInfo, DEFAULT_COOKIE_NAME,
};
