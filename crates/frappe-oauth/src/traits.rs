//! Collaborator traits for session persistence
//!
//! The session cookie is owned by the calling framework; this trait is the
//! seam a framework adapter implements over one request/response pair. It
//! enables dependency injection and testing with in-memory doubles.

use async_trait::async_trait;

use crate::cookie::CookieAttributes;
use crate::error::SessionStoreError;

/// Cookie read/write/delete primitive keyed by cookie name
///
/// Implementations wrap a single HTTP request/response exchange: `read`
/// consults the request's cookies, `write` and `delete` stage `Set-Cookie`
/// headers on the response. The session manager never touches ambient
/// process state; every operation goes through an explicit store handle.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a cookie value by name
    ///
    /// Returns `Ok(None)` when the cookie is absent.
    ///
    /// # Errors
    /// Returns an error if the underlying request could not be inspected.
    async fn read(&self, name: &str) -> Result<Option<String>, SessionStoreError>;

    /// Write a cookie value with the given attributes
    ///
    /// # Errors
    /// Returns an error if the response could not be modified.
    async fn write(
        &self,
        name: &str,
        value: &str,
        attributes: &CookieAttributes,
    ) -> Result<(), SessionStoreError>;

    /// Delete a cookie by name
    ///
    /// # Errors
    /// Returns an error if the response could not be modified.
    async fn delete(&self, name: &str) -> Result<(), SessionStoreError>;
}
