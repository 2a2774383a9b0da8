//! Test doubles for the session store collaborator
//!
//! `MemoryCookieJar` stands in for a framework cookie adapter in unit and
//! integration tests, recording written attributes so the cookie contract can
//! be asserted on.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::cookie::CookieAttributes;
use crate::error::SessionStoreError;
use crate::traits::SessionStore;

/// A cookie captured by [`MemoryCookieJar`]
#[derive(Debug, Clone)]
pub struct StoredCookie {
    /// The cookie value as written
    pub value: String,
    /// The attributes the cookie was written with
    pub attributes: CookieAttributes,
}

/// Thread-safe in-memory [`SessionStore`]
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: RwLock<HashMap<String, StoredCookie>>,
}

impl MemoryCookieJar {
    /// Create an empty jar
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect a stored cookie, attributes included
    #[must_use]
    pub fn get(&self, name: &str) -> Option<StoredCookie> {
        self.cookies.read().ok()?.get(name).cloned()
    }

    /// Seed a raw value directly, bypassing serialization
    ///
    /// Useful for planting corrupt cookie payloads in tests.
    pub fn seed_raw(&self, name: &str, value: &str) {
        if let Ok(mut cookies) = self.cookies.write() {
            cookies.insert(
                name.to_string(),
                StoredCookie {
                    value: value.to_string(),
                    attributes: CookieAttributes {
                        http_only: true,
                        same_site: crate::cookie::SameSite::Lax,
                        path: "/".to_string(),
                        secure: true,
                        max_age: 0,
                    },
                },
            );
        }
    }

    /// Number of cookies currently stored
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.read().map(|cookies| cookies.len()).unwrap_or(0)
    }

    /// Whether the jar is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemoryCookieJar {
    async fn read(&self, name: &str) -> Result<Option<String>, SessionStoreError> {
        let cookies =
            self.cookies.read().map_err(|_| SessionStoreError("jar lock poisoned".to_string()))?;
        Ok(cookies.get(name).map(|cookie| cookie.value.clone()))
    }

    async fn write(
        &self,
        name: &str,
        value: &str,
        attributes: &CookieAttributes,
    ) -> Result<(), SessionStoreError> {
        let mut cookies =
            self.cookies.write().map_err(|_| SessionStoreError("jar lock poisoned".to_string()))?;
        cookies.insert(
            name.to_string(),
            StoredCookie { value: value.to_string(), attributes: attributes.clone() },
        );
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), SessionStoreError> {
        let mut cookies =
            self.cookies.write().map_err(|_| SessionStoreError("jar lock poisoned".to_string()))?;
        cookies.remove(name);
        Ok(())
    }
}
