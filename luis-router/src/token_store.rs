//! Session-scoped bearer token storage.
//!
//! The router token lives in the conversation session. The orchestrator only
//! depends on [`TokenStore`]; hosts plug in whatever backs their session
//! state. [`MemoryTokenStore`] is the in-process implementation.

use crate::error::RouterResult;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::fmt;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

/// Identifies the conversation session a token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a session identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random session identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Router bearer token. Never printed.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    /// Wrap a token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The empty token sent before any identity exchange.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    /// Expose the raw token for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the token is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl Default for BearerToken {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

impl PartialEq for BearerToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose().as_bytes().ct_eq(other.expose().as_bytes()).into()
    }
}

impl Eq for BearerToken {}

/// Per-session token storage.
///
/// `set` must make the token durable for the session before returning;
/// there is no separate save step.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// The stored token, or `None` if the session has none yet.
    async fn get(&self, session: &SessionId) -> RouterResult<Option<BearerToken>>;

    /// Overwrite the session's token.
    async fn set(&self, session: &SessionId, token: BearerToken) -> RouterResult<()>;
}

/// In-memory token store with namespace isolation.
#[derive(Debug)]
pub struct MemoryTokenStore {
    namespace: String,
    tokens: RwLock<HashMap<String, BearerToken>>,
}

impl MemoryTokenStore {
    /// Create a store under the given namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Get the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of sessions holding a token.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Whether no session holds a token.
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    fn namespaced_key(&self, session: &SessionId) -> String {
        format!("{}:{}", self.namespace, session)
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new("luis-router")
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, session: &SessionId) -> RouterResult<Option<BearerToken>> {
        let key = self.namespaced_key(session);
        Ok(self.tokens.read().await.get(&key).cloned())
    }

    async fn set(&self, session: &SessionId, token: BearerToken) -> RouterResult<()> {
        let key = self.namespaced_key(session);
        self.tokens.write().await.insert(key, token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_session_returns_none() {
        let store = MemoryTokenStore::default();
        let token = store.get(&SessionId::from("nobody")).await.unwrap();
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryTokenStore::default();
        let session = SessionId::from("user-1");

        store.set(&session, BearerToken::new("abc")).await.unwrap();
        let token = store.get(&session).await.unwrap().unwrap();

        assert_eq!(token.expose(), "abc");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryTokenStore::default();
        let session = SessionId::from("user-1");

        store.set(&session, BearerToken::new("old")).await.unwrap();
        store.set(&session, BearerToken::new("new")).await.unwrap();

        assert_eq!(store.get(&session).await.unwrap(), Some(BearerToken::new("new")));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = MemoryTokenStore::default();
        let alice = SessionId::from("alice");
        let bob = SessionId::from("bob");

        store.set(&alice, BearerToken::new("token-a")).await.unwrap();

        assert!(store.get(&bob).await.unwrap().is_none());
        assert_eq!(store.get(&alice).await.unwrap().unwrap().expose(), "token-a");
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = BearerToken::new("super-secret-token");
        let debug = format!("{token:?}");

        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_token_equality() {
        assert_eq!(BearerToken::new("abc"), BearerToken::new("abc"));
        assert_ne!(BearerToken::new("abc"), BearerToken::new("abd"));
        assert_ne!(BearerToken::new("abc"), BearerToken::new("abcd"));
        assert!(BearerToken::default().is_empty());
    }

    #[test]
    fn test_random_sessions_differ() {
        assert_ne!(SessionId::random(), SessionId::random());
    }
}
