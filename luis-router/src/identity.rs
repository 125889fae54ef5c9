//! Identity exchange against `POST {router}/identity`.

use crate::{
    encryption::Encryptor,
    error::RouterResult,
    models::{IdentityEnvelope, IdentityRequest, IdentityResponse},
    token_store::{BearerToken, SessionId, TokenStore},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Result of an identity exchange that reached the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityOutcome {
    /// A new token was stored for the session.
    Refreshed,
    /// The router refused the claim; the stored token is untouched.
    Rejected {
        /// HTTP status returned by the router
        status: StatusCode,
    },
}

/// Obtains a fresh router token for a session.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Exchange an encrypted application code for a token.
    ///
    /// # Errors
    ///
    /// Transport failures, undecodable success bodies, encryption and store
    /// failures are returned as errors. A refusal by the router is not an
    /// error; see [`IdentityOutcome::Rejected`].
    async fn exchange(
        &self,
        session: &SessionId,
        application_code: &str,
        encryption_key: &str,
    ) -> RouterResult<IdentityOutcome>;
}

/// HTTP identity client.
pub struct IdentityClient {
    http: Client,
    endpoint: String,
    encryptor: Arc<dyn Encryptor>,
    store: Arc<dyn TokenStore>,
}

impl IdentityClient {
    /// Create a client for the router at `router_url`.
    #[must_use]
    pub fn new(
        http: Client,
        router_url: &str,
        encryptor: Arc<dyn Encryptor>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            http,
            endpoint: format!("{router_url}/identity"),
            encryptor,
            store,
        }
    }

    /// The full `/identity` URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl IdentityService for IdentityClient {
    #[instrument(skip(self, application_code, encryption_key), fields(session = %session))]
    async fn exchange(
        &self,
        session: &SessionId,
        application_code: &str,
        encryption_key: &str,
    ) -> RouterResult<IdentityOutcome> {
        let claim = serde_json::to_string(&IdentityRequest::now(application_code))?;
        let ciphertext = self.encryptor.encrypt(&claim, encryption_key)?;

        debug!("Requesting router token");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&IdentityEnvelope {
                app_identity: &ciphertext,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Router rejected identity exchange");
            return Ok(IdentityOutcome::Rejected { status });
        }

        let identity: IdentityResponse = response.json().await?;
        self.store
            .set(session, BearerToken::new(identity.token))
            .await?;

        info!("Router token refreshed");
        Ok(IdentityOutcome::Refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::AesGcmEncryptor;
    use crate::token_store::MemoryTokenStore;
    use serde_json::{Value, json};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    fn client(server: &MockServer, store: Arc<MemoryTokenStore>) -> IdentityClient {
        IdentityClient::new(Client::new(), &server.uri(), Arc::new(AesGcmEncryptor::new()), store)
    }

    #[tokio::test]
    async fn test_exchange_stores_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "abc" })))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::default());
        let session = SessionId::from("s1");

        let outcome = client(&server, store.clone())
            .exchange(&session, "APP1", KEY)
            .await
            .unwrap();

        assert_eq!(outcome, IdentityOutcome::Refreshed);
        assert_eq!(store.get(&session).await.unwrap(), Some(BearerToken::new("abc")));
    }

    #[tokio::test]
    async fn test_exchange_sends_encrypted_claim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "abc" })))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::default());
        client(&server, store)
            .exchange(&SessionId::from("s1"), "APP1", KEY)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let ciphertext = body["AppIdentity"].as_str().unwrap();

        assert!(!ciphertext.contains("APP1"));
        let claim: Value =
            serde_json::from_str(&AesGcmEncryptor::new().decrypt(ciphertext, KEY).unwrap()).unwrap();
        assert_eq!(claim["appcode"], "APP1");
        assert!(claim["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_rejected_exchange_leaves_token_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::default());
        let session = SessionId::from("s1");
        store.set(&session, BearerToken::new("stale")).await.unwrap();

        let outcome = client(&server, store.clone())
            .exchange(&session, "APP1", KEY)
            .await
            .unwrap();

        assert_eq!(outcome, IdentityOutcome::Rejected { status: StatusCode::FORBIDDEN });
        assert_eq!(store.get(&session).await.unwrap().unwrap().expose(), "stale");
    }

    #[tokio::test]
    async fn test_malformed_token_body_is_retryable_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::default());
        let session = SessionId::from("s1");

        let err = client(&server, store.clone())
            .exchange(&session, "APP1", KEY)
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert!(store.get(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_key_fails_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::default());
        let err = client(&server, store)
            .exchange(&SessionId::from("s1"), "APP1", "")
            .await
            .unwrap_err();

        assert!(!err.is_retryable());
    }
}
