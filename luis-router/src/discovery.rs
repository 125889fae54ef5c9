//! Protected discovery call against `POST {router}/luisdiscovery`.

use crate::{
    config::RouterConfig,
    error::RouterResult,
    models::{DiscoveryRequest, DiscoveryResponse, LuisAppDetail},
    token_store::{SessionId, TokenStore},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Classified answer from the router.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryOutcome {
    /// Candidate applications, possibly none.
    Success(Vec<LuisAppDetail>),
    /// The token was missing, stale or refused.
    Unauthorized,
    /// Any other non-success status.
    Rejected {
        /// HTTP status returned by the router
        status: StatusCode,
    },
}

/// Asks the router which applications match an utterance.
#[async_trait]
pub trait DiscoveryService: Send + Sync {
    /// Classify `text` using the session's current token.
    ///
    /// # Errors
    ///
    /// Transport failures and undecodable success bodies are errors.
    async fn discover(&self, session: &SessionId, text: &str) -> RouterResult<DiscoveryOutcome>;
}

/// HTTP discovery client.
pub struct DiscoveryClient {
    http: Client,
    endpoint: String,
    spell_check_key: Option<String>,
    enable_telemetry: bool,
    store: Arc<dyn TokenStore>,
}

impl DiscoveryClient {
    /// Create a client for the router described by `config`.
    #[must_use]
    pub fn new(http: Client, config: &RouterConfig, store: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            endpoint: format!("{}/luisdiscovery", config.luis_router_url),
            spell_check_key: config.bing_spell_check_subscription_key.clone(),
            enable_telemetry: config.enable_luis_telemetry,
            store,
        }
    }

    /// The full `/luisdiscovery` URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DiscoveryService for DiscoveryClient {
    #[instrument(skip(self, text), fields(session = %session))]
    async fn discover(&self, session: &SessionId, text: &str) -> RouterResult<DiscoveryOutcome> {
        let token = self.store.get(session).await?.unwrap_or_default();

        let request = DiscoveryRequest {
            text,
            bing_spell_check_subscription_key: self.spell_check_key.as_deref(),
            enable_luis_telemetry: self.enable_telemetry,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token.expose())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: DiscoveryResponse = response.json().await?;
            let details = body.into_app_details();
            debug!(candidates = details.len(), "Discovery succeeded");
            return Ok(DiscoveryOutcome::Success(details));
        }

        if status == StatusCode::UNAUTHORIZED {
            debug!(cold = token.is_empty(), "Discovery unauthorized");
            return Ok(DiscoveryOutcome::Unauthorized);
        }

        warn!(%status, "Discovery rejected");
        Ok(DiscoveryOutcome::Rejected { status })
    }
}
