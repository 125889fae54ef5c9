//! Router facade wiring configuration, token storage and the HTTP clients.

use crate::{
    config::RouterConfig,
    discovery::DiscoveryClient,
    encryption::Encryptor,
    error::RouterResult,
    identity::IdentityClient,
    metrics::RouterMetrics,
    models::LuisAppDetail,
    orchestrator::{RetryOrchestrator, RouteReport},
    recognizers::{RecognizerRegistry, RecognizerSpec},
    token_store::{SessionId, TokenStore},
};
use router_common::{RetryPolicy, build_http_client};
use std::sync::Arc;
use tracing::info;

/// Entry point for hosts: routes utterances and hands out recognizers.
pub struct LuisRouter {
    config: RouterConfig,
    registry: RecognizerRegistry,
    store: Arc<dyn TokenStore>,
    orchestrator: RetryOrchestrator,
}

impl LuisRouter {
    /// Validate `config` and build the router clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(
        config: RouterConfig,
        store: Arc<dyn TokenStore>,
        encryptor: Arc<dyn Encryptor>,
    ) -> RouterResult<Self> {
        config.validate()?;

        let http = build_http_client(&config.http_config())?;
        let registry = RecognizerRegistry::from_config(&config)?;

        let discovery = DiscoveryClient::new(http.clone(), &config, store.clone());
        let identity = IdentityClient::new(http, &config.luis_router_url, encryptor, store.clone());
        let orchestrator = RetryOrchestrator::new(
            Arc::new(discovery),
            Arc::new(identity),
            RetryPolicy::new(config.retry_config()),
        );

        info!(
            router = %config.luis_router_url,
            recognizers = registry.len(),
            "LUIS router ready"
        );

        Ok(Self {
            config,
            registry,
            store,
            orchestrator,
        })
    }

    /// Share protocol counters with other components.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<RouterMetrics>) -> Self {
        self.orchestrator = self.orchestrator.with_metrics(metrics);
        self
    }

    /// Candidate applications for `text`; empty if none or unreachable.
    pub async fn route(
        &self,
        session: &SessionId,
        text: &str,
        application_code: &str,
        encryption_key: &str,
    ) -> Vec<LuisAppDetail> {
        self.orchestrator
            .route(session, text, application_code, encryption_key)
            .await
    }

    /// Route `text` and report how the call ended.
    pub async fn route_detailed(
        &self,
        session: &SessionId,
        text: &str,
        application_code: &str,
        encryption_key: &str,
    ) -> RouteReport {
        self.orchestrator
            .route_detailed(session, text, application_code, encryption_key)
            .await
    }

    /// Recognizer for the best discovery candidate that is registered.
    #[must_use]
    pub fn recognizer_for(&self, details: &[LuisAppDetail]) -> Option<&RecognizerSpec> {
        self.registry.resolve(details)
    }

    /// All registered recognizers.
    #[must_use]
    pub const fn recognizers(&self) -> &RecognizerRegistry {
        &self.registry
    }

    /// The session token store.
    #[must_use]
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Protocol counters.
    #[must_use]
    pub fn metrics(&self) -> &RouterMetrics {
        self.orchestrator.metrics()
    }

    /// The configuration the router was built with.
    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }
}
