//! Token-refreshing retry loop around discovery.
//!
//! Each attempt is one discovery call:
//! - success ends the loop with the router's candidates;
//! - 401 triggers one identity exchange and an immediate retry;
//! - any other status wastes the attempt without waiting;
//! - a transport error waits the backoff delay before the next attempt.
//!
//! The loop makes at most `max_retries + 1` discovery calls and never
//! returns an error. [`RetryOrchestrator::route`] yields an empty list when
//! nothing matched; [`RetryOrchestrator::route_detailed`] also says why.

use crate::{
    discovery::{DiscoveryOutcome, DiscoveryService},
    error::RouterResult,
    identity::{IdentityOutcome, IdentityService},
    metrics::RouterMetrics,
    models::LuisAppDetail,
    token_store::SessionId,
};
use router_common::RetryPolicy;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Why a single attempt did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptFailure {
    /// Discovery answered 401 and a new token was stored.
    Unauthorized,
    /// Discovery answered 401 and the router refused the identity claim.
    IdentityRejected {
        /// Status returned by `/identity`
        status: u16,
    },
    /// Discovery answered with a status other than success or 401.
    Rejected {
        /// Status returned by `/luisdiscovery`
        status: u16,
    },
    /// The call failed before a response could be classified.
    Transport {
        /// Error description
        message: String,
    },
}

/// How a routing call ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RouteStatus {
    /// Discovery succeeded; the candidate list may still be empty.
    Matched,
    /// Every attempt failed.
    Exhausted {
        /// Failure of the final attempt
        last_failure: Option<AttemptFailure>,
    },
    /// Stopped early on an error that retrying cannot fix.
    Aborted {
        /// Error description
        reason: String,
    },
}

/// Result of a routing call with its bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteReport {
    /// Candidate applications, empty unless `status` is `Matched`
    pub apps: Vec<LuisAppDetail>,
    /// How the call ended
    #[serde(flatten)]
    pub status: RouteStatus,
    /// Discovery calls made
    pub attempts: u32,
    /// Identity exchanges started
    pub identity_exchanges: u32,
}

impl RouteReport {
    /// Whether discovery succeeded.
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        matches!(self.status, RouteStatus::Matched)
    }

    /// Whether the attempt budget ran out.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self.status, RouteStatus::Exhausted { .. })
    }
}

enum AttemptStep {
    Matched(Vec<LuisAppDetail>),
    Failed(AttemptFailure),
}

/// Drives discovery, re-authentication and retries for one utterance.
pub struct RetryOrchestrator {
    discovery: Arc<dyn DiscoveryService>,
    identity: Arc<dyn IdentityService>,
    policy: RetryPolicy,
    metrics: Arc<RouterMetrics>,
}

impl RetryOrchestrator {
    /// Create an orchestrator over the given services.
    #[must_use]
    pub fn new(
        discovery: Arc<dyn DiscoveryService>,
        identity: Arc<dyn IdentityService>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            discovery,
            identity,
            policy,
            metrics: Arc::new(RouterMetrics::default()),
        }
    }

    /// Record into shared metrics instead of private ones.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<RouterMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The retry policy in use.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Protocol counters.
    #[must_use]
    pub fn metrics(&self) -> &RouterMetrics {
        &self.metrics
    }

    /// Candidate applications for `text`, or an empty list if the router
    /// could not be asked successfully.
    pub async fn route(
        &self,
        session: &SessionId,
        text: &str,
        application_code: &str,
        encryption_key: &str,
    ) -> Vec<LuisAppDetail> {
        self.route_detailed(session, text, application_code, encryption_key)
            .await
            .apps
    }

    /// Route `text` and report how the call ended.
    #[instrument(skip(self, text, application_code, encryption_key), fields(session = %session))]
    pub async fn route_detailed(
        &self,
        session: &SessionId,
        text: &str,
        application_code: &str,
        encryption_key: &str,
    ) -> RouteReport {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;
        let mut exchanges = 0;
        let mut last_failure = None;

        while attempt < max_attempts {
            let step = self
                .attempt(session, text, application_code, encryption_key, &mut exchanges)
                .await;

            match step {
                Ok(AttemptStep::Matched(apps)) => {
                    info!(attempts = attempt + 1, candidates = apps.len(), "Utterance routed");
                    return RouteReport {
                        apps,
                        status: RouteStatus::Matched,
                        attempts: attempt + 1,
                        identity_exchanges: exchanges,
                    };
                }
                Ok(AttemptStep::Failed(failure)) => {
                    debug!(attempt, ?failure, "Attempt failed");
                    last_failure = Some(failure);
                }
                Err(err) if !err.is_retryable() => {
                    error!(attempt, error = %err, "Routing aborted");
                    return RouteReport {
                        apps: Vec::new(),
                        status: RouteStatus::Aborted {
                            reason: err.to_string(),
                        },
                        attempts: attempt + 1,
                        identity_exchanges: exchanges,
                    };
                }
                Err(err) => {
                    self.metrics.transport_failures.inc();
                    warn!(attempt, error = %err, "Router call failed");
                    if self.policy.should_retry(&err, attempt) {
                        self.policy.backoff().await;
                    }
                    last_failure = Some(AttemptFailure::Transport {
                        message: err.to_string(),
                    });
                }
            }

            attempt += 1;
        }

        self.metrics.exhausted_routes.inc();
        warn!(attempts = attempt, ?last_failure, "Routing attempts exhausted");
        RouteReport {
            apps: Vec::new(),
            status: RouteStatus::Exhausted { last_failure },
            attempts: attempt,
            identity_exchanges: exchanges,
        }
    }

    async fn attempt(
        &self,
        session: &SessionId,
        text: &str,
        application_code: &str,
        encryption_key: &str,
        exchanges: &mut u32,
    ) -> RouterResult<AttemptStep> {
        self.metrics.discovery_attempts.inc();

        match self.discovery.discover(session, text).await? {
            DiscoveryOutcome::Success(apps) => Ok(AttemptStep::Matched(apps)),
            DiscoveryOutcome::Unauthorized => {
                *exchanges += 1;
                self.metrics.identity_exchanges.inc();

                let outcome = self
                    .identity
                    .exchange(session, application_code, encryption_key)
                    .await?;

                Ok(AttemptStep::Failed(match outcome {
                    IdentityOutcome::Refreshed => AttemptFailure::Unauthorized,
                    IdentityOutcome::Rejected { status } => AttemptFailure::IdentityRejected {
                        status: status.as_u16(),
                    },
                }))
            }
            DiscoveryOutcome::Rejected { status } => Ok(AttemptStep::Failed(
                AttemptFailure::Rejected {
                    status: status.as_u16(),
                },
            )),
        }
    }
}
