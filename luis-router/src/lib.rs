//! LUIS router client.
//!
//! Asks a remote router service which LUIS application should handle an
//! utterance. The router is protected by short-lived bearer tokens obtained
//! through an encrypted identity exchange; this crate refreshes the token
//! when the router answers 401 and retries transport failures with a fixed
//! backoff, all within a bounded attempt budget.

pub mod config;
pub mod discovery;
pub mod encryption;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod recognizers;
pub mod router;
pub mod token_store;

pub use config::{LuisAppConfig, RouterConfig};
pub use discovery::{DiscoveryClient, DiscoveryOutcome, DiscoveryService};
pub use encryption::{AesGcmEncryptor, Encryptor};
pub use error::{RouterError, RouterResult};
pub use identity::{IdentityClient, IdentityOutcome, IdentityService};
pub use metrics::RouterMetrics;
pub use models::LuisAppDetail;
pub use orchestrator::{AttemptFailure, RetryOrchestrator, RouteReport, RouteStatus};
pub use recognizers::{PredictionOptions, RecognizerRegistry, RecognizerSpec};
pub use router::LuisRouter;
pub use token_store::{BearerToken, MemoryTokenStore, SessionId, TokenStore};
