//! Command-line router client: `luis-router <utterance...>`.
//!
//! Reads `appsettings*.json` from `LUIS_CONTENT_ROOT` for the
//! `LUIS_ENVIRONMENT` environment, authenticates with `LUIS_APP_CODE` and
//! `LUIS_ENCRYPTION_KEY`, and prints the routing report as JSON.

use anyhow::{Context, bail};
use luis_router::{AesGcmEncryptor, LuisRouter, MemoryTokenStore, RouterConfig, SessionId};
use router_common::{TracingConfig, init_tracing};
use std::env;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(&TracingConfig::from_env())?;

    let text = env::args().skip(1).collect::<Vec<_>>().join(" ");
    if text.trim().is_empty() {
        bail!("usage: luis-router <utterance...>");
    }

    let content_root = env::var("LUIS_CONTENT_ROOT").unwrap_or_else(|_| ".".to_string());
    let environment = env::var("LUIS_ENVIRONMENT").unwrap_or_else(|_| "Production".to_string());
    let config = RouterConfig::load(&content_root, &environment)
        .with_context(|| format!("loading router configuration from {content_root}"))?;

    let application_code = env::var("LUIS_APP_CODE").context("LUIS_APP_CODE is not set")?;
    let encryption_key = env::var("LUIS_ENCRYPTION_KEY").context("LUIS_ENCRYPTION_KEY is not set")?;
    let session = env::var("LUIS_SESSION_ID").map_or_else(|_| SessionId::random(), SessionId::from);

    let router = LuisRouter::new(
        config,
        Arc::new(MemoryTokenStore::default()),
        Arc::new(AesGcmEncryptor::new()),
    )?;

    let report = router
        .route_detailed(&session, &text, &application_code, &encryption_key)
        .await;

    if let Some(spec) = router.recognizer_for(&report.apps) {
        info!(application = %spec.application.name, "Matched registered recognizer");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
