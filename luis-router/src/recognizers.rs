//! Recognizer registry built from the configured LUIS applications.
//!
//! Each registered application becomes a [`RecognizerSpec`]: what a LUIS
//! recognizer needs to be constructed by the host, including the prediction
//! options implied by the global spell-check and telemetry settings.

use crate::{
    config::{LuisAppConfig, RouterConfig},
    error::{RouterError, RouterResult},
    models::LuisAppDetail,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Prediction options applied to every recognizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionOptions {
    /// Send predictions to the telemetry client
    pub telemetry: bool,
    /// Log predictions
    pub log: bool,
    /// Include personal information in logged predictions
    pub log_personal_information: bool,
    /// Run Bing spell check before prediction
    pub spell_check: bool,
    /// Bing spell check key
    pub bing_spell_check_subscription_key: Option<String>,
    /// Return scores for every intent
    pub include_all_intents: bool,
}

impl PredictionOptions {
    /// Options implied by the router configuration, or `None` when neither
    /// telemetry nor spell check is enabled.
    #[must_use]
    pub fn from_config(config: &RouterConfig) -> Option<Self> {
        let spell_check_key = config.spell_check_key();
        if spell_check_key.is_none() && !config.enable_luis_telemetry {
            return None;
        }

        let mut options = Self::default();

        if config.enable_luis_telemetry {
            options.telemetry = true;
            options.log = true;
            options.log_personal_information = true;
        }

        if let Some(key) = spell_check_key {
            options.bing_spell_check_subscription_key = Some(key.to_string());
            options.spell_check = true;
            options.include_all_intents = true;
        }

        Some(options)
    }
}

/// Everything needed to build one LUIS recognizer.
#[derive(Debug, Clone)]
pub struct RecognizerSpec {
    /// Application registration
    pub application: LuisAppConfig,
    /// Prediction options, absent for plain recognizers
    pub options: Option<PredictionOptions>,
}

/// Recognizers keyed by application name.
#[derive(Debug, Clone, Default)]
pub struct RecognizerRegistry {
    recognizers: BTreeMap<String, RecognizerSpec>,
}

impl RecognizerRegistry {
    /// Build the registry from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Config`] if two applications share a name.
    pub fn from_config(config: &RouterConfig) -> RouterResult<Self> {
        let options = PredictionOptions::from_config(config);
        let mut recognizers = BTreeMap::new();

        for app in &config.luis_applications {
            let spec = RecognizerSpec {
                application: app.clone(),
                options: options.clone(),
            };
            if recognizers.insert(app.name.clone(), spec).is_some() {
                return Err(RouterError::config(format!(
                    "LuisApplications '{}' is registered twice",
                    app.name
                )));
            }
        }

        debug!(count = recognizers.len(), "Recognizer registry built");
        Ok(Self { recognizers })
    }

    /// Look up a recognizer by application name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RecognizerSpec> {
        self.recognizers.get(name)
    }

    /// The recognizer for the first discovery result that names a
    /// registered application.
    #[must_use]
    pub fn resolve<'a>(&'a self, details: &[LuisAppDetail]) -> Option<&'a RecognizerSpec> {
        details
            .iter()
            .filter_map(|d| d.app_name.as_deref())
            .find_map(|name| self.get(name))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recognizers.keys().map(String::as_str)
    }

    /// Iterate over recognizers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecognizerSpec)> {
        self.recognizers.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of registered recognizers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    /// Whether no recognizer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }
}
