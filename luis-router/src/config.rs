//! Router client configuration.
//!
//! Layered like the bot host that embeds this client: `appsettings.json`,
//! then `appsettings.{environment}.json`, then environment variables named
//! `LuisRouterConfig__<Key>`. Later layers win. Everything sits under the
//! `LuisRouterConfig` section.
//!
//! Applications can come from the environment as
//! `LuisRouterConfig__LuisApplications__<n>__<Key>`; any such variable
//! replaces the file list, so each entry must be complete.

use crate::error::{RouterError, RouterResult};
use config::{Environment, File, FileFormat};
use router_common::{HttpConfig, RetryConfig};
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Name of the configuration section.
pub const SECTION: &str = "LuisRouterConfig";

/// Nesting separator in environment variable names.
const ENV_SEPARATOR: &str = "__";

/// A LUIS application the host can hand utterances to.
#[derive(Clone, Deserialize)]
pub struct LuisAppConfig {
    /// Name used as registry key and matched against discovery results
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    /// LUIS application id
    #[serde(rename = "AppId", alias = "appid")]
    pub app_id: String,
    /// LUIS authoring key
    #[serde(rename = "AuthoringKey", alias = "authoringkey")]
    pub authoring_key: String,
    /// LUIS endpoint
    #[serde(rename = "Endpoint", alias = "endpoint")]
    pub endpoint: String,
}

impl fmt::Debug for LuisAppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuisAppConfig")
            .field("name", &self.name)
            .field("app_id", &self.app_id)
            .field("authoring_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Router client configuration.
#[derive(Clone, Deserialize)]
pub struct RouterConfig {
    /// Router base URL, without trailing slash
    #[serde(rename = "LuisRouterUrl", alias = "luisrouterurl")]
    pub luis_router_url: String,
    /// Bing spell check key forwarded to the router and recognizers
    #[serde(
        rename = "BingSpellCheckSubscriptionKey",
        alias = "bingspellchecksubscriptionkey",
        default
    )]
    pub bing_spell_check_subscription_key: Option<String>,
    /// Whether LUIS telemetry is logged
    #[serde(rename = "EnableLuisTelemetry", alias = "enableluistelemetry", default)]
    pub enable_luis_telemetry: bool,
    /// Registered LUIS applications
    #[serde(
        rename = "LuisApplications",
        alias = "luisapplications",
        default,
        deserialize_with = "applications"
    )]
    pub luis_applications: Vec<LuisAppConfig>,
    /// Skip TLS certificate validation for router calls
    #[serde(
        rename = "AcceptInvalidCertificates",
        alias = "acceptinvalidcertificates",
        default
    )]
    pub accept_invalid_certificates: bool,
    /// Per-request timeout in seconds
    #[serde(
        rename = "RequestTimeoutSecs",
        alias = "requesttimeoutsecs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,
    /// Retries after the first discovery attempt
    #[serde(rename = "MaxRetries", alias = "maxretries", default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff after a transport failure, in milliseconds
    #[serde(rename = "RetryDelayMs", alias = "retrydelayms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_retry_delay_ms() -> u64 {
    100
}

/// `LuisApplications` arrive as a JSON array from files and as an
/// index-keyed table from `LuisRouterConfig__LuisApplications__<n>__*`
/// variables. Table entries are ordered by index.
fn applications<'de, D>(deserializer: D) -> Result<Vec<LuisAppConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Applications;

    impl<'de> Visitor<'de> for Applications {
        type Value = Vec<LuisAppConfig>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a list of LUIS applications")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut apps = Vec::new();
            while let Some(app) = seq.next_element()? {
                apps.push(app);
            }
            Ok(apps)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut indexed = BTreeMap::new();
            while let Some((key, app)) = map.next_entry::<String, LuisAppConfig>()? {
                let index: usize = key.parse().map_err(|_| {
                    de::Error::custom(format!("LuisApplications index '{key}' is not a number"))
                })?;
                indexed.insert(index, app);
            }
            Ok(indexed.into_values().collect())
        }
    }

    deserializer.deserialize_any(Applications)
}

impl fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterConfig")
            .field("luis_router_url", &self.luis_router_url)
            .field(
                "bing_spell_check_subscription_key",
                &self.bing_spell_check_subscription_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("enable_luis_telemetry", &self.enable_luis_telemetry)
            .field("luis_applications", &self.luis_applications)
            .field("accept_invalid_certificates", &self.accept_invalid_certificates)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}

#[derive(Deserialize)]
struct AppSettings {
    #[serde(rename = "LuisRouterConfig", alias = "luisrouterconfig")]
    luis_router: RouterConfig,
}

impl RouterConfig {
    /// Create a configuration for the given router with defaults elsewhere.
    #[must_use]
    pub fn new(luis_router_url: impl Into<String>) -> Self {
        Self {
            luis_router_url: luis_router_url.into(),
            bing_spell_check_subscription_key: None,
            enable_luis_telemetry: false,
            luis_applications: Vec::new(),
            accept_invalid_certificates: false,
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }

    /// Load configuration for `environment` from files under `content_root`
    /// and the process environment (a `.env` file is read first).
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Config`] if the section is missing, a value has
    /// the wrong type, or validation fails.
    pub fn load(content_root: impl AsRef<Path>, environment: &str) -> RouterResult<Self> {
        dotenvy::dotenv().ok();
        Self::load_with(content_root, environment, std::env::vars())
    }

    /// Like [`RouterConfig::load`], taking environment variables from `vars`
    /// instead of the process environment. Only `LuisRouterConfig__*`
    /// variables are read, case-insensitively.
    ///
    /// # Errors
    ///
    /// See [`RouterConfig::load`].
    pub fn load_with<I>(
        content_root: impl AsRef<Path>,
        environment: &str,
        vars: I,
    ) -> RouterResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let root = content_root.as_ref();
        let prefix = format!("{SECTION}{ENV_SEPARATOR}").to_lowercase();
        let section_vars: config::Map<String, String> = vars
            .into_iter()
            .filter(|(name, _)| name.to_lowercase().starts_with(&prefix))
            .collect();

        let layered = config::Config::builder()
            .add_source(
                File::from(root.join("appsettings.json"))
                    .format(FileFormat::Json)
                    .required(false),
            )
            .add_source(
                File::from(root.join(format!("appsettings.{environment}.json")))
                    .format(FileFormat::Json)
                    .required(false),
            )
            .add_source(
                Environment::default()
                    .separator(ENV_SEPARATOR)
                    .source(Some(section_vars)),
            )
            .build()
            .map_err(|e| RouterError::config(format!("Failed to build config: {e}")))?;

        let settings: AppSettings = layered
            .try_deserialize()
            .map_err(|e| RouterError::config(format!("Failed to deserialize config: {e}")))?;

        let config = settings.luis_router;
        config.validate()?;

        info!(
            environment,
            router = %config.luis_router_url,
            applications = config.luis_applications.len(),
            "Router configuration loaded"
        );
        Ok(config)
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Config`] describing the first problem found.
    pub fn validate(&self) -> RouterResult<()> {
        let url = url::Url::parse(&self.luis_router_url).map_err(|e| {
            RouterError::config(format!("LuisRouterUrl '{}' is invalid: {e}", self.luis_router_url))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(RouterError::config("LuisRouterUrl must start with http:// or https://"));
        }

        if self.luis_router_url.ends_with('/') {
            return Err(RouterError::config("LuisRouterUrl must not end with trailing slash"));
        }

        if self.request_timeout_secs == 0 {
            return Err(RouterError::config("RequestTimeoutSecs must be greater than zero"));
        }

        let mut names = HashSet::new();
        for app in &self.luis_applications {
            if app.name.trim().is_empty() {
                return Err(RouterError::config("LuisApplications entries need a Name"));
            }
            if app.app_id.trim().is_empty() || app.endpoint.trim().is_empty() {
                return Err(RouterError::config(format!(
                    "LuisApplications '{}' needs AppId and Endpoint",
                    app.name
                )));
            }
            if !names.insert(app.name.as_str()) {
                return Err(RouterError::config(format!(
                    "LuisApplications '{}' is registered twice",
                    app.name
                )));
            }
        }

        if self.accept_invalid_certificates {
            warn!("AcceptInvalidCertificates is set; router TLS certificates will not be verified");
        }

        Ok(())
    }

    /// Spell check key, if one is configured and non-empty.
    #[must_use]
    pub fn spell_check_key(&self) -> Option<&str> {
        self.bing_spell_check_subscription_key
            .as_deref()
            .filter(|k| !k.is_empty())
    }

    /// HTTP client settings for router calls.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::default()
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_accept_invalid_certs(self.accept_invalid_certificates)
    }

    /// Retry budget for discovery.
    #[must_use]
    pub const fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}
