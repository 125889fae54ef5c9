//! Sample configuration and router payloads.

use luis_router::{LuisAppConfig, LuisAppDetail, RouterConfig};
use serde_json::{Value, json};

/// Application code used by the fixtures.
pub const APP_CODE: &str = "APP1";

/// Encryption key used by the fixtures.
pub const ENCRYPTION_KEY: &str = "0123456789abcdef0123456789abcdef";

/// A registered LUIS application.
#[must_use]
pub fn sample_app(name: &str) -> LuisAppConfig {
    LuisAppConfig {
        name: name.to_string(),
        app_id: format!("{name}-app-id"),
        authoring_key: format!("{name}-authoring-key"),
        endpoint: "https://westus.api.cognitive.microsoft.com".to_string(),
    }
}

/// Configuration pointing at `router_url` with `Flights` and `Weather` registered.
#[must_use]
pub fn sample_config(router_url: &str) -> RouterConfig {
    let mut config = RouterConfig::new(router_url);
    config.luis_applications = vec![sample_app("Flights"), sample_app("Weather")];
    config.enable_luis_telemetry = true;
    config
}

/// A discovery candidate for `app_name`.
#[must_use]
pub fn app_detail(app_name: &str, intent: &str, score: f64) -> LuisAppDetail {
    LuisAppDetail {
        app_name: Some(app_name.to_string()),
        intent: Some(intent.to_string()),
        score: Some(score),
        ..LuisAppDetail::default()
    }
}

/// The candidate the router returns for a flight booking.
#[must_use]
pub fn flights_detail() -> LuisAppDetail {
    app_detail("Flights", "BookFlight", 0.75)
}

/// `/luisdiscovery` response body carrying `details`.
#[must_use]
pub fn discovery_body(details: &[LuisAppDetail]) -> Value {
    json!({ "Result": { "LuisAppDetails": details } })
}

/// `/identity` response body carrying `token`.
#[must_use]
pub fn identity_body(token: &str) -> Value {
    json!({ "token": token })
}

/// `appsettings.json` content for `router_url`.
#[must_use]
pub fn settings_json(router_url: &str) -> Value {
    json!({
        "LuisRouterConfig": {
            "LuisRouterUrl": router_url,
            "BingSpellCheckSubscriptionKey": "",
            "EnableLuisTelemetry": true,
            "LuisApplications": [
                {
                    "Name": "Flights",
                    "AppId": "flights-app-id",
                    "AuthoringKey": "flights-authoring-key",
                    "Endpoint": "https://westus.api.cognitive.microsoft.com"
                }
            ]
        }
    })
}
