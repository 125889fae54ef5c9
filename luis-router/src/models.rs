//! Wire types for the router's identity and discovery endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity claim encrypted into the `/identity` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRequest {
    /// Application code issued by the router operator
    pub appcode: String,
    /// Time the claim was made
    pub timestamp: DateTime<Utc>,
}

impl IdentityRequest {
    /// Build a claim stamped with the current time.
    #[must_use]
    pub fn now(application_code: impl Into<String>) -> Self {
        Self {
            appcode: application_code.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Body of `POST /identity`.
#[derive(Debug, Serialize)]
pub struct IdentityEnvelope<'a> {
    /// Encrypted, serialized [`IdentityRequest`]
    #[serde(rename = "AppIdentity")]
    pub app_identity: &'a str,
}

/// Successful `/identity` response.
#[derive(Debug, Deserialize)]
pub struct IdentityResponse {
    /// Bearer token for `/luisdiscovery`
    pub token: String,
}

/// Body of `POST /luisdiscovery`.
#[derive(Debug, Serialize)]
pub struct DiscoveryRequest<'a> {
    /// Utterance to classify
    #[serde(rename = "Text")]
    pub text: &'a str,
    /// Bing spell check key, serialized as null when absent
    #[serde(rename = "BingSpellCheckSubscriptionKey")]
    pub bing_spell_check_subscription_key: Option<&'a str>,
    /// Whether the router should log LUIS telemetry
    #[serde(rename = "EnableLuisTelemetry")]
    pub enable_luis_telemetry: bool,
}

/// Successful `/luisdiscovery` response.
#[derive(Debug, Deserialize)]
pub struct DiscoveryResponse {
    #[serde(rename = "Result", default)]
    result: Option<DiscoveryResult>,
}

#[derive(Debug, Deserialize)]
struct DiscoveryResult {
    #[serde(rename = "LuisAppDetails", default)]
    luis_app_details: Option<Vec<LuisAppDetail>>,
}

impl DiscoveryResponse {
    /// Candidate applications in router order. A missing or null
    /// `Result`/`LuisAppDetails` yields an empty list.
    #[must_use]
    pub fn into_app_details(self) -> Vec<LuisAppDetail> {
        self.result
            .and_then(|r| r.luis_app_details)
            .unwrap_or_default()
    }
}

/// A candidate LUIS application returned by discovery.
///
/// Fields the router documents are typed; everything else it sends is kept
/// in `extra` and serialized back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LuisAppDetail {
    /// Registered application name
    #[serde(rename = "AppName", default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    /// Top intent predicted for the utterance
    #[serde(rename = "Intent", default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Confidence of the prediction
    #[serde(rename = "Score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Any other metadata
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_discovery_request_wire_format() {
        let request = DiscoveryRequest {
            text: "book a flight",
            bing_spell_check_subscription_key: None,
            enable_luis_telemetry: true,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "Text": "book a flight",
                "BingSpellCheckSubscriptionKey": null,
                "EnableLuisTelemetry": true
            })
        );
    }

    #[test]
    fn test_identity_envelope_wire_format() {
        let envelope = IdentityEnvelope { app_identity: "c2VjcmV0" };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({ "AppIdentity": "c2VjcmV0" }));
    }

    #[test]
    fn test_identity_request_fields() {
        let request = IdentityRequest::now("APP1");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["appcode"], "APP1");
        let stamp = value["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[test]
    fn test_discovery_response_extracts_details() {
        let body = json!({
            "Result": {
                "LuisAppDetails": [
                    { "AppName": "flights", "Intent": "BookFlight", "Score": 0.92, "AppId": "a-1" },
                    { "id": "hotels" }
                ]
            }
        });

        let details = serde_json::from_value::<DiscoveryResponse>(body)
            .unwrap()
            .into_app_details();

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].app_name.as_deref(), Some("flights"));
        assert_eq!(details[0].intent.as_deref(), Some("BookFlight"));
        assert_eq!(details[0].score, Some(0.92));
        assert_eq!(details[0].extra["AppId"], "a-1");
        assert_eq!(details[1].app_name, None);
        assert_eq!(details[1].extra["id"], "hotels");
    }

    #[test]
    fn test_discovery_response_null_result_is_empty() {
        for body in [json!({}), json!({ "Result": null }), json!({ "Result": { "LuisAppDetails": null } })] {
            let details = serde_json::from_value::<DiscoveryResponse>(body)
                .unwrap()
                .into_app_details();
            assert!(details.is_empty());
        }
    }

    #[test]
    fn test_app_detail_preserves_unknown_fields() {
        let detail: LuisAppDetail = serde_json::from_value(json!({ "id": "flights" })).unwrap();
        assert_eq!(serde_json::to_value(&detail).unwrap(), json!({ "id": "flights" }));
    }
}
