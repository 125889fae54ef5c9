//! Shared proptest generators for router types.

use crate::mocks::DiscoveryStep;
use luis_router::{DiscoveryOutcome, LuisAppDetail};
use proptest::prelude::*;
use reqwest::StatusCode;

/// Generate utterances.
pub fn utterance_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z ,?']{0,60}"
}

/// Generate opaque bearer tokens.
pub fn token_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._-]{8,64}"
}

/// Generate session ids.
pub fn session_id_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9-]{36}"
}

/// Generate a discovery candidate.
pub fn app_detail_strategy() -> impl Strategy<Value = LuisAppDetail> {
    (
        prop::option::of("[A-Z][a-z]{2,12}"),
        prop::option::of("[A-Z][a-zA-Z]{2,16}"),
        prop::option::of(0.0f64..=1.0),
    )
        .prop_map(|(app_name, intent, score)| LuisAppDetail {
            app_name,
            intent,
            score,
            ..LuisAppDetail::default()
        })
}

/// Generate non-success, non-401 statuses.
pub fn rejection_status_strategy() -> impl Strategy<Value = StatusCode> {
    prop_oneof![
        Just(StatusCode::BAD_REQUEST),
        Just(StatusCode::FORBIDDEN),
        Just(StatusCode::NOT_FOUND),
        Just(StatusCode::TOO_MANY_REQUESTS),
        Just(StatusCode::INTERNAL_SERVER_ERROR),
        Just(StatusCode::BAD_GATEWAY),
        Just(StatusCode::SERVICE_UNAVAILABLE),
    ]
}

/// Generate one scripted discovery step.
pub fn discovery_step_strategy() -> impl Strategy<Value = DiscoveryStep> {
    prop_oneof![
        prop::collection::vec(app_detail_strategy(), 0..4)
            .prop_map(|apps| DiscoveryStep::Respond(DiscoveryOutcome::Success(apps))),
        Just(DiscoveryStep::Respond(DiscoveryOutcome::Unauthorized)),
        rejection_status_strategy()
            .prop_map(|status| DiscoveryStep::Respond(DiscoveryOutcome::Rejected { status })),
        Just(DiscoveryStep::Fail),
    ]
}

/// Generate a discovery script of up to `max_len` steps.
pub fn discovery_script_strategy(max_len: usize) -> impl Strategy<Value = Vec<DiscoveryStep>> {
    prop::collection::vec(discovery_step_strategy(), 0..=max_len)
}
