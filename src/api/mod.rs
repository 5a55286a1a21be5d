// HTTP API: one router exposing every registry

mod error;
mod positions;
mod traffic_lights;

pub use error::ApiError;

use crate::registry::{MovableKind, Registries};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    routing::{get, post},
    Router,
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registries: Arc<Registries>,
    /// Bodies longer than this are refused with 413
    pub body_size_limit: usize,
}

/// Acknowledgement body for update endpoints
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

/// Create router with all registry endpoints
pub fn create_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.body_size_limit);
    let mut router: Router<Arc<AppState>> = Router::new();

    for kind in MovableKind::ALL {
        router = router
            .route(
                &format!("/update_{}_positions", kind.slug()),
                post(
                    move |State(state): State<Arc<AppState>>,
                          body: Result<Bytes, BytesRejection>| {
                        positions::update_positions(kind, state, body)
                    },
                ),
            )
            .route(
                &format!("/get_{}_positions", kind.slug()),
                get(move |State(state): State<Arc<AppState>>| {
                    positions::list_positions(kind, state)
                }),
            );
    }

    router
        .route("/get_traffic_light_states", get(traffic_lights::list_states))
        .route("/get_traffic_light_positions", get(traffic_lights::list_positions))
        .route("/update_traffic_light_states", post(traffic_lights::update_states))
        .route("/set_traffic_light_positions", post(traffic_lights::set_positions))
        .layer(body_limit)
        .with_state(Arc::new(state))
}

/// Check body size, then decode a JSON object keyed by entity id
fn parse_batch<T: DeserializeOwned>(
    body: Result<Bytes, BytesRejection>,
    limit: usize,
) -> Result<HashMap<String, T>, ApiError> {
    let body = body?;
    if body.len() > limit {
        return Err(ApiError::PayloadTooLarge);
    }

    serde_json::from_slice(&body).map_err(|e| ApiError::InvalidPayload(e.to_string()))
}
