use super::{parse_batch, ApiError, AppState, StatusResponse};
use crate::registry::{Position, PositionRecord, StateRecord};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    response::Json,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Body entry for POST /update_traffic_light_states
#[derive(Deserialize)]
struct StateChange {
    state: String,
}

/// GET /get_traffic_light_states
pub(super) async fn list_states(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StateRecord>>, ApiError> {
    Ok(Json(state.registries.traffic_lights.list_states()?))
}

/// GET /get_traffic_light_positions
pub(super) async fn list_positions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PositionRecord>>, ApiError> {
    Ok(Json(state.registries.traffic_lights.list_positions()?))
}

/// POST /update_traffic_light_states - Change state of registered lights
///
/// Body: `{"<id>": {"state": "<label>"}, ...}`. Unregistered ids are dropped unless the
/// registry is configured to reject them.
pub(super) async fn update_states(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let batch: HashMap<String, StateChange> = parse_batch(body, state.body_size_limit)?;

    state
        .registries
        .traffic_lights
        .update_states(batch.into_iter().map(|(id, change)| (id, change.state)))?;

    Ok(Json(StatusResponse {
        status: "states updated",
    }))
}

/// POST /set_traffic_light_positions - Register or move lights
pub(super) async fn set_positions(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let batch: HashMap<String, Position> = parse_batch(body, state.body_size_limit)?;

    let count = state.registries.traffic_lights.set_positions(batch)?;
    debug!(count = count, "Traffic light position batch applied");

    Ok(Json(StatusResponse {
        status: "positions set",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Registries, TrafficLightPolicy, UnknownIdPolicy};
    use serde_json::json;

    fn create_test_state(policy: TrafficLightPolicy) -> Arc<AppState> {
        Arc::new(AppState {
            registries: Arc::new(Registries::new(policy)),
            body_size_limit: 1024,
        })
    }

    fn body(value: serde_json::Value) -> Result<Bytes, BytesRejection> {
        Ok(Bytes::from(value.to_string()))
    }

    #[tokio::test]
    async fn test_set_positions_then_list() {
        let state = create_test_state(TrafficLightPolicy::default());

        let ack = set_positions(State(state.clone()), body(json!({"tl1": [0, 0, 0]})))
            .await
            .unwrap();
        assert_eq!(ack.0.status, "positions set");

        let positions = list_positions(State(state.clone())).await.unwrap();
        assert_eq!(
            positions.0,
            vec![PositionRecord { id: "tl1".to_string(), position: json!([0, 0, 0]) }]
        );

        let states = list_states(State(state)).await.unwrap();
        assert_eq!(
            states.0,
            vec![StateRecord { id: "tl1".to_string(), state: "red".to_string() }]
        );
    }

    #[tokio::test]
    async fn test_update_states_unknown_id_acknowledged() {
        let state = create_test_state(TrafficLightPolicy::default());

        let ack = update_states(State(state.clone()), body(json!({"tlX": {"state": "green"}})))
            .await
            .unwrap();
        assert_eq!(ack.0.status, "states updated");

        let states = list_states(State(state)).await.unwrap();
        assert!(states.0.is_empty());
    }

    #[tokio::test]
    async fn test_update_states_unknown_id_rejected() {
        let state = create_test_state(TrafficLightPolicy {
            unknown_ids: UnknownIdPolicy::Reject,
            ..TrafficLightPolicy::default()
        });

        let result = update_states(State(state), body(json!({"tlX": {"state": "green"}}))).await;
        match result {
            Err(ApiError::UnknownEntity(ids)) => assert_eq!(ids, vec!["tlX".to_string()]),
            _ => panic!("expected UnknownEntity"),
        }
    }

    #[tokio::test]
    async fn test_update_states_missing_state_field() {
        let state = create_test_state(TrafficLightPolicy::default());
        set_positions(State(state.clone()), body(json!({"tl1": [1, 1]})))
            .await
            .unwrap();

        let result =
            update_states(State(state.clone()), body(json!({"tl1": {"color": "green"}}))).await;
        assert!(matches!(result, Err(ApiError::InvalidPayload(_))));

        // Nothing applied
        let states = list_states(State(state)).await.unwrap();
        assert_eq!(states.0[0].state, "red");
    }
}
