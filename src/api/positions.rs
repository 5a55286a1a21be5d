use super::{parse_batch, ApiError, AppState, StatusResponse};
use crate::registry::{MovableKind, Position, PositionRecord};
use axum::{body::Bytes, extract::rejection::BytesRejection, response::Json};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// POST /update_{kind}_positions - Merge a batch of id -> position
pub(super) async fn update_positions(
    kind: MovableKind,
    state: Arc<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let batch: HashMap<String, Position> = parse_batch(body, state.body_size_limit)?;

    let written = state.registries.movable(kind).upsert(batch)?;
    debug!(kind = %kind, count = written, "Position batch applied");

    Ok(Json(StatusResponse { status: "success" }))
}

/// GET /get_{kind}_positions - Snapshot of every entity of this kind
pub(super) async fn list_positions(
    kind: MovableKind,
    state: Arc<AppState>,
) -> Result<Json<Vec<PositionRecord>>, ApiError> {
    let records = state.registries.movable(kind).list_all()?;
    Ok(Json(records))
}
