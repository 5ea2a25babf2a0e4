//! Axum HTTP handlers for the historian gateway.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use crate::{
    error::ApiError,
    models::{
        BatchRequest, ConnectRequest, ConnectResponse, NormalizeResponse, ResolveResponse,
        SnapshotItem, TagRequest, WriteResponse,
    },
    AppState,
};

// ------------------------------------------------------------------ //
//  POST /connect                                                      //
// ------------------------------------------------------------------ //

/// Point the shared session at another server node.
pub async fn connect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>, ApiError> {
    let server = req.server.clone();
    state
        .with_session(move |session| session.connect(&server))
        .await?;

    info!(server = %req.server, "historian session connected");
    Ok(Json(ConnectResponse { server: req.server }))
}

// ------------------------------------------------------------------ //
//  Tags and points                                                    //
// ------------------------------------------------------------------ //

/// POST /tags/normalize
pub async fn normalize_tag(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TagRequest>,
) -> Result<Json<NormalizeResponse>, ApiError> {
    let name = state.normalizer().normalize(&req.tag)?;
    Ok(Json(NormalizeResponse { tag: req.tag, name }))
}

/// POST /points/resolve
pub async fn resolve_point(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TagRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let name = state.normalizer().normalize(&req.tag)?;
    let lookup = name.clone();
    let point_id = state
        .with_session(move |session| session.resolve_point(&lookup))
        .await?;

    Ok(Json(ResolveResponse {
        tag: req.tag,
        name,
        point_id,
    }))
}

// ------------------------------------------------------------------ //
//  Snapshots                                                          //
// ------------------------------------------------------------------ //

/// POST /snapshots
pub async fn write_snapshot(
    State(state): State<Arc<AppState>>,
    Json(item): Json<SnapshotItem>,
) -> Result<Json<WriteResponse>, ApiError> {
    let SnapshotItem {
        point_id,
        value,
        timestamp,
    } = item;
    state
        .with_session(move |session| session.write_snapshot(point_id, value, timestamp))
        .await?;

    Ok(Json(WriteResponse {
        success: true,
        count: None,
    }))
}

/// POST /snapshots/batch
pub async fn write_snapshot_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<WriteResponse>, ApiError> {
    let batch = req.into_batch();
    let count = batch.len();
    state
        .with_session(move |session| session.write_snapshot_batch(&batch))
        .await?;

    info!(count, "snapshot batch written");
    Ok(Json(WriteResponse {
        success: true,
        count: Some(count),
    }))
}

// ------------------------------------------------------------------ //
//  Health                                                             //
// ------------------------------------------------------------------ //

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}
