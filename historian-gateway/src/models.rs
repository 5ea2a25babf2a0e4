//! HTTP request/response models for the gateway's REST API.

use chrono::NaiveDateTime;
use historian_client::{PointId, SnapshotBatch, SnapshotRecord, Timestamp};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------ //
//  Inbound (client → gateway)                                         //
// ------------------------------------------------------------------ //

/// Request body for `POST /connect`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectRequest {
    pub server: String,
}

/// Request body for `POST /tags/normalize` and `POST /points/resolve`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagRequest {
    pub tag: String,
}

/// One value to write.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotItem {
    pub point_id: PointId,
    pub value: f64,
    /// Local wall-clock time in the historian's reporting zone, e.g.
    /// `2024-06-03T09:15:02.500`.
    pub timestamp: NaiveDateTime,
}

/// Request body for `POST /snapshots/batch`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchRequest {
    pub items: Vec<SnapshotItem>,
}

impl BatchRequest {
    pub fn into_batch(self) -> SnapshotBatch {
        self.items
            .into_iter()
            .map(|item| SnapshotRecord {
                point_id: item.point_id,
                value: item.value,
                timestamp: Timestamp::from(item.timestamp),
            })
            .collect()
    }
}

// ------------------------------------------------------------------ //
//  Outbound (gateway → client)                                        //
// ------------------------------------------------------------------ //

#[derive(Debug, Deserialize, Serialize)]
pub struct ConnectResponse {
    pub server: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NormalizeResponse {
    pub tag: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResolveResponse {
    pub tag: String,
    pub name: String,
    pub point_id: PointId,
}

/// Outcome of a single or batch write.
#[derive(Debug, Deserialize, Serialize)]
pub struct WriteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}
