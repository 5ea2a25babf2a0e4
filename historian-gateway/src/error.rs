//! Mapping of client failures onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use historian_client::HistorianError;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Historian(#[from] HistorianError),
    #[error("historian session lock poisoned")]
    SessionPoisoned,
    #[error("historian call task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Historian(e) => match e {
                HistorianError::InvalidTagName(_) | HistorianError::NameTooLong { .. } => {
                    StatusCode::BAD_REQUEST
                }
                HistorianError::PointNotFound { .. } => StatusCode::NOT_FOUND,
                HistorianError::NotConnected => StatusCode::CONFLICT,
                HistorianError::Connect { .. }
                | HistorianError::Write { .. }
                | HistorianError::BatchWrite { .. }
                | HistorianError::Transport(_) => StatusCode::BAD_GATEWAY,
            },
            ApiError::SessionPoisoned | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "historian request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "historian request rejected");
        }

        let mut body = serde_json::json!({ "error": self.to_string() });
        if let ApiError::Historian(e) = &self {
            if let Some(code) = e.native_code() {
                body["code"] = code.into();
            }
            if let HistorianError::BatchWrite {
                index,
                point_id,
                item_code,
                failing_indices,
                ..
            } = e
            {
                body["index"] = (*index).into();
                body["point_id"] = point_id.get().into();
                body["item_code"] = (*item_code).into();
                body["failing_indices"] = serde_json::json!(failing_indices);
            }
        }

        (status, Json(body)).into_response()
    }
}
