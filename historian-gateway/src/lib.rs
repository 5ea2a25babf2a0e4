//! HTTP gateway in front of a historian [`Session`].
//!
//! The session is the process's single binding to a historian server. It sits
//! behind one mutex, so connects, lookups and writes from concurrent requests
//! are serialized; each call runs on tokio's blocking pool.

pub mod error;
pub mod handlers;
pub mod models;

use std::sync::{Arc, Mutex};

use axum::{
    routing::{get, post},
    Router,
};
use historian_client::{HistorianTransport, Session, TagNormalizer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

/// Boxed transport so the router does not depend on the concrete backend.
pub type DynTransport = Box<dyn HistorianTransport + Send>;

// ------------------------------------------------------------------ //
//  Shared application state                                           //
// ------------------------------------------------------------------ //

/// Shared state injected into every Axum handler via `State`.
pub struct AppState {
    session: Arc<Mutex<Session<DynTransport>>>,
    /// Copy of the session's normalizer; lets normalization skip the lock.
    normalizer: TagNormalizer,
}

impl AppState {
    pub fn new(session: Session<DynTransport>) -> Self {
        Self {
            normalizer: session.normalizer().clone(),
            session: Arc::new(Mutex::new(session)),
        }
    }

    pub fn normalizer(&self) -> &TagNormalizer {
        &self.normalizer
    }

    /// Run `f` against the session on the blocking pool, holding the lock
    /// for the whole call.
    pub async fn with_session<R, F>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut Session<DynTransport>) -> historian_client::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let session = Arc::clone(&self.session);
        tokio::task::spawn_blocking(move || {
            let mut guard = session.lock().map_err(|_| ApiError::SessionPoisoned)?;
            f(&mut guard).map_err(ApiError::from)
        })
        .await?
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/connect", post(handlers::connect))
        .route("/tags/normalize", post(handlers::normalize_tag))
        .route("/points/resolve", post(handlers::resolve_point))
        .route("/snapshots", post(handlers::write_snapshot))
        .route("/snapshots/batch", post(handlers::write_snapshot_batch))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
