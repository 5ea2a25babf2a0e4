//! Historian gateway — HTTP front end for the historian write-path client.
//!
//! Accepts JSON requests to connect to a historian server, resolve tag
//! names to point ids, and write single or batched snapshots. All requests
//! share one historian session.
//!
//! # Configuration
//! | Env var                    | Default                      |
//! |----------------------------|------------------------------|
//! | `HISTORIAN_GATEWAY_ADDR`   | `0.0.0.0:8080`               |
//! | `HISTORIAN_SERVER`         | unset (connect via `/connect`) |
//! | `HISTORIAN_POINT_PREFIX`   | `""`                         |

use std::sync::Arc;

use anyhow::Result;
use historian_client::{ClientConfig, Session};
use tracing::info;

use historian_gateway::{router, AppState, DynTransport};

#[cfg(feature = "piapi")]
fn native_transport() -> Result<DynTransport> {
    Ok(Box::new(historian_client::PiApiTransport::new()))
}

#[cfg(not(feature = "piapi"))]
fn native_transport() -> Result<DynTransport> {
    anyhow::bail!("historian-gateway was built without the `piapi` feature; no historian transport is available")
}

// ------------------------------------------------------------------ //
//  Entry point                                                        //
// ------------------------------------------------------------------ //

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("historian_gateway=info".parse()?)
                .add_directive("historian_client=info".parse()?),
        )
        .json()
        .init();

    let config = ClientConfig::from_env()?;
    let mut session = Session::new(native_transport()?, &config);

    if let Some(server) = config.server.clone() {
        info!(server, "connecting to historian");
        session = tokio::task::spawn_blocking(move || {
            session.connect(&server)?;
            Ok::<_, historian_client::HistorianError>(session)
        })
        .await??;
    }

    let state = Arc::new(AppState::new(session));
    let app = router(state);

    let bind_addr = std::env::var("HISTORIAN_GATEWAY_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = bind_addr, "historian-gateway listening");

    axum::serve(listener, app).await?;

    Ok(())
}
