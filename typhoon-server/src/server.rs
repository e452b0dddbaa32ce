//! Server lifecycle.
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::router::build_router;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("bind error: {0}")]
    Bind(String),

    #[error("serve error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Bind to the configured address and serve until the process stops.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] for an invalid or unavailable address and
/// [`ServerError::Serve`] when serving fails.
pub async fn start_server(config: &Config, state: Arc<AppState>) -> Result<(), ServerError> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|err| ServerError::Bind(format!("invalid address: {err}")))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| ServerError::Bind(format!("bind failed on {addr}: {err}")))?;

    log::info!("typhoon server listening on {addr}");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
