use axum::Router;
use rendezvous_domain::{RendezvousError, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Serve `router` on `listener` until `shutdown` is cancelled. `name` only
/// labels log lines.
pub async fn serve(
    name: &'static str,
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> Result<()> {
    if let Ok(address) = listener.local_addr() {
        info!(server = name, %address, "listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| RendezvousError::Network(format!("{name} server failed: {e}")))?;
    info!(server = name, "stopped");
    Ok(())
}

/// Bind `address`, mapping failures into the domain error.
pub async fn bind(address: &str) -> Result<TcpListener> {
    TcpListener::bind(address)
        .await
        .map_err(|e| RendezvousError::Config(format!("cannot bind {address}: {e}")))
}
