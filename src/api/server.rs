//! HTTP server lifecycle — bind, spawn, graceful shutdown.

use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Signal the server to stop accepting connections and drain.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Bind `addr` and serve the API in a background task.
///
/// Returns a handle carrying the bound address (useful with port 0)
/// and a shutdown channel.
pub async fn start_server(ctx: ApiContext, addr: SocketAddr) -> Result<ApiServer, std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    let app = api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::identity::DirectoryGateway;
    use crate::store::MemoryStore;

    fn test_ctx() -> ApiContext {
        ApiContext::new(
            Arc::new(MemoryStore::new()),
            Arc::new(DirectoryGateway::with_users(Vec::new())),
        )
    }

    #[tokio::test]
    async fn start_binds_ephemeral_port_and_stops() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let mut server = start_server(test_ctx(), addr).await.expect("server should start");

        assert!(server.addr.port() > 0);

        server.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}
