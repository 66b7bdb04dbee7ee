use actix_web::dev::{Server, ServerHandle};
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Resolves on CTRL+C, or SIGTERM on Unix
pub async fn signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    let mut sigterm =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    #[cfg(unix)]
    let terminate = sigterm.recv();
    #[cfg(not(unix))]
    let terminate = std::future::pending::<Option<()>>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
        _ = terminate => Ok("SIGTERM"),
    }
}

/// Owns the running job board: the HTTP server task and the store pool.
///
/// On shutdown the server stops accepting connections and drains in-flight
/// requests (including pending uploads) before the pool is closed.
pub struct ShutdownCoordinator {
    handle: ServerHandle,
    server: JoinHandle<std::io::Result<()>>,
    pool: PgPool,
}

impl ShutdownCoordinator {
    /// Spawn `server` and take ownership of it together with `pool`
    pub fn start(server: Server, pool: PgPool) -> Self {
        let handle = server.handle();
        Self {
            handle,
            server: tokio::spawn(server),
            pool,
        }
    }

    pub async fn wait_for_shutdown(self) -> std::io::Result<()> {
        let received = signal().await?;
        info!("Received {}, shutting down job board", received);
        self.shutdown().await;
        Ok(())
    }

    async fn shutdown(self) {
        info!("Draining HTTP server");
        self.handle.stop(true).await;

        match self.server.await {
            Ok(Ok(())) => info!("HTTP server stopped"),
            Ok(Err(e)) => error!("HTTP server stopped with error: {:?}", e),
            Err(e) => error!("HTTP server task panicked: {:?}", e),
        }

        self.pool.close().await;
        info!("Job store pool closed; shutdown complete");
    }
}
