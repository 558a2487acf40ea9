//! todo-api バイナリのエントリポイント

use application::TodoUseCase;
use infrastructure::{DynamoDbClient, DynamoDbHealthChecker, DynamoDbTodoRepository};
use shared::{init_tracing, Config};
use std::{net::SocketAddr, sync::Arc};
use todo_api::{app_with_state, AppState};
use tokio::{net::TcpListener, sync::oneshot};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().map_err(|e| anyhow::anyhow!(e))?;

    let config = Config::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e
    })?;

    let db = DynamoDbClient::new(&config).await;
    let repo = Arc::new(DynamoDbTodoRepository::new(db.clone(), config.dynamodb_timeout));
    let usecase = TodoUseCase::new(repo);
    let health = Arc::new(DynamoDbHealthChecker::new(db, config.dynamodb_timeout));
    let app = app_with_state(AppState::new(usecase, health));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, table = %config.dynamodb_table, "server starting");

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let serve = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });
    let mut server = tokio::spawn(async move { serve.await });

    tokio::select! {
        joined = &mut server => {
            // シグナル前にサーバが終了した場合
            joined??;
            return Ok(());
        }
        _ = signalled_rx => {}
    }

    info!("Shutting down server...");
    match tokio::time::timeout(config.shutdown_timeout, server).await {
        Ok(joined) => joined??,
        Err(_) => {
            error!(timeout = ?config.shutdown_timeout, "Server forced to shutdown");
            anyhow::bail!("graceful shutdown timed out");
        }
    }

    info!("Server exiting");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
