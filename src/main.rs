use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use loyalty_server::accrual::HttpAccrualClient;
use loyalty_server::api;
use loyalty_server::config::Config;
use loyalty_server::reconcile::{ChannelQueue, Worker};
use loyalty_server::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loyalty_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!(
        "Starting loyalty-server (env: {}, store: {}, accrual: {})",
        config.environment,
        config.store_driver,
        config.accrual_address
    );

    // Reconciliation queue: handlers enqueue through the state, the worker
    // requeues through a weak handle that does not hold the queue open.
    let (queue, job_rx) = ChannelQueue::bounded(config.queue_capacity);

    let state = AppState::new(&config, Arc::new(queue.clone())).await?;

    let shutdown = CancellationToken::new();
    let worker = Worker::new(
        Arc::new(state.pool.clone()),
        Arc::new(HttpAccrualClient::new(config.accrual_address.clone())),
        Arc::new(queue.downgrade()),
        Duration::from_secs(config.accrual_poll_interval_secs),
        shutdown.clone(),
    );
    let worker_handle = tokio::spawn(worker.run(job_rx));

    // The state owns the only strong queue handle from here on.
    drop(queue);

    let listener = tokio::net::TcpListener::bind(&config.run_address).await?;
    tracing::info!("loyalty-server HTTP listening on {}", config.run_address);

    let app = api::router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    // No new connections are accepted; stop the worker's next poll and
    // wait for the job in flight to finish its transaction.
    shutdown.cancel();
    if let Err(e) = worker_handle.await {
        tracing::error!("worker task failed: {e}");
    }

    tracing::info!("successful shutdown");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install shutdown signal handler");
    }
    tracing::info!("shutdown signal received");
    shutdown.cancel();
}
