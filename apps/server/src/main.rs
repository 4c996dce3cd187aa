mod config;
mod main_lib;
mod scheduler;

use config::Config;
use main_lib::{build_state, init_tracing};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    init_tracing();
    let state = build_state(&config).await?;

    let cancel = CancellationToken::new();
    let workers = scheduler::start_recovery_workers(&state, &cancel);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown requested, stopping recovery workers");
                cancel.cancel();
            }
            Err(e) => tracing::error!("Unable to listen for shutdown signal: {}", e),
        }
    });

    let failed = scheduler::join_workers(workers).await;
    if failed > 0 {
        anyhow::bail!("{} recovery workers stopped on an error", failed);
    }
    tracing::info!("All recovery workers stopped");
    Ok(())
}
