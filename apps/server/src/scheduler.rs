//! Background recovery workers.
//!
//! One task per configured market. Each task owns its market's recovery
//! state for its whole lifetime.

use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::main_lib::{build_fetcher, AppState};
use fortacrypt_core::recovery::{MarketWorker, RecoveryStateMachine};

/// Spawns a [`MarketWorker`] for every configured market.
///
/// Each worker gets a child of `cancel`.
pub fn start_recovery_workers(
    state: &Arc<AppState>,
    cancel: &CancellationToken,
) -> JoinSet<(String, fortacrypt_core::Result<()>)> {
    let mut workers = JoinSet::new();

    for settings in state.recovery_config.all_market_settings() {
        let market_id = settings.market_id.clone();
        let machine = RecoveryStateMachine::new(
            build_fetcher(&settings),
            state.ohlc_store.clone(),
            state.state_store.clone(),
            settings,
            cancel.child_token(),
        );
        let worker = MarketWorker::new(machine);

        info!("Starting recovery worker for {}", market_id);
        workers.spawn(async move { (market_id, worker.run().await) });
    }

    workers
}

/// Waits for every worker to stop. Returns how many stopped on an error.
pub async fn join_workers(mut workers: JoinSet<(String, fortacrypt_core::Result<()>)>) -> usize {
    let mut failed = 0;
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((market_id, Ok(()))) => info!("Recovery worker for {} stopped", market_id),
            Ok((market_id, Err(e))) => {
                failed += 1;
                error!("Recovery worker for {} failed: {}", market_id, e);
            }
            Err(e) => {
                failed += 1;
                warn!("Recovery worker task aborted: {}", e);
            }
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::main_lib::build_state;
    use fortacrypt_core::recovery::RecoveryStateStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_cancelled_workers_stop_cleanly() {
        let dir = tempdir().unwrap();
        let config = Config {
            config_path: dir.path().join("missing.json"),
            state_file: dir.path().join("state.json"),
            db_path: dir.path().join("ohlc.db").to_string_lossy().to_string(),
            markets: Some(vec!["btc".to_string(), "eth".to_string()]),
        };
        let state = build_state(&config).await.unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let workers = start_recovery_workers(&state, &cancel);

        assert_eq!(workers.len(), 2);
        assert_eq!(join_workers(workers).await, 0);
        assert!(state.state_store.get_all().unwrap().is_empty());
    }
}
