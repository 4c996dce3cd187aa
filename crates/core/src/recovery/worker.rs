use log::info;

use super::machine::{sleep_unless_cancelled, Action, RecoveryStateMachine};
use crate::errors::Result;

/// Long-running loop for one market.
///
/// Owns the market's [`RecoveryState`](super::RecoveryState) for its whole
/// lifetime, so the state is never written by two tasks.
pub struct MarketWorker {
    machine: RecoveryStateMachine,
}

impl MarketWorker {
    pub fn new(machine: RecoveryStateMachine) -> Self {
        Self { machine }
    }

    pub fn market_id(&self) -> &str {
        self.machine.market_id()
    }

    /// Runs until cancelled or until a cycle fails with a non-retryable error.
    pub async fn run(self) -> Result<()> {
        let market = self.machine.market_id();
        let cancel = self.machine.cancellation();
        let poll_interval = self.machine.settings().poll_interval;
        let mut state = self.machine.states().get_or_create(market)?;

        info!(
            "{}: worker started in {:?} mode",
            market,
            state.mode()
        );

        loop {
            match self.machine.advance(&mut state).await? {
                Action::Continue => {
                    if cancel.is_cancelled() {
                        break;
                    }
                }
                Action::Done => {
                    if !sleep_unless_cancelled(cancel, poll_interval).await {
                        break;
                    }
                }
            }
        }

        info!("{}: worker stopped", market);
        Ok(())
    }
}
