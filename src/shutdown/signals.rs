//! OS signal listener

use super::TerminationCoordinator;
use crate::error::Result;
use crate::types::TerminationSignal;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Forward SIGINT and SIGTERM to the coordinator as `OsInterrupt`.
///
/// Handlers stay installed for the life of the task, so repeated signals
/// after the first are absorbed by the coordinator instead of killing the
/// process mid-report.
pub fn spawn_signal_listener(coordinator: Arc<TerminationCoordinator>) -> Result<JoinHandle<()>> {
    #[cfg(unix)]
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        loop {
            #[cfg(unix)]
            let received = tokio::select! {
                result = tokio::signal::ctrl_c() => result.is_ok(),
                signal = terminate.recv() => signal.is_some(),
            };

            #[cfg(not(unix))]
            let received = tokio::signal::ctrl_c().await.is_ok();

            if !received {
                break;
            }
            coordinator.trigger(TerminationSignal::OsInterrupt);
        }
    }))
}
