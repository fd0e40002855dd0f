//! Batch process termination with per-pid outcome accounting.

use crate::core::outcome::{BatchSummary, Outcome};
use crate::logger::{DiagEvent, DiagLoggerHandle};
use crate::platform::procs::ProcessProvider;

/// Request termination of every pid, independently and in submission order.
///
/// A pid that vanished between snapshot and termination yields a `NotFound`
/// outcome; a privileged process yields `AccessDenied`. Neither aborts the
/// rest of the batch. Success means a termination signal was delivered, not
/// that the process has exited.
pub fn terminate_all(
    provider: &dyn ProcessProvider,
    pids: &[u32],
    logger: Option<&DiagLoggerHandle>,
) -> Vec<Outcome<u32>> {
    pids.iter()
        .map(|&pid| match provider.terminate(pid) {
            Ok(()) => {
                if let Some(logger) = logger {
                    logger.send(DiagEvent::ProcessTerminated { pid });
                }
                Outcome::succeeded(pid)
            }
            Err(kind) => {
                if let Some(logger) = logger {
                    logger.send(DiagEvent::ProcessTerminationFailed { pid, kind });
                }
                Outcome::failed(pid, kind)
            }
        })
        .collect()
}

/// Fold termination outcomes into the shared summary shape.
#[must_use]
pub fn summarize(outcomes: &[Outcome<u32>]) -> BatchSummary<u32> {
    BatchSummary::from_outcomes(outcomes)
}
