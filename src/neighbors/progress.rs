//! Progress reporting for long-running estimation.

/// Receives progress notifications from the estimator.
///
/// Implementations only observe; they cannot influence the computation.
pub trait ProgressObserver {
    /// Called after `done` of `total` proteins have been processed.
    fn on_progress(&mut self, done: usize, total: usize);
}

/// Logs progress through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, done: usize, total: usize) {
        log::info!("Calculated neighbour statistics for {} out of {} proteins", done, total);
    }
}

/// Discards all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _done: usize, _total: usize) {}
}

/// Whether a notification is due after `done` of `total` items.
pub(crate) fn is_due(done: usize, total: usize, interval: usize) -> bool {
    done == total || (interval > 0 && done % interval == 0)
}
