//! Progress reporting for dataset downloads.
//!
//! [`ProgressCallback`] decouples fetch progress from any rendering backend.
//! The `indicatif` implementation lives in `parking_stats_cli_utils`;
//! library callers and tests use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates while datasets are downloaded.
///
/// Implementations must be `Send + Sync` since all three datasets are
/// fetched concurrently and share one reporter.
pub trait ProgressCallback: Send + Sync {
    /// Adds `delta` to the expected number of records.
    fn add_total(&self, delta: u64);

    /// Advances progress by `delta` records.
    fn inc(&self, delta: u64);

    /// Updates the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Marks progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Silently ignores all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn add_total(&self, _delta: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
