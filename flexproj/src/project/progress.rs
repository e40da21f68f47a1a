//! Progress reporting and cooperative cancellation for long projections.

/// Observer of a long-running projection.
///
/// Implementations are polled once per outer loop iteration (one raster
/// row), so a `true` from [`ProgressListener::is_cancelled`] stops the
/// operation within one row.
pub trait ProgressListener {
    /// Reports completion in percent, `0.0..=100.0`.
    fn progress(&self, percent: f64);

    /// Whether the operation should stop.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Listener that ignores progress and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressListener for NoProgress {
    fn progress(&self, _percent: f64) {}
}
