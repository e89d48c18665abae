/// Label reported by the finalize pipeline.
pub const PROGRESS_LABEL: &str = "gif builder";

/// Receives `(current, total, label)` after every rendered frame. `current` is 1-based.
pub trait ProgressReporter {
    /// Report that `current` of `total` units are done.
    fn report(&mut self, current: u64, total: u64, label: &str);
}

/// Emits progress as `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&mut self, current: u64, total: u64, label: &str) {
        tracing::debug!(current, total, label, "progress");
    }
}

/// Drops every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn report(&mut self, _current: u64, _total: u64, _label: &str) {}
}

impl<F> ProgressReporter for F
where
    F: FnMut(u64, u64, &str),
{
    fn report(&mut self, current: u64, total: u64, label: &str) {
        self(current, total, label)
    }
}
