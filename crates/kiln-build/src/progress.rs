//! Build progress notifications

/// Receives progress events from the orchestrator
///
/// All methods default to doing nothing.
pub trait BuildObserver {
    /// A project starts compiling `total` units
    fn project_started(&self, _project: &str, _total: usize) {}

    /// Unit `done` of `total` finished compiling
    fn unit_finished(&self, _project: &str, _done: usize, _total: usize) {}

    /// A project finished, successfully or not
    fn project_finished(&self, _project: &str, _success: bool) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl BuildObserver for SilentObserver {}
