// src/progress.rs
/// Lightweight progress reporting for the long-running traversal.
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start. `total` is 0 when unknown (the tree is lazy).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one node finished (extracted or failed).
    fn node_done(&mut self, _label_path: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
