// src/tree/driver.rs
use crate::error::Result;
use crate::record::Record;

/// Handle to one node in the *current* rendering. The widget renumbers ids on
/// every postback, so a handle is only good until the next action settles;
/// the engine re-locates before every use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeHandle {
    pub raw_id: String,
}

/// Seam between the traversal engine and the live document. The browser-backed
/// implementation is `live::LiveTree`; tests script a fake.
pub trait TreeDriver {
    /// Search the current rendering for the node with this label whose
    /// ancestor chain matches `trail` (root first). `None` is recoverable.
    fn locate(&mut self, trail: &[String], label: &str) -> Result<Option<NodeHandle>>;

    /// Whether the node shows an expand/collapse affordance.
    fn has_expander(&mut self, handle: &NodeHandle) -> Result<bool>;

    /// Reveal the node's children. Idempotent; no-op when already expanded.
    fn expand(&mut self, handle: &NodeHandle) -> Result<()>;

    /// Load the node's detail panel.
    fn select(&mut self, handle: &NodeHandle) -> Result<()>;

    /// Child labels in display order, raw, placeholder entries included.
    /// Filtering is the engine's job.
    fn children(&mut self, handle: &NodeHandle) -> Result<Vec<String>>;

    /// Trigger the lone placeholder child so the server materialises the
    /// real children.
    fn materialize_placeholder(&mut self, handle: &NodeHandle) -> Result<()>;

    /// Parse the currently settled detail panel.
    fn extract(&mut self) -> Result<Record>;
}
