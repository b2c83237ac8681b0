// src/error.rs
use thiserror::Error;

/// Failure taxonomy for the run. Everything except `Fatal` is recoverable at
/// node granularity: the node is marked failed, its siblings proceed.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The logical node could not be found in the current rendering after
    /// the document settled.
    #[error("not located")]
    NotLocated,

    /// The expand affordance exhausted its retry budget.
    #[error("could not expand")]
    ExpandFailed(String),

    /// The select affordance exhausted its retry budget.
    #[error("could not select")]
    SelectFailed(String),

    /// The detail panel could not be harvested or parsed.
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// A script round trip against the page failed, e.g. an evaluate timeout
    /// while a slow postback is still rendering. Transient, so the action
    /// primitives retry it; it never aborts the run on its own.
    #[error("evaluate failed: {0}")]
    EvalFailed(String),

    /// Per-node deadline elapsed mid-visit.
    #[error("timeout")]
    DeadlineExceeded,

    /// The browser or document itself is gone. Aborts the run; the engine
    /// still persists whatever was collected before propagating.
    #[error("browser lost: {0}")]
    Fatal(String),
}

impl ScrapeError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScrapeError::Fatal(_))
    }

    /// Short reason recorded in a failed node's record.
    pub fn reason(&self) -> String {
        match self {
            ScrapeError::NotLocated => s!("not located"),
            ScrapeError::ExpandFailed(_) => s!("could not expand"),
            ScrapeError::SelectFailed(_) => s!("could not select"),
            ScrapeError::ExtractionFailed(m) => format!("extraction failed: {m}"),
            ScrapeError::EvalFailed(_) => s!("evaluate failed"),
            ScrapeError::DeadlineExceeded => s!("timeout"),
            ScrapeError::Fatal(m) => format!("browser lost: {m}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
