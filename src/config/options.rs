// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use super::consts::*;

/// Everything the run needs, owned by the caller. The core treats these as
/// opaque values; validation (ranges, URL shape) is the CLI's problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub url: String,                 // landing page of the application
    pub root_label: String,          // tree node the traversal starts from
    pub headless: bool,              // false = visible browser window
    pub settle_timeout: Duration,    // per-action wait for the postback
    pub grace: Duration,             // fallback pause when no settle signal
    pub action_pause: Duration,      // breather between interactions
    pub attempts: u32,               // retry budget per action primitive
    pub backoff_step: Duration,      // incremental backoff unit
    pub node_deadline: Duration,     // cap on expand+select+extract per node
    pub max_depth: usize,            // defensive bound on recursion
    pub out_dir: PathBuf,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            url: s!(DEFAULT_URL),
            root_label: s!(DEFAULT_ROOT_LABEL),
            headless: true,
            settle_timeout: Duration::from_millis(SETTLE_TIMEOUT_MS),
            grace: Duration::from_millis(GRACE_MS),
            action_pause: Duration::from_millis(ACTION_PAUSE_MS),
            attempts: ACTION_ATTEMPTS,
            backoff_step: Duration::from_millis(BACKOFF_STEP_MS),
            node_deadline: Duration::from_millis(NODE_DEADLINE_MS),
            max_depth: MAX_DEPTH,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
        }
    }
}
