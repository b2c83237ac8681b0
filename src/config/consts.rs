// src/config/consts.rs

// Target site
pub const DEFAULT_URL: &str = "https://sici.rio.rj.gov.br/";
pub const DEFAULT_ROOT_LABEL: &str = "SMS";

// Widget conventions. Every tree link id contains TREE_MARKER; the children
// container of node N is "<prefix>n{N}Nodes" and sits in the DOM even while
// collapsed (display:none).
pub const TREE_MARKER: &str = "ua_treeview";

// A lone child with this literal label means "children exist but are not
// loaded yet". It is clicked once and never persisted.
pub const PLACEHOLDER_LABEL: &str = "0";

// Timing
pub const SETTLE_TIMEOUT_MS: u64 = 10_000;
pub const GRACE_MS: u64 = 1_500;
pub const ACTION_PAUSE_MS: u64 = 300; // be polite between postbacks
pub const NODE_DEADLINE_MS: u64 = 60_000;

// Retry
pub const ACTION_ATTEMPTS: u32 = 3;
pub const BACKOFF_STEP_MS: u64 = 400;

// Traversal
pub const MAX_DEPTH: usize = 12;

// Output
pub const DEFAULT_OUT_DIR: &str = "data";
pub const SNAPSHOT_FILE: &str = "snapshot.json";
pub const SUMMARY_FILE: &str = "summary.json";

// Extraction guards
pub const MAX_LABEL_LEN: usize = 100;
pub const VALUE_BLACKLIST: &[&str] = &["", "-", "N/A", "n/a"];
