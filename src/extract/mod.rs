// src/extract/mod.rs
//
// Turns a settled detail panel into a classified Record. The input is a
// plain-data snapshot of the rendering (cell text + visible text), so the
// whole pipeline is pure: running it twice on the same panel yields the
// same Record. Timestamps are the engine's job.

pub mod classify;
pub mod passes;

use serde::Deserialize;

use crate::core::sanitize::normalize_ws;
use crate::record::Record;

/// Snapshot of the detail panel taken in one pass over the live document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DetailPanel {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub decree: Option<String>,
    /// table → row → cell, already stripped to text.
    #[serde(default)]
    pub tables: Vec<Vec<Vec<String>>>,
    /// Visible text of the panel, line structure preserved.
    #[serde(default)]
    pub text: String,
}

pub fn extract(panel: &DetailPanel) -> Record {
    let mut record = Record::default();

    record.title = panel
        .title
        .as_deref()
        .map(normalize_ws)
        .filter(|t| !t.is_empty());
    record.decree = panel
        .decree
        .as_deref()
        .map(normalize_ws)
        .filter(|d| !d.is_empty());

    for pair in passes::collect_pairs(panel) {
        classify::apply(&mut record, &pair.label, &pair.value);
    }
    record
}
