// src/sink.rs
//
// Where (path, record) pairs and the final hierarchy end up. The traversal
// only talks to the trait; the JSON directory layout mirrors the tree.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use crate::config::consts::{SNAPSHOT_FILE, SUMMARY_FILE};
use crate::core::sanitize::safe_filename;
use crate::record::Record;
use crate::tree::node::TraversalSnapshot;

pub trait SnapshotSink {
    /// Called once per visited node, failed ones included.
    fn save_node_record(&mut self, label_path: &str, record: &Record) -> io::Result<()>;

    /// Called exactly once at the end of the run, regardless of failures.
    fn save_final_snapshot(&mut self, snapshot: &TraversalSnapshot) -> io::Result<()>;
}

/// One directory per node (nested like the tree), one JSON file per record,
/// plus `snapshot.json` and a labels-only `summary.json` at the root.
pub struct JsonDirSink {
    root: PathBuf,
}

impl JsonDirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn node_dir(&self, label_path: &str) -> PathBuf {
        let mut dir = self.root.clone();
        for segment in label_path.split('/') {
            dir.push(safe_filename(segment));
        }
        dir
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, value).map_err(io::Error::other)
}

impl SnapshotSink for JsonDirSink {
    fn save_node_record(&mut self, label_path: &str, record: &Record) -> io::Result<()> {
        let dir = self.node_dir(label_path);
        fs::create_dir_all(&dir)?;
        let leaf = label_path.rsplit('/').next().unwrap_or(label_path);
        let file = dir.join(join!(safe_filename(leaf), ".json"));
        write_json(&file, record)
    }

    fn save_final_snapshot(&mut self, snapshot: &TraversalSnapshot) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        write_json(&self.root.join(SNAPSHOT_FILE), snapshot)?;
        write_json(&self.root.join(SUMMARY_FILE), &snapshot.summary())
    }
}

/// Collects everything in memory. Used by the scenario tests.
#[derive(Default)]
pub struct MemorySink {
    pub records: Vec<(String, Record)>,
    pub final_snapshots: usize,
    pub last_summary: Option<serde_json::Value>,
}

impl SnapshotSink for MemorySink {
    fn save_node_record(&mut self, label_path: &str, record: &Record) -> io::Result<()> {
        self.records.push((label_path.to_string(), record.clone()));
        Ok(())
    }

    fn save_final_snapshot(&mut self, snapshot: &TraversalSnapshot) -> io::Result<()> {
        self.final_snapshots += 1;
        self.last_summary = Some(snapshot.summary());
        Ok(())
    }
}
