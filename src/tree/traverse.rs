// src/tree/traverse.rs
//
// The traversal engine: depth-first, pre-order, one node at a time against a
// document that is regenerated by every interaction. Node-local failures are
// recorded and swallowed; only the loss of the browser aborts the run, and
// even then the partial snapshot is persisted first.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Local;
use tracing::{debug, warn};

use crate::config::consts::PLACEHOLDER_LABEL;
use crate::config::options::ScrapeOptions;
use crate::error::Result;
use crate::progress::Progress;
use crate::record::Record;
use crate::sink::SnapshotSink;
use crate::tree::driver::TreeDriver;
use crate::tree::node::{LogicalNode, TraversalSnapshot, VisitState};

pub struct Traverser<'a, D: TreeDriver> {
    driver: &'a mut D,
    sink: &'a mut dyn SnapshotSink,
    opts: &'a ScrapeOptions,
    progress: Option<&'a mut dyn Progress>,
    visited: usize,
    failed: usize,
}

impl<'a, D: TreeDriver> Traverser<'a, D> {
    pub fn new(
        driver: &'a mut D,
        sink: &'a mut dyn SnapshotSink,
        opts: &'a ScrapeOptions,
        progress: Option<&'a mut dyn Progress>,
    ) -> Self {
        Self { driver, sink, opts, progress, visited: 0, failed: 0 }
    }

    pub fn visited(&self) -> usize { self.visited }
    pub fn failed(&self) -> usize { self.failed }

    /// Walk the whole tree from the configured root. The final snapshot is
    /// handed to the sink on every exit path, fatal ones included.
    pub fn run(&mut self) -> Result<TraversalSnapshot> {
        if let Some(p) = self.progress.as_deref_mut() {
            p.begin(0); // total unknown: the tree reveals itself lazily
            p.log(&format!("Traversing from '{}'", self.opts.root_label));
        }

        let mut snapshot = TraversalSnapshot::default();
        let mut root = LogicalNode::new(self.opts.root_label.clone(), vec![], 0);
        let outcome = self.visit(&mut root, &[], &mut snapshot.records);
        snapshot.root = Some(root);

        if let Err(e) = self.sink.save_final_snapshot(&snapshot) {
            warn!(error = %e, "could not persist final snapshot");
        }
        if let Some(p) = self.progress.as_deref_mut() {
            p.finish();
        }

        outcome.map(|_| snapshot)
    }

    /// One node: locate → expand → select → extract → persist → children.
    /// Returns Err only for fatal conditions; everything else is recorded on
    /// the node and the traversal moves on.
    fn visit(
        &mut self,
        node: &mut LogicalNode,
        trail: &[String],
        records: &mut BTreeMap<String, Record>,
    ) -> Result<()> {
        let label_path = label_path(trail, &node.label);
        let started = Instant::now();

        if node.depth > self.opts.max_depth {
            self.fail(node, &label_path, records, "max depth exceeded");
            return Ok(());
        }
        if let Some(p) = self.progress.as_deref_mut() {
            p.log(&format!("[{}] {}", node.depth, label_path));
        }
        debug!(node = %label_path, "visiting");

        // 1. Locate in the current rendering.
        let handle = match self.driver.locate(trail, &node.label) {
            Ok(Some(h)) => h,
            Ok(None) => {
                self.fail(node, &label_path, records, "not located");
                return Ok(());
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                self.fail(node, &label_path, records, &e.reason());
                return Ok(());
            }
        };

        // 2. Expand when the affordance exists. Failure is remembered but the
        // node may still be selectable.
        node.visit_state = VisitState::Expanding;
        let mut expand_error: Option<String> = None;
        match self.driver.has_expander(&handle) {
            Ok(true) => match self.driver.expand(&handle) {
                Ok(()) => node.visit_state = VisitState::Expanded,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => expand_error = Some(e.reason()),
            },
            Ok(false) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(_) => {} // treated as not expandable
        }

        if started.elapsed() > self.opts.node_deadline {
            self.fail(node, &label_path, records, "timeout");
            return Ok(());
        }

        // 3. Select. The expand postback regenerated the document, so the
        // earlier handle is stale. Locate again first.
        let handle = match self.driver.locate(trail, &node.label) {
            Ok(Some(h)) => h,
            Ok(None) => {
                self.fail(node, &label_path, records, "not located");
                return Ok(());
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                self.fail(node, &label_path, records, &e.reason());
                return Ok(());
            }
        };
        match self.driver.select(&handle) {
            Ok(()) => node.visit_state = VisitState::Selected,
            Err(e) if e.is_fatal() => return Err(e),
            Err(_) => {
                self.fail(node, &label_path, records, "could not select");
                return Ok(());
            }
        }

        if started.elapsed() > self.opts.node_deadline {
            self.fail(node, &label_path, records, "timeout");
            return Ok(());
        }

        // 4. Extract and persist. A parse failure still yields a record with
        // its error inline, never an aborted node.
        let mut record = match self.driver.extract() {
            Ok(r) => r,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => Record::failed(e.reason()),
        };
        if let Some(reason) = &expand_error {
            // keep an extraction failure already recorded on the node
            record.error = Some(match record.error.take() {
                Some(existing) => join!(existing, "; ", reason),
                None => reason.clone(),
            });
        }
        record.captured_at = Some(Local::now());
        if let Err(e) = self.sink.save_node_record(&label_path, &record) {
            warn!(node = %label_path, error = %e, "could not persist node record");
        }
        records.insert(label_path.clone(), record);
        self.visited += 1;

        // 5/6. Enumerate children *after* the parent's own select/extract:
        // extraction side effects can reshape the DOM, so the query must be
        // fresh, never cached from before.
        let child_labels = match self.enumerate_children(trail, &node.label) {
            Ok(labels) => labels,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                debug!(node = %label_path, error = %e, "child enumeration failed");
                Vec::new()
            }
        };

        let child_trail: Vec<String> =
            trail.iter().cloned().chain([node.label.clone()]).collect();
        for (i, child_label) in child_labels.into_iter().enumerate() {
            let mut path = node.path.clone();
            path.push(i);
            let mut child = LogicalNode::new(child_label, path, node.depth + 1);
            let res = self.visit(&mut child, &child_trail, records);
            node.children.push(child);
            res?; // fatal only
        }

        // 7.
        if expand_error.is_some() {
            node.visit_state = VisitState::Failed;
            self.failed += 1;
        } else {
            node.visit_state = VisitState::Extracted;
        }
        if let Some(p) = self.progress.as_deref_mut() {
            p.node_done(&label_path);
        }
        Ok(())
    }

    /// Fresh child enumeration, placeholder-aware. A lone literal placeholder
    /// child is clicked once to make the server materialise the real
    /// children; it never surfaces in the result.
    fn enumerate_children(&mut self, trail: &[String], label: &str) -> Result<Vec<String>> {
        let handle = match self.driver.locate(trail, label)? {
            Some(h) => h,
            None => return Ok(Vec::new()),
        };
        let mut labels = self.driver.children(&handle)?;

        if labels.len() == 1 && labels[0].trim() == PLACEHOLDER_LABEL {
            debug!(node = label, "placeholder child, forcing materialisation");
            self.driver.materialize_placeholder(&handle)?;
            // that click was a postback too; query through a fresh handle
            labels = match self.driver.locate(trail, label)? {
                Some(h) => self.driver.children(&h)?,
                None => Vec::new(),
            };
        }

        // dedup by label, drop placeholders and blanks
        let mut out: Vec<String> = Vec::with_capacity(labels.len());
        for raw in labels {
            let child = raw.trim();
            if child.is_empty() || child == PLACEHOLDER_LABEL {
                continue;
            }
            if out.iter().any(|c| c == child) {
                continue;
            }
            out.push(child.to_string());
        }
        Ok(out)
    }

    /// Mark the node failed and record the reason inline; siblings continue.
    fn fail(
        &mut self,
        node: &mut LogicalNode,
        label_path: &str,
        records: &mut BTreeMap<String, Record>,
        reason: &str,
    ) {
        warn!(node = %label_path, reason, "node failed");
        node.visit_state = VisitState::Failed;
        self.failed += 1;

        let mut record = Record::failed(reason);
        record.captured_at = Some(Local::now());
        if let Err(e) = self.sink.save_node_record(label_path, &record) {
            warn!(node = %label_path, error = %e, "could not persist failed node record");
        }
        records.insert(label_path.to_string(), record);

        if let Some(p) = self.progress.as_deref_mut() {
            p.node_done(label_path);
        }
    }
}

/// Slash-joined path key. A '/' inside a label would fake an extra level in
/// the key (and in the sink's directory layout), so it is escaped per
/// component before joining.
fn label_path(trail: &[String], label: &str) -> String {
    let mut out = s!();
    for part in trail.iter().map(String::as_str).chain([label]) {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&part.replace('/', "_"));
    }
    out
}
