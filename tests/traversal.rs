// tests/traversal.rs
//
// Traversal engine scenarios against a scripted driver: visit-once ordering,
// node-local failure isolation, placeholder materialisation, and the fatal
// path still persisting the partial snapshot.

use std::collections::{HashMap, HashSet};
use std::thread;
use std::time::Duration;

use sici_scrape::config::options::ScrapeOptions;
use sici_scrape::error::{Result, ScrapeError};
use sici_scrape::record::Record;
use sici_scrape::sink::MemorySink;
use sici_scrape::tree::driver::{NodeHandle, TreeDriver};
use sici_scrape::tree::traverse::Traverser;

/// Scripted tree. Handles are label paths, so "locating" is a set lookup and
/// every interaction can be made to fail per node.
#[derive(Default)]
struct FakeDriver {
    nodes: HashSet<String>,
    children: HashMap<String, Vec<String>>,
    /// Children revealed only after the placeholder click.
    deferred: HashMap<String, Vec<String>>,
    fail_select: HashSet<String>,
    fatal_select: HashSet<String>,
    fail_expand: HashSet<String>,
    fail_extract: HashSet<String>,
    /// Slept on every expander probe, to simulate an unresponsive page.
    stall: Option<Duration>,
    selected: Option<String>,
    select_calls: HashMap<String, usize>,
    materialize_calls: usize,
}

impl FakeDriver {
    fn add(&mut self, path: &str, children: &[&str]) {
        self.nodes.insert(path.to_string());
        for c in children {
            self.nodes.insert(format!("{path}/{c}"));
        }
        self.children
            .insert(path.to_string(), children.iter().map(|c| c.to_string()).collect());
    }

    fn defer(&mut self, path: &str, real_children: &[&str]) {
        self.children.insert(path.to_string(), vec!["0".to_string()]);
        for c in real_children {
            self.nodes.insert(format!("{path}/{c}"));
        }
        self.deferred
            .insert(path.to_string(), real_children.iter().map(|c| c.to_string()).collect());
    }
}

impl TreeDriver for FakeDriver {
    fn locate(&mut self, trail: &[String], label: &str) -> Result<Option<NodeHandle>> {
        let path = if trail.is_empty() {
            label.to_string()
        } else {
            format!("{}/{}", trail.join("/"), label)
        };
        Ok(self.nodes.contains(&path).then_some(NodeHandle { raw_id: path }))
    }

    fn has_expander(&mut self, handle: &NodeHandle) -> Result<bool> {
        if let Some(d) = self.stall {
            thread::sleep(d);
        }
        Ok(self.children.get(&handle.raw_id).is_some_and(|c| !c.is_empty()))
    }

    fn expand(&mut self, handle: &NodeHandle) -> Result<()> {
        if self.fail_expand.contains(&handle.raw_id) {
            return Err(ScrapeError::ExpandFailed("scripted".into()));
        }
        Ok(())
    }

    fn select(&mut self, handle: &NodeHandle) -> Result<()> {
        *self.select_calls.entry(handle.raw_id.clone()).or_insert(0) += 1;
        if self.fatal_select.contains(&handle.raw_id) {
            return Err(ScrapeError::Fatal("scripted crash".into()));
        }
        if self.fail_select.contains(&handle.raw_id) {
            return Err(ScrapeError::SelectFailed("scripted".into()));
        }
        self.selected = Some(handle.raw_id.clone());
        Ok(())
    }

    fn children(&mut self, handle: &NodeHandle) -> Result<Vec<String>> {
        Ok(self.children.get(&handle.raw_id).cloned().unwrap_or_default())
    }

    fn materialize_placeholder(&mut self, handle: &NodeHandle) -> Result<()> {
        self.materialize_calls += 1;
        if let Some(real) = self.deferred.remove(&handle.raw_id) {
            self.children.insert(handle.raw_id.clone(), real);
        }
        Ok(())
    }

    fn extract(&mut self) -> Result<Record> {
        if let Some(sel) = &self.selected {
            if self.fail_extract.contains(sel) {
                return Err(ScrapeError::ExtractionFailed("scripted".into()));
            }
        }
        let mut r = Record::default();
        if let Some(sel) = &self.selected {
            r.general.insert("unit".into(), sel.clone());
        }
        Ok(r)
    }
}

fn opts() -> ScrapeOptions {
    ScrapeOptions { root_label: "Root".into(), ..ScrapeOptions::default() }
}

#[test]
fn visits_every_node_exactly_once_in_display_order() {
    let mut driver = FakeDriver::default();
    driver.add("Root", &["A", "B"]);
    driver.add("Root/A", &["A1"]);

    let opts = opts();
    let mut sink = MemorySink::default();
    let mut t = Traverser::new(&mut driver, &mut sink, &opts, None);
    let snap = t.run().unwrap();

    assert_eq!(t.visited(), 4);
    assert_eq!(t.failed(), 0);
    let keys: Vec<&str> = snap.records.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Root", "Root/A", "Root/A/A1", "Root/B"]);
    for path in &keys {
        assert_eq!(driver.select_calls.get(*path), Some(&1), "select count for {path}");
    }
    // records carry the extractor payload plus the engine timestamp
    let a = &snap.records["Root/A"];
    assert_eq!(a.general.get("unit").map(String::as_str), Some("Root/A"));
    assert!(a.captured_at.is_some());
    assert_eq!(a.error, None);

    assert_eq!(sink.records.len(), 4);
    assert_eq!(sink.final_snapshots, 1);
    assert_eq!(
        sink.last_summary,
        Some(serde_json::json!({"Root": {"A": {"A1": {}}, "B": {}}}))
    );
}

#[test]
fn duplicate_child_labels_are_visited_once() {
    let mut driver = FakeDriver::default();
    driver.add("Root", &["A", "A", "B"]);

    let opts = opts();
    let mut sink = MemorySink::default();
    let mut t = Traverser::new(&mut driver, &mut sink, &opts, None);
    let snap = t.run().unwrap();

    assert_eq!(t.visited(), 3);
    assert_eq!(driver.select_calls.get("Root/A"), Some(&1));
    assert_eq!(
        snap.summary(),
        serde_json::json!({"Root": {"A": {}, "B": {}}})
    );
}

#[test]
fn select_failure_is_contained_to_the_node() {
    let mut driver = FakeDriver::default();
    driver.add("Root", &["A", "B"]);
    driver.add("Root/A", &["A1"]);
    driver.add("Root/B", &["B1"]); // never reached
    driver.fail_select.insert("Root/B".into());

    let opts = opts();
    let mut sink = MemorySink::default();
    let mut t = Traverser::new(&mut driver, &mut sink, &opts, None);
    let snap = t.run().unwrap();

    assert_eq!(t.visited(), 3);
    assert_eq!(t.failed(), 1);
    let b = &snap.records["Root/B"];
    assert_eq!(b.error.as_deref(), Some("could not select"));
    assert!(b.captured_at.is_some());
    assert!(!snap.records.contains_key("Root/B/B1"));
    // B stays in the hierarchy, childless
    assert_eq!(
        snap.summary(),
        serde_json::json!({"Root": {"A": {"A1": {}}, "B": {}}})
    );
}

#[test]
fn expand_failure_is_recorded_but_extraction_proceeds() {
    let mut driver = FakeDriver::default();
    driver.add("Root", &["A"]);
    driver.add("Root/A", &["A1"]);
    driver.fail_expand.insert("Root/A".into());

    let opts = opts();
    let mut sink = MemorySink::default();
    let mut t = Traverser::new(&mut driver, &mut sink, &opts, None);
    let snap = t.run().unwrap();

    let a = &snap.records["Root/A"];
    assert_eq!(a.error.as_deref(), Some("could not expand"));
    // selection and extraction still happened
    assert_eq!(a.general.get("unit").map(String::as_str), Some("Root/A"));
    assert_eq!(t.failed(), 1);
}

#[test]
fn deadline_expiry_fails_the_node_and_skips_its_children() {
    let mut driver = FakeDriver::default();
    driver.add("Root", &["A"]);
    driver.stall = Some(Duration::from_millis(20));

    let opts = ScrapeOptions { node_deadline: Duration::from_millis(1), ..opts() };
    let mut sink = MemorySink::default();
    let mut t = Traverser::new(&mut driver, &mut sink, &opts, None);
    let snap = t.run().unwrap();

    assert_eq!(t.failed(), 1);
    assert_eq!(snap.records["Root"].error.as_deref(), Some("timeout"));
    // the deadline fired before select, so no children were enumerated
    assert!(driver.select_calls.is_empty());
    assert!(!snap.records.contains_key("Root/A"));
    assert_eq!(sink.final_snapshots, 1);
}

#[test]
fn expand_and_extraction_failures_are_both_reported() {
    let mut driver = FakeDriver::default();
    driver.add("Root", &["A"]);
    driver.add("Root/A", &["A1"]);
    driver.fail_expand.insert("Root/A".into());
    driver.fail_extract.insert("Root/A".into());

    let opts = opts();
    let mut sink = MemorySink::default();
    let mut t = Traverser::new(&mut driver, &mut sink, &opts, None);
    let snap = t.run().unwrap();

    let err = snap.records["Root/A"].error.as_deref().unwrap();
    assert!(err.contains("extraction failed"), "missing extraction reason: {err}");
    assert!(err.contains("could not expand"), "missing expand reason: {err}");
}

#[test]
fn slash_in_a_label_does_not_fake_a_tree_level() {
    let mut driver = FakeDriver::default();
    driver.add("Root", &["S/SUBG"]);

    let opts = opts();
    let mut sink = MemorySink::default();
    let mut t = Traverser::new(&mut driver, &mut sink, &opts, None);
    let snap = t.run().unwrap();

    assert!(snap.records.contains_key("Root/S_SUBG"));
    assert!(!snap.records.contains_key("Root/S/SUBG"));
    // the hierarchy keeps the label verbatim; only the path key is escaped
    assert_eq!(
        snap.summary(),
        serde_json::json!({"Root": {"S/SUBG": {}}})
    );
}

#[test]
fn placeholder_child_is_materialized_and_never_surfaces() {
    let mut driver = FakeDriver::default();
    driver.add("Root", &["P"]);
    driver.defer("Root/P", &["X", "Y"]);

    let opts = opts();
    let mut sink = MemorySink::default();
    let mut t = Traverser::new(&mut driver, &mut sink, &opts, None);
    let snap = t.run().unwrap();

    assert_eq!(driver.materialize_calls, 1);
    assert!(snap.records.contains_key("Root/P/X"));
    assert!(snap.records.contains_key("Root/P/Y"));
    assert!(snap.records.keys().all(|k| !k.split('/').any(|s| s == "0")));
    assert_eq!(
        snap.summary(),
        serde_json::json!({"Root": {"P": {"X": {}, "Y": {}}}})
    );
}

#[test]
fn missing_root_yields_failed_record_not_error() {
    let mut driver = FakeDriver::default(); // knows no nodes at all

    let opts = opts();
    let mut sink = MemorySink::default();
    let mut t = Traverser::new(&mut driver, &mut sink, &opts, None);
    let snap = t.run().unwrap();

    assert_eq!(t.visited(), 0);
    assert_eq!(t.failed(), 1);
    assert_eq!(snap.records["Root"].error.as_deref(), Some("not located"));
    assert_eq!(sink.final_snapshots, 1);
}

#[test]
fn fatal_error_aborts_but_partial_snapshot_is_persisted() {
    let mut driver = FakeDriver::default();
    driver.add("Root", &["A", "B"]);
    driver.fatal_select.insert("Root/B".into());

    let opts = opts();
    let mut sink = MemorySink::default();
    let mut t = Traverser::new(&mut driver, &mut sink, &opts, None);
    let err = t.run().unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(t.visited(), 2); // Root and A made it
    assert_eq!(sink.final_snapshots, 1);
    let saved: Vec<&str> = sink.records.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(saved, vec!["Root", "Root/A"]);
}

#[test]
fn depth_bound_stops_runaway_recursion() {
    let mut driver = FakeDriver::default();
    // Root -> D -> D -> D ... via self-similar labels
    driver.add("Root", &["D"]);
    let mut path = String::from("Root");
    for _ in 0..6 {
        path = format!("{path}/D");
        driver.add(&path, &["D"]);
    }

    let opts = ScrapeOptions { max_depth: 3, ..opts() };
    let mut sink = MemorySink::default();
    let mut t = Traverser::new(&mut driver, &mut sink, &opts, None);
    let snap = t.run().unwrap();

    // depth == path segments - 1; the first node past the bound gets a
    // failure record and nothing below it is touched
    for (k, r) in &snap.records {
        let depth = k.split('/').count() - 1;
        if depth > opts.max_depth {
            assert_eq!(depth, opts.max_depth + 1, "descended past the bounce at {k}");
            assert_eq!(r.error.as_deref(), Some("max depth exceeded"));
        } else {
            assert_eq!(r.error, None, "unexpected failure at {k}");
        }
    }
    let bounced = snap
        .records
        .values()
        .filter(|r| r.error.as_deref() == Some("max depth exceeded"))
        .count();
    assert_eq!(bounced, 1);
}
