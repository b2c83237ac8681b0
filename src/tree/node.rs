// src/tree/node.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::Record;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitState {
    Unvisited,
    Expanding,
    Expanded,
    Selected,
    Extracted,
    Failed,
}

/// A node of the logical tree. `path` is the chain of sibling indices from
/// the root, the only identity that survives DOM regeneration. Whatever id
/// the widget assigned at render time is transient and never stored here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogicalNode {
    pub label: String,
    pub path: Vec<usize>,
    pub depth: usize,
    pub visit_state: VisitState,
    /// Display order; populated at most once, placeholder entries excluded.
    pub children: Vec<LogicalNode>,
}

impl LogicalNode {
    pub fn new(label: impl Into<String>, path: Vec<usize>, depth: usize) -> Self {
        Self {
            label: label.into(),
            path,
            depth,
            visit_state: VisitState::Unvisited,
            children: Vec::new(),
        }
    }
}

/// Result of a whole run: the hierarchy plus one record per visited node,
/// keyed by the slash-joined label path. Grown monotonically: failed nodes
/// stay in, flagged by their record's `error`.
#[derive(Debug, Default, Serialize)]
pub struct TraversalSnapshot {
    pub root: Option<LogicalNode>,
    pub records: BTreeMap<String, Record>,
}

impl TraversalSnapshot {
    /// Labels-only nesting for quick structural inspection, e.g.
    /// `{"SMS": {"A": {"A1": {}}, "B": {}}}`.
    pub fn summary(&self) -> Value {
        match &self.root {
            Some(root) => {
                let mut top = Map::new();
                top.insert(root.label.clone(), node_summary(root));
                Value::Object(top)
            }
            None => Value::Object(Map::new()),
        }
    }
}

fn node_summary(node: &LogicalNode) -> Value {
    let mut map = Map::new();
    for child in &node.children {
        map.insert(child.label.clone(), node_summary(child));
    }
    Value::Object(map)
}
