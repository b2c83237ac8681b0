// src/tree/mod.rs

pub mod actions;
pub mod driver;
pub mod live;
pub mod node;
pub mod resolver;
pub mod traverse;

pub use driver::{NodeHandle, TreeDriver};
pub use node::{LogicalNode, TraversalSnapshot, VisitState};
pub use traverse::Traverser;
