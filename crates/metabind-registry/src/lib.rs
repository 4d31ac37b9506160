//! Metabind registry crate.
//!
//! - [`TypeDatabase`]: every type entry of a run, keyed by qualified name
//! - [`Graph`]: directed graph with the deterministic topological sort used
//!   by the overload planner and the class sorter

mod graph;
mod registry;

pub use graph::{Graph, TopoSortResult};
pub use registry::TypeDatabase;
