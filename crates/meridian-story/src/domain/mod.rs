//! Story data model.

pub mod audit;
pub mod graph;
pub mod node;
