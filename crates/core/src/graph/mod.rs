//! Document graph model.
//!
//! This module contains:
//! - Node and edge types with their match configuration
//! - The DocumentGraph arena with adjacency lookup
//! - The adjacency graph builder deriving edges from segment geometry

pub mod builder;
pub mod document;
pub mod edge;
pub mod node;

pub use builder::{GraphParams, build_document_graph};
pub use document::{DocumentGraph, EdgeId, NodeId};
pub use edge::{Edge, LengthClass, MatchMode, Relation};
pub use node::{ContentMatch, Node};
