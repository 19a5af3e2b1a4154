//! Constrained subgraph isomorphism matcher.
//!
//! This module contains:
//! - Node and edge compatibility predicates
//! - The boolean correspondence matrix
//! - Arc-consistency refinement including match-N path existence
//! - The Ullmann backtracking search enumerating all embeddings

pub mod compare;
pub mod matrix;
pub mod refine;
pub mod search;

pub use compare::{compare_edges, compare_nodes};
pub use matrix::Matrix;
pub use search::{MatchSolution, SearchBudget, find_embeddings};
