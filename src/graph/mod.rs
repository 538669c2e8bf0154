//! Symbolic computation graph that same-dtype transforms register into.
//!
//! The graph only records topology and metadata. Scheduling and backward derivation
//! belong to the engine behind [`Differentiator`].

pub mod error;
pub mod symbolic;

pub use error::GraphError;
pub use symbolic::{
    Differentiator, GraphId, Node, NodeId, NodeOutput, NodeSpec, SymbolicGraph, Variable,
    VariableId,
};
