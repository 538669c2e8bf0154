use thiserror::Error;

use super::symbolic::{GraphId, NodeId, VariableId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("variable {0:?} not found in graph")]
    UnknownVariable(VariableId),

    #[error("node {0:?} not found in graph")]
    UnknownNode(NodeId),

    #[error("variable name already in use: {0}")]
    DuplicateName(String),

    #[error("operand belongs to graph {found:?}, not {expected:?}")]
    ForeignVariable { expected: GraphId, found: GraphId },

    #[error("graph export failed: {0}")]
    Export(String),
}
