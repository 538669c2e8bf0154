//! Collaborator seams: where operand metadata comes from.
//!
//! Binding reads element type and shape through these traits and keeps a snapshot;
//! it never mutates layout or graph topology.

use crate::core::store::InMemoryTensorStore;
use crate::core::tensor::{TensorId, TensorMeta};
use crate::graph::{GraphId, NodeId, NodeSpec, SymbolicGraph, VariableId};

use super::error::OpError;

/// Reference to a symbolic variable plus the metadata read at binding time.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicOperand {
    pub graph: GraphId,
    pub variable: VariableId,
    pub meta: TensorMeta,
}

/// Reference to a caller-owned buffer plus the metadata read at binding time.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferOperand {
    pub id: TensorId,
    pub meta: TensorMeta,
}

/// Either kind of operand; used for the optional secondary input.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Symbolic(SymbolicOperand),
    Buffer(BufferOperand),
}

impl Operand {
    pub fn meta(&self) -> &TensorMeta {
        match self {
            Operand::Symbolic(s) => &s.meta,
            Operand::Buffer(b) => &b.meta,
        }
    }
}

impl From<SymbolicOperand> for Operand {
    fn from(op: SymbolicOperand) -> Self {
        Operand::Symbolic(op)
    }
}

impl From<BufferOperand> for Operand {
    fn from(op: BufferOperand) -> Self {
        Operand::Buffer(op)
    }
}

/// Supplies concrete buffers' element type and shape.
pub trait BufferProvider {
    fn buffer_meta(&self, id: TensorId) -> Result<TensorMeta, OpError>;

    fn operand(&self, id: TensorId) -> Result<BufferOperand, OpError> {
        Ok(BufferOperand {
            id,
            meta: self.buffer_meta(id)?,
        })
    }
}

/// Supplies symbolic variables' element type and shape, and accepts new nodes.
pub trait GraphProvider {
    fn graph_id(&self) -> GraphId;

    fn variable_meta(&self, id: VariableId) -> Result<TensorMeta, OpError>;

    fn add_node(&mut self, spec: NodeSpec) -> Result<(NodeId, VariableId), OpError>;

    fn operand(&self, id: VariableId) -> Result<SymbolicOperand, OpError> {
        Ok(SymbolicOperand {
            graph: self.graph_id(),
            variable: id,
            meta: self.variable_meta(id)?,
        })
    }
}

impl BufferProvider for InMemoryTensorStore {
    fn buffer_meta(&self, id: TensorId) -> Result<TensorMeta, OpError> {
        Ok(self.get(id)?.meta())
    }
}

impl GraphProvider for SymbolicGraph {
    fn graph_id(&self) -> GraphId {
        self.id()
    }

    fn variable_meta(&self, id: VariableId) -> Result<TensorMeta, OpError> {
        Ok(self.variable(id)?.meta.clone())
    }

    fn add_node(&mut self, spec: NodeSpec) -> Result<(NodeId, VariableId), OpError> {
        Ok(self.register_node(spec)?)
    }
}
