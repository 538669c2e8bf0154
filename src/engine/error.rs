use crate::core::store::StoreError;
use crate::graph::GraphError;
use crate::ops::OpError;

use super::kernels::KernelError;

#[derive(Debug)]
pub enum EngineError {
    Store(StoreError),
    NameNotFound(String),
    InvalidOp(String),
    Op(OpError),
    Kernel(KernelError),
    Graph(GraphError),
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Store(e)
    }
}

impl From<OpError> for EngineError {
    fn from(e: OpError) -> Self {
        EngineError::Op(e)
    }
}

impl From<KernelError> for EngineError {
    fn from(e: KernelError) -> Self {
        EngineError::Kernel(e)
    }
}

impl From<GraphError> for EngineError {
    fn from(e: GraphError) -> Self {
        EngineError::Graph(e)
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Store(e) => write!(f, "Store error: {}", e),
            EngineError::NameNotFound(name) => write!(f, "Tensor name not found: {}", name),
            EngineError::InvalidOp(msg) => write!(f, "Invalid operation: {}", msg),
            EngineError::Op(e) => write!(f, "Op error: {}", e),
            EngineError::Kernel(e) => write!(f, "Kernel error: {}", e),
            EngineError::Graph(e) => write!(f, "Graph error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}
