// src/lib.rs

pub mod core;

pub mod engine;
pub mod graph;
pub mod ops;

pub use crate::core::config;
pub use crate::core::dtype;
pub use crate::core::store;
pub use crate::core::tensor;
pub use crate::core::value;

// Re-exports para tener una API limpia desde fuera del crate
pub use config::{ConfigError, EngineConfig, ShapePolicy};
pub use dtype::DataType;
pub use engine::{CpuKernels, EngineError, Executor, KernelDispatcher, KernelError, Workspace};
pub use graph::{Differentiator, GraphError, GraphId, NodeId, SymbolicGraph, VariableId};
pub use ops::{
    registry, BufferOperand, BufferProvider, Construction, ConfigurationError, DispatchArgs,
    ExecutionMode, GraphProvider, Lifecycle, OpError, OpKind, Operand, Resolution, SameFamily,
    SameOp, SymbolicOperand, Transform, TransformFamily, TransformSameOp,
};
pub use store::{InMemoryTensorStore, StoreError};
pub use tensor::{Shape, Storage, Tensor, TensorId, TensorMeta};
pub use value::ExtraArg;
