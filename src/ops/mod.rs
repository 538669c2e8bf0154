//! Same-dtype transform operations: operand binding, output resolution and the
//! execution-mode adapter, composed in [`Transform`].

pub mod adapter;
pub mod binding;
pub mod error;
pub mod family;
pub mod kind;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod transform;

pub use adapter::DispatchArgs;
pub use binding::{Construction, ExecutionMode, Operands, RequestedShape};
pub use error::{ConfigurationError, OpError};
pub use family::{SameFamily, TransformFamily};
pub use kind::{OpKind, SameOp};
pub use provider::{BufferOperand, BufferProvider, GraphProvider, Operand, SymbolicOperand};
pub use registry::{registry, OpRegistry};
pub use resolver::Resolution;
pub use transform::{Lifecycle, Transform, TransformSameOp};
