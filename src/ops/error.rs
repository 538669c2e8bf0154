use thiserror::Error;

use crate::core::config::ShapePolicy;
use crate::core::dtype::DataType;
use crate::core::store::StoreError;
use crate::core::tensor::Shape;
use crate::graph::GraphError;

/// Contract violations raised by transform operations. None of these are transient:
/// they are reported at the offending call and never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpError {
    /// A step was attempted before the binding or resolution it depends on.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Operands contradict the transform's shape or type invariants.
    #[error("configuration failure: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A graph-only accessor was used on an eager instance, or the reverse.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The buffer or graph provider could not describe an operand.
    #[error("operand lookup failed: {0}")]
    Provider(String),

    #[error("unknown operation: {0}")]
    UnknownOp(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("in-place shape mismatch: explicit shape {explicit} differs from input shape {input}")]
    InPlaceShapeMismatch { explicit: Shape, input: Shape },

    #[error(
        "explicit shape {explicit} is incompatible with input shape {input} ({policy:?} policy)"
    )]
    IncompatibleShape {
        explicit: Shape,
        input: Shape,
        policy: ShapePolicy,
    },

    #[error("negative dimension {value} at axis {axis} of explicit shape")]
    NegativeDimension { axis: usize, value: i64 },

    #[error("output element type {output} differs from input element type {input}")]
    OutputTypeMismatch { input: DataType, output: DataType },

    #[error("output buffer shape {output} differs from resolved shape {expected}")]
    OutputShapeMismatch { expected: Shape, output: Shape },

    #[error("element count {count} exceeds the {available} elements available")]
    CountOutOfRange { count: usize, available: usize },

    #[error("secondary operand type {secondary} differs from primary type {primary}")]
    SecondaryTypeMismatch {
        primary: DataType,
        secondary: DataType,
    },

    #[error("secondary operand shape {secondary} does not broadcast to {output}")]
    SecondaryShapeMismatch { secondary: Shape, output: Shape },

    #[error("secondary operand must use the same execution mode as the primary input")]
    SecondaryModeMismatch,
}

impl From<GraphError> for OpError {
    fn from(e: GraphError) -> Self {
        OpError::Provider(e.to_string())
    }
}

impl From<StoreError> for OpError {
    fn from(e: StoreError) -> Self {
        OpError::Provider(e.to_string())
    }
}
