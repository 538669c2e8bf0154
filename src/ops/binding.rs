// src/ops/binding.rs

use crate::core::tensor::{Shape, TensorMeta};
use crate::core::value::ExtraArg;
use crate::graph::{NodeId, VariableId};

use super::error::ConfigurationError;
use super::provider::{BufferOperand, Operand, SymbolicOperand};

/// Explicit output shape as requested by the caller, normalised to 64-bit dims no matter
/// which integer width it arrived in. Validation happens at resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestedShape(Vec<i64>);

impl RequestedShape {
    pub fn dims(&self) -> &[i64] {
        &self.0
    }

    pub fn to_shape(&self) -> Result<Shape, ConfigurationError> {
        let mut dims = Vec::with_capacity(self.0.len());
        for (axis, &value) in self.0.iter().enumerate() {
            if value < 0 {
                return Err(ConfigurationError::NegativeDimension { axis, value });
            }
            dims.push(value as usize);
        }
        Ok(Shape::new(dims))
    }
}

impl From<&[i32]> for RequestedShape {
    fn from(dims: &[i32]) -> Self {
        RequestedShape(dims.iter().map(|&d| d as i64).collect())
    }
}

impl From<&[i64]> for RequestedShape {
    fn from(dims: &[i64]) -> Self {
        RequestedShape(dims.to_vec())
    }
}

impl From<&Shape> for RequestedShape {
    fn from(shape: &Shape) -> Self {
        RequestedShape(shape.dims.iter().map(|&d| d as i64).collect())
    }
}

/// The operands of one transform invocation, in one of the supported construction forms.
/// Construction is permissive: nothing is validated until resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Construction {
    Symbolic {
        input: SymbolicOperand,
        secondary: Option<Operand>,
        shape: Option<RequestedShape>,
        in_place: bool,
        extra_args: Vec<ExtraArg>,
    },
    Eager {
        input: BufferOperand,
        secondary: Option<Operand>,
        output: BufferOperand,
        count: Option<usize>,
        extra_args: Vec<ExtraArg>,
    },
}

impl Construction {
    /// Graph node with an explicit shape given as 32-bit dims.
    pub fn symbolic_with_shape(
        input: SymbolicOperand,
        shape: &[i32],
        in_place: bool,
        extra_args: Vec<ExtraArg>,
    ) -> Self {
        Construction::Symbolic {
            input,
            secondary: None,
            shape: Some(RequestedShape::from(shape)),
            in_place,
            extra_args,
        }
    }

    /// Graph node with only the in-place flag.
    pub fn symbolic(input: SymbolicOperand, in_place: bool) -> Self {
        Construction::Symbolic {
            input,
            secondary: None,
            shape: None,
            in_place,
            extra_args: Vec::new(),
        }
    }

    /// Graph node with an explicit shape given as 64-bit dims.
    pub fn symbolic_with_wide_shape(
        input: SymbolicOperand,
        shape: &[i64],
        in_place: bool,
        extra_args: Vec<ExtraArg>,
    ) -> Self {
        Construction::Symbolic {
            input,
            secondary: None,
            shape: Some(RequestedShape::from(shape)),
            in_place,
            extra_args,
        }
    }

    /// Graph node carrying extra args; never in-place.
    pub fn symbolic_with_args(input: SymbolicOperand, extra_args: Vec<ExtraArg>) -> Self {
        Construction::Symbolic {
            input,
            secondary: None,
            shape: None,
            in_place: false,
            extra_args,
        }
    }

    /// Eager call writing `output`. Passing the same buffer twice makes it in-place.
    pub fn eager(input: BufferOperand, output: BufferOperand) -> Self {
        Construction::Eager {
            input,
            secondary: None,
            output,
            count: None,
            extra_args: Vec::new(),
        }
    }

    /// Eager call processing only the first `count` elements.
    pub fn eager_bounded(input: BufferOperand, output: BufferOperand, count: usize) -> Self {
        Construction::Eager {
            input,
            secondary: None,
            output,
            count: Some(count),
            extra_args: Vec::new(),
        }
    }

    /// Eager call overwriting `input`.
    pub fn eager_in_place(input: BufferOperand) -> Self {
        Construction::Eager {
            output: input.clone(),
            input,
            secondary: None,
            count: None,
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(mut self, args: Vec<ExtraArg>) -> Self {
        match &mut self {
            Construction::Symbolic { extra_args, .. } | Construction::Eager { extra_args, .. } => {
                *extra_args = args
            }
        }
        self
    }

    pub fn with_secondary(mut self, operand: impl Into<Operand>) -> Self {
        match &mut self {
            Construction::Symbolic { secondary, .. } | Construction::Eager { secondary, .. } => {
                *secondary = Some(operand.into())
            }
        }
        self
    }

    /// Collapses the construction into the normalised operand set.
    pub fn into_operands(self) -> Operands {
        match self {
            Construction::Symbolic {
                input,
                secondary,
                shape,
                in_place,
                extra_args,
            } => Operands {
                form: ExecutionForm::Symbolic(SymbolicForm {
                    input,
                    output: None,
                    node: None,
                }),
                secondary,
                shape,
                in_place,
                extra_args,
            },
            Construction::Eager {
                input,
                secondary,
                output,
                count,
                extra_args,
            } => {
                let in_place = input.id == output.id;
                Operands {
                    form: ExecutionForm::Eager(EagerForm {
                        input,
                        output,
                        count,
                    }),
                    secondary,
                    shape: None,
                    in_place,
                    extra_args,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Symbolic,
    Eager,
}

/// Graph-side operands. `output` and `node` are filled in on registration.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicForm {
    pub input: SymbolicOperand,
    pub output: Option<VariableId>,
    pub node: Option<NodeId>,
}

/// Eager-side operands. When in-place, `output` is the same buffer as `input`.
#[derive(Debug, Clone, PartialEq)]
pub struct EagerForm {
    pub input: BufferOperand,
    pub output: BufferOperand,
    pub count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionForm {
    Symbolic(SymbolicForm),
    Eager(EagerForm),
}

/// Normalised operand set every construction form reduces to.
#[derive(Debug, Clone, PartialEq)]
pub struct Operands {
    pub form: ExecutionForm,
    pub secondary: Option<Operand>,
    pub shape: Option<RequestedShape>,
    pub in_place: bool,
    pub extra_args: Vec<ExtraArg>,
}

impl Operands {
    pub fn mode(&self) -> ExecutionMode {
        match self.form {
            ExecutionForm::Symbolic(_) => ExecutionMode::Symbolic,
            ExecutionForm::Eager(_) => ExecutionMode::Eager,
        }
    }

    pub fn primary(&self) -> Operand {
        match &self.form {
            ExecutionForm::Symbolic(s) => Operand::Symbolic(s.input.clone()),
            ExecutionForm::Eager(e) => Operand::Buffer(e.input.clone()),
        }
    }

    pub fn primary_meta(&self) -> &TensorMeta {
        match &self.form {
            ExecutionForm::Symbolic(s) => &s.input.meta,
            ExecutionForm::Eager(e) => &e.input.meta,
        }
    }
}
