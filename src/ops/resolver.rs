// src/ops/resolver.rs

use serde::Serialize;

use crate::core::config::ShapePolicy;
use crate::core::dtype::DataType;
use crate::core::tensor::Shape;

use super::binding::{ExecutionForm, Operands};
use super::error::{ConfigurationError, OpError};
use super::family::TransformFamily;
use super::provider::Operand;

/// Output metadata fixed by resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub dtype: DataType,
    pub shape: Shape,
}

/// Infers output element type and shape from bound operands. Pure: the same operands
/// and policy always give the same answer.
pub fn resolve<F: TransformFamily>(
    kind: &F::Kind,
    operands: &Operands,
    policy: ShapePolicy,
) -> Result<Resolution, OpError> {
    let input = operands.primary_meta();
    let dtype = F::result_type(kind, input.dtype);
    let shape = output_shape(operands, policy)?;

    check_secondary(operands, &shape)?;

    if let ExecutionForm::Eager(eager) = &operands.form {
        let output = &eager.output.meta;
        if output.dtype != dtype {
            return Err(ConfigurationError::OutputTypeMismatch {
                input: dtype,
                output: output.dtype,
            }
            .into());
        }

        match eager.count {
            Some(count) => {
                let available = input.num_elements().min(output.num_elements());
                if count > available {
                    return Err(ConfigurationError::CountOutOfRange { count, available }.into());
                }
            }
            None => {
                if output.shape != shape {
                    return Err(ConfigurationError::OutputShapeMismatch {
                        expected: shape,
                        output: output.shape.clone(),
                    }
                    .into());
                }
            }
        }
    }

    Ok(Resolution { dtype, shape })
}

fn output_shape(operands: &Operands, policy: ShapePolicy) -> Result<Shape, OpError> {
    let input = &operands.primary_meta().shape;
    let requested = match &operands.shape {
        Some(requested) => requested.to_shape()?,
        None => return Ok(input.clone()),
    };

    if operands.in_place {
        if requested != *input {
            return Err(ConfigurationError::InPlaceShapeMismatch {
                explicit: requested,
                input: input.clone(),
            }
            .into());
        }
        return Ok(requested);
    }

    let compatible = match policy {
        ShapePolicy::Exact => requested == *input,
        ShapePolicy::Broadcast => input.is_broadcastable_to(&requested),
    };
    if !compatible {
        return Err(ConfigurationError::IncompatibleShape {
            explicit: requested,
            input: input.clone(),
            policy,
        }
        .into());
    }
    Ok(requested)
}

fn check_secondary(operands: &Operands, output: &Shape) -> Result<(), OpError> {
    let secondary = match &operands.secondary {
        Some(s) => s,
        None => return Ok(()),
    };

    let same_mode = matches!(
        (&operands.form, secondary),
        (ExecutionForm::Symbolic(_), Operand::Symbolic(_))
            | (ExecutionForm::Eager(_), Operand::Buffer(_))
    );
    if !same_mode {
        return Err(ConfigurationError::SecondaryModeMismatch.into());
    }

    let primary = operands.primary_meta();
    let meta = secondary.meta();
    if meta.dtype != primary.dtype {
        return Err(ConfigurationError::SecondaryTypeMismatch {
            primary: primary.dtype,
            secondary: meta.dtype,
        }
        .into());
    }
    if !meta.shape.is_broadcastable_to(output) {
        return Err(ConfigurationError::SecondaryShapeMismatch {
            secondary: meta.shape.clone(),
            output: output.clone(),
        }
        .into());
    }
    Ok(())
}
