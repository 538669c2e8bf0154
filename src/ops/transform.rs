// src/ops/transform.rs

use std::marker::PhantomData;

use crate::core::config::ShapePolicy;
use crate::core::dtype::DataType;
use crate::core::tensor::TensorMeta;
use crate::core::value::ExtraArg;

use super::binding::{Construction, ExecutionMode, Operands};
use super::error::OpError;
use super::family::{SameFamily, TransformFamily};
use super::kind::OpKind;
use super::resolver::{self, Resolution};

/// Where an instance is in its life: each step requires the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lifecycle {
    Unbound,
    Bound,
    Resolved,
    Executed,
}

/// One elementwise transform invocation of family `F`.
///
/// Binding and resolution are shared by every family; the family only decides the
/// output element type. Mode-specific accessors live in [`super::adapter`].
#[derive(Debug, Clone)]
pub struct Transform<F: TransformFamily> {
    kind: F::Kind,
    pub(super) operands: Option<Operands>,
    resolution: Option<Resolution>,
    pub(super) executions: usize,
    _family: PhantomData<F>,
}

/// The same-output-dtype transform.
pub type TransformSameOp = Transform<SameFamily>;

impl<F: TransformFamily> Transform<F> {
    /// Unbound instance, typically handed out by a registry; call [`Transform::bind`]
    /// before anything else.
    pub fn template(kind: F::Kind) -> Self {
        Self {
            kind,
            operands: None,
            resolution: None,
            executions: 0,
            _family: PhantomData,
        }
    }

    pub fn new(kind: F::Kind, construction: Construction) -> Self {
        let mut op = Self::template(kind);
        op.operands = Some(construction.into_operands());
        op.log_bound();
        op
    }

    /// Binds operands to a template. An instance binds exactly once.
    pub fn bind(&mut self, construction: Construction) -> Result<(), OpError> {
        if self.operands.is_some() {
            return Err(OpError::InvalidState(format!(
                "{} is already bound",
                self.kind.name()
            )));
        }
        self.operands = Some(construction.into_operands());
        self.log_bound();
        Ok(())
    }

    fn log_bound(&self) {
        if let Some(ops) = &self.operands {
            log::debug!(
                "bound {} ({:?}, in_place={}, extra_args={})",
                self.kind.name(),
                ops.mode(),
                ops.in_place,
                ops.extra_args.len()
            );
        }
    }

    pub fn kind(&self) -> F::Kind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn op_num(&self) -> i32 {
        self.kind.op_num()
    }

    pub fn family(&self) -> &'static str {
        F::NAME
    }

    pub fn lifecycle(&self) -> Lifecycle {
        if self.executions > 0 {
            Lifecycle::Executed
        } else if self.resolution.is_some() {
            Lifecycle::Resolved
        } else if self.operands.is_some() {
            Lifecycle::Bound
        } else {
            Lifecycle::Unbound
        }
    }

    pub fn is_bound(&self) -> bool {
        self.operands.is_some()
    }

    /// Times the instance has been executed (eager) or registered (graph).
    pub fn executions(&self) -> usize {
        self.executions
    }

    pub fn operands(&self) -> Result<&Operands, OpError> {
        self.operands.as_ref().ok_or_else(|| {
            OpError::InvalidState(format!(
                "{} has no operands; bind it before use",
                self.kind.name()
            ))
        })
    }

    pub fn mode(&self) -> Result<ExecutionMode, OpError> {
        Ok(self.operands()?.mode())
    }

    pub fn in_place(&self) -> Result<bool, OpError> {
        Ok(self.operands()?.in_place)
    }

    pub fn extra_args(&self) -> Result<&[ExtraArg], OpError> {
        Ok(&self.operands()?.extra_args)
    }

    pub fn input_meta(&self) -> Result<&TensorMeta, OpError> {
        Ok(self.operands()?.primary_meta())
    }

    /// Output element type; available as soon as the instance is bound.
    pub fn output_type(&self) -> Result<DataType, OpError> {
        if let Some(resolution) = &self.resolution {
            return Ok(resolution.dtype);
        }
        let input = self.input_meta()?;
        Ok(F::result_type(&self.kind, input.dtype))
    }

    /// Resolves with the default shape policy.
    pub fn resolve(&mut self) -> Result<&Resolution, OpError> {
        self.resolve_with(ShapePolicy::default())
    }

    /// Fixes output type and shape. Safe to repeat.
    pub fn resolve_with(&mut self, policy: ShapePolicy) -> Result<&Resolution, OpError> {
        let resolution = resolver::resolve::<F>(&self.kind, self.operands()?, policy)?;
        log::debug!(
            "resolved {}: {} {}",
            self.kind.name(),
            resolution.dtype,
            resolution.shape
        );
        Ok(self.resolution.insert(resolution))
    }

    pub fn resolution(&self) -> Result<&Resolution, OpError> {
        self.operands()?;
        self.resolution.as_ref().ok_or_else(|| {
            OpError::InvalidState(format!("{} has not been resolved", self.kind.name()))
        })
    }
}
