// src/engine/executor.rs

use crate::core::config::{EngineConfig, ShapePolicy};
use crate::core::store::InMemoryTensorStore;
use crate::graph::VariableId;
use crate::ops::{DispatchArgs, GraphProvider, Transform, TransformFamily};

use super::error::EngineError;
use super::kernels::{CpuKernels, KernelDispatcher};

/// Drives bound transforms to completion: resolves them if needed, then either
/// dispatches to kernels (eager) or registers them in a graph (symbolic).
#[derive(Debug, Clone)]
pub struct Executor<D = CpuKernels> {
    dispatcher: D,
    policy: ShapePolicy,
}

impl Executor<CpuKernels> {
    pub fn new() -> Self {
        Self::with_dispatcher(CpuKernels, ShapePolicy::default())
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_dispatcher(CpuKernels, config.resolution.shape_policy)
    }
}

impl Default for Executor<CpuKernels> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Executor<D> {
    pub fn with_dispatcher(dispatcher: D, policy: ShapePolicy) -> Self {
        Self { dispatcher, policy }
    }

    pub fn policy(&self) -> ShapePolicy {
        self.policy
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    fn ensure_resolved<F>(&self, op: &mut Transform<F>) -> Result<(), EngineError>
    where
        F: TransformFamily,
    {
        if op.resolution().is_err() {
            op.resolve_with(self.policy)?;
        }
        Ok(())
    }

    /// Runs an eager instance against `buffers` and returns what was dispatched.
    /// Unbound templates fail with an invalid-state error.
    pub fn execute<F>(
        &self,
        op: &mut Transform<F>,
        buffers: &mut InMemoryTensorStore,
    ) -> Result<DispatchArgs<F::Kind>, EngineError>
    where
        F: TransformFamily,
        D: KernelDispatcher<F::Kind>,
    {
        self.ensure_resolved(op)?;
        let args = op.dispatch_args()?;
        self.dispatcher.dispatch(&args, buffers)?;
        op.record_execution()?;
        Ok(args)
    }

    /// Registers a graph-mode instance and returns its output variable.
    pub fn build<F, G>(
        &self,
        op: &mut Transform<F>,
        graph: &mut G,
    ) -> Result<VariableId, EngineError>
    where
        F: TransformFamily,
        G: GraphProvider,
    {
        self.ensure_resolved(op)?;
        Ok(op.register(graph)?)
    }
}
