// src/ops/adapter.rs

use serde::Serialize;

use crate::core::dtype::DataType;
use crate::core::tensor::{TensorId, TensorMeta};
use crate::core::value::ExtraArg;
use crate::graph::{NodeId, NodeOutput, NodeSpec, VariableId};

use super::binding::{EagerForm, ExecutionForm, SymbolicForm};
use super::error::OpError;
use super::family::TransformFamily;
use super::provider::{GraphProvider, Operand};
use super::transform::Transform;

/// What a kernel dispatcher needs to run one eager transform. Carries no trace of how
/// the instance was constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchArgs<K> {
    pub op: K,
    pub dtype: DataType,
    pub input: TensorId,
    pub secondary: Option<TensorId>,
    /// Same as `input` when in-place.
    pub output: TensorId,
    pub count: usize,
    pub extra_args: Vec<ExtraArg>,
    pub in_place: bool,
}

impl<F: TransformFamily> Transform<F> {
    fn symbolic_form(&self, accessor: &str) -> Result<&SymbolicForm, OpError> {
        match &self.operands()?.form {
            ExecutionForm::Symbolic(form) => Ok(form),
            ExecutionForm::Eager(_) => Err(OpError::InvalidOperation(format!(
                "{} is only available on graph-mode instances ({} was built eagerly)",
                accessor,
                self.name()
            ))),
        }
    }

    fn eager_form(&self, accessor: &str) -> Result<&EagerForm, OpError> {
        match &self.operands()?.form {
            ExecutionForm::Eager(form) => Ok(form),
            ExecutionForm::Symbolic(_) => Err(OpError::InvalidOperation(format!(
                "{} is only available on eager instances ({} was built for a graph)",
                accessor,
                self.name()
            ))),
        }
    }

    /// Kernel dispatch metadata. Requires an eager, resolved instance.
    pub fn dispatch_args(&self) -> Result<DispatchArgs<F::Kind>, OpError> {
        let form = self.eager_form("dispatch_args")?;
        let resolution = self.resolution()?;
        let operands = self.operands()?;

        let secondary = match &operands.secondary {
            Some(Operand::Buffer(b)) => Some(b.id),
            _ => None,
        };

        Ok(DispatchArgs {
            op: self.kind(),
            dtype: resolution.dtype,
            input: form.input.id,
            secondary,
            output: form.output.id,
            count: form.count.unwrap_or_else(|| form.input.meta.num_elements()),
            extra_args: operands.extra_args.clone(),
            in_place: operands.in_place,
        })
    }

    pub fn input_buffer(&self) -> Result<TensorId, OpError> {
        Ok(self.eager_form("input_buffer")?.input.id)
    }

    pub fn output_buffer(&self) -> Result<TensorId, OpError> {
        Ok(self.eager_form("output_buffer")?.output.id)
    }

    pub fn input_variable(&self) -> Result<VariableId, OpError> {
        Ok(self.symbolic_form("input_variable")?.input.variable)
    }

    /// Symbolic output handle. In-place instances answer with their input variable;
    /// others only after registration.
    pub fn output_variable(&self) -> Result<VariableId, OpError> {
        let form = self.symbolic_form("output_variable")?;
        if self.operands()?.in_place {
            return Ok(form.input.variable);
        }
        form.output.ok_or_else(|| {
            OpError::InvalidState(format!(
                "{} has not been registered in a graph yet",
                self.name()
            ))
        })
    }

    pub fn node_id(&self) -> Result<NodeId, OpError> {
        self.symbolic_form("node_id")?.node.ok_or_else(|| {
            OpError::InvalidState(format!(
                "{} has not been registered in a graph yet",
                self.name()
            ))
        })
    }

    /// Node description for the graph engine. Requires a graph-mode, resolved instance.
    pub fn node_spec(&self) -> Result<NodeSpec, OpError> {
        let form = self.symbolic_form("node_spec")?;
        let resolution = self.resolution()?;
        let operands = self.operands()?;

        let mut inputs = vec![form.input.variable];
        if let Some(Operand::Symbolic(s)) = &operands.secondary {
            inputs.push(s.variable);
        }

        let output = if operands.in_place {
            NodeOutput::Alias(form.input.variable)
        } else {
            NodeOutput::New(TensorMeta::new(resolution.dtype, resolution.shape.clone()))
        };

        Ok(NodeSpec {
            op_name: self.name().to_string(),
            op_num: self.op_num(),
            family: self.family().to_string(),
            inputs,
            output,
            extra_args: operands.extra_args.clone(),
            in_place: operands.in_place,
        })
    }

    /// Adds this instance to `graph` as a node and returns its output variable.
    /// A graph-mode instance is registered once.
    pub fn register<G: GraphProvider>(&mut self, graph: &mut G) -> Result<VariableId, OpError> {
        let form = self.symbolic_form("register")?;
        if form.node.is_some() {
            return Err(OpError::InvalidState(format!(
                "{} is already registered",
                self.name()
            )));
        }

        let mut graphs = vec![form.input.graph];
        if let Some(Operand::Symbolic(s)) = &self.operands()?.secondary {
            graphs.push(s.graph);
        }
        if let Some(foreign) = graphs.into_iter().find(|g| *g != graph.graph_id()) {
            return Err(OpError::InvalidOperation(format!(
                "operand of {} belongs to graph {:?}, not {:?}",
                self.name(),
                foreign,
                graph.graph_id()
            )));
        }

        let spec = self.node_spec()?;
        let (node, output) = graph.add_node(spec)?;

        if let Some(ops) = self.operands.as_mut() {
            if let ExecutionForm::Symbolic(form) = &mut ops.form {
                form.node = Some(node);
                form.output = Some(output);
            }
        }
        self.executions += 1;
        Ok(output)
    }

    /// Records one completed eager execution. Called by the executor after dispatch.
    pub fn record_execution(&mut self) -> Result<(), OpError> {
        self.eager_form("record_execution")?;
        self.resolution()?;
        self.executions += 1;
        if self.executions > 1 && self.operands()?.in_place {
            log::debug!(
                "{} re-applied in place (execution #{})",
                self.name(),
                self.executions
            );
        }
        Ok(())
    }
}
