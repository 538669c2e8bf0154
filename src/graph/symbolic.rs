// src/graph/symbolic.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::core::dtype::DataType;
use crate::core::tensor::{Shape, TensorMeta};
use crate::core::value::ExtraArg;

use super::error::GraphError;

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one graph; handles from different graphs never mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GraphId(u64);

/// Index of a variable inside its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VariableId(usize);

impl VariableId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Index of a node inside its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A symbolic value: placeholder input or output of a node.
#[derive(Debug, Clone, Serialize)]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
    pub meta: TensorMeta,
    /// Last node that wrote this variable (`None` for graph inputs).
    pub producer: Option<NodeId>,
}

/// Where a node's result lives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeOutput {
    /// Written back into an existing variable (in-place).
    Alias(VariableId),
    /// A fresh variable with the given metadata.
    New(TensorMeta),
}

/// Everything the graph needs to register an operation node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSpec {
    pub op_name: String,
    pub op_num: i32,
    pub family: String,
    pub inputs: Vec<VariableId>,
    pub output: NodeOutput,
    pub extra_args: Vec<ExtraArg>,
    pub in_place: bool,
}

/// A registered operation.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub op_name: String,
    pub op_num: i32,
    pub family: String,
    pub inputs: Vec<VariableId>,
    pub outputs: Vec<VariableId>,
    pub extra_args: Vec<ExtraArg>,
    pub in_place: bool,
}

/// Backward-pass collaborator. Given a registered node and the variable holding the
/// gradient of its output, returns one gradient variable per node input.
pub trait Differentiator {
    fn backward(
        &self,
        graph: &mut SymbolicGraph,
        node: NodeId,
        grad_output: VariableId,
    ) -> Result<Vec<VariableId>, GraphError>;
}

/// Graph owns its variables and nodes; operations only hold ids into it.
#[derive(Debug, Serialize)]
pub struct SymbolicGraph {
    id: GraphId,
    variables: Vec<Variable>,
    nodes: Vec<Node>,
    #[serde(skip)]
    names: HashMap<String, VariableId>,
}

impl SymbolicGraph {
    pub fn new() -> Self {
        Self {
            id: GraphId(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed)),
            variables: Vec::new(),
            nodes: Vec::new(),
            names: HashMap::new(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    /// Declares a graph input.
    pub fn var(
        &mut self,
        name: impl Into<String>,
        dtype: DataType,
        shape: Shape,
    ) -> Result<VariableId, GraphError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(GraphError::DuplicateName(name));
        }
        Ok(self.push_variable(name, TensorMeta::new(dtype, shape), None))
    }

    fn push_variable(
        &mut self,
        name: String,
        meta: TensorMeta,
        producer: Option<NodeId>,
    ) -> VariableId {
        let id = VariableId(self.variables.len());
        self.names.insert(name.clone(), id);
        self.variables.push(Variable {
            id,
            name,
            meta,
            producer,
        });
        id
    }

    fn unique_name(&self, base: &str) -> String {
        let mut n = self.nodes.len();
        loop {
            let candidate = format!("{}_{}", base, n);
            if !self.names.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn variable(&self, id: VariableId) -> Result<&Variable, GraphError> {
        self.variables
            .get(id.0)
            .ok_or(GraphError::UnknownVariable(id))
    }

    pub fn variable_by_name(&self, name: &str) -> Option<&Variable> {
        self.names.get(name).and_then(|id| self.variables.get(id.0))
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(id.0).ok_or(GraphError::UnknownNode(id))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Adds a node and returns it together with the variable holding its result.
    pub fn register_node(&mut self, spec: NodeSpec) -> Result<(NodeId, VariableId), GraphError> {
        for input in &spec.inputs {
            self.variable(*input)?;
        }

        let node_id = NodeId(self.nodes.len());
        let output = match spec.output {
            NodeOutput::Alias(var) => {
                self.variable(var)?;
                self.variables[var.0].producer = Some(node_id);
                var
            }
            NodeOutput::New(meta) => {
                let name = self.unique_name(&spec.op_name);
                self.push_variable(name, meta, Some(node_id))
            }
        };

        self.nodes.push(Node {
            id: node_id,
            op_name: spec.op_name,
            op_num: spec.op_num,
            family: spec.family,
            inputs: spec.inputs,
            outputs: vec![output],
            extra_args: spec.extra_args,
            in_place: spec.in_place,
        });

        log::debug!(
            "graph {:?}: registered node {:?} -> variable {:?}",
            self.id,
            node_id,
            output
        );
        Ok((node_id, output))
    }

    pub fn to_json(&self) -> Result<String, GraphError> {
        serde_json::to_string_pretty(self).map_err(|e| GraphError::Export(e.to_string()))
    }
}

impl Default for SymbolicGraph {
    fn default() -> Self {
        Self::new()
    }
}
