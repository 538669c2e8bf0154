use std::collections::HashMap;

use crate::core::config::EngineConfig;
use crate::core::dtype::DataType;
use crate::core::store::InMemoryTensorStore;
use crate::core::tensor::{Shape, Storage, Tensor, TensorId};
use crate::core::value::ExtraArg;
use crate::graph::{SymbolicGraph, VariableId};
use crate::ops::{
    registry, BufferProvider, Construction, DispatchArgs, GraphProvider, SameOp, TransformSameOp,
};

use super::error::EngineError;
use super::executor::Executor;

/// Named buffers plus a symbolic graph, both driven through one executor.
pub struct Workspace {
    pub config: EngineConfig,
    store: InMemoryTensorStore,
    names: HashMap<String, TensorId>,
    graph: SymbolicGraph,
    executor: Executor,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::load())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let executor = Executor::from_config(&config);
        Self {
            config,
            store: InMemoryTensorStore::new(),
            names: HashMap::new(),
            graph: SymbolicGraph::new(),
            executor,
        }
    }

    /// Inserta un buffer y lo asocia a un nombre
    pub fn insert_named(
        &mut self,
        name: impl Into<String>,
        shape: Shape,
        storage: Storage,
    ) -> Result<TensorId, EngineError> {
        let id = self.store.insert_tensor(shape, storage)?;
        self.names.insert(name.into(), id);
        Ok(id)
    }

    /// Inserta un buffer convirtiendo los valores al tipo pedido
    pub fn insert_values(
        &mut self,
        name: impl Into<String>,
        dtype: DataType,
        shape: Shape,
        values: &[f64],
    ) -> Result<TensorId, EngineError> {
        self.insert_named(name, shape, Storage::from_f64(dtype, values))
    }

    pub fn id_of(&self, name: &str) -> Result<TensorId, EngineError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::NameNotFound(name.to_string()))
    }

    /// Obtiene un buffer por nombre
    pub fn get(&self, name: &str) -> Result<&Tensor, EngineError> {
        Ok(self.store.get(self.id_of(name)?)?)
    }

    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn store(&self) -> &InMemoryTensorStore {
        &self.store
    }

    pub fn graph(&self) -> &SymbolicGraph {
        &self.graph
    }

    /// Applies `op` eagerly to the buffer named `input_name`.
    ///
    /// Without `output_name` the input is overwritten. An unknown output name gets a
    /// fresh buffer with the input's type and shape, registered only if the op succeeds.
    pub fn apply(
        &mut self,
        op: SameOp,
        input_name: &str,
        output_name: Option<&str>,
        count: Option<usize>,
        extra_args: Vec<ExtraArg>,
    ) -> Result<DispatchArgs<SameOp>, EngineError> {
        let input = self.store.operand(self.id_of(input_name)?)?;

        let mut allocated = None;
        let output = match output_name {
            None => input.clone(),
            Some(name) => match self.names.get(name) {
                Some(id) => self.store.operand(*id)?,
                None => {
                    let id = self
                        .store
                        .insert_zeros(input.meta.dtype, input.meta.shape.clone())?;
                    allocated = Some((name, id));
                    self.store.operand(id)?
                }
            },
        };

        let construction = match count {
            Some(n) => Construction::eager_bounded(input, output, n),
            None if output.id == input.id => Construction::eager_in_place(input),
            None => Construction::eager(input, output),
        };

        let mut transform = TransformSameOp::new(op, construction.with_extra_args(extra_args));
        match self.executor.execute(&mut transform, &mut self.store) {
            Ok(args) => {
                if let Some((name, id)) = allocated {
                    self.names.insert(name.to_string(), id);
                }
                Ok(args)
            }
            Err(err) => {
                // a failed op must not leave a half-made output behind
                if let Some((_, id)) = allocated {
                    self.store.remove(id)?;
                }
                Err(err)
            }
        }
    }

    /// Same as [`Workspace::apply`], looking the op up by name.
    pub fn apply_named(
        &mut self,
        op_name: &str,
        input_name: &str,
        output_name: Option<&str>,
        count: Option<usize>,
        extra_args: Vec<ExtraArg>,
    ) -> Result<DispatchArgs<SameOp>, EngineError> {
        let op = registry().lookup(op_name)?;
        self.apply(op, input_name, output_name, count, extra_args)
    }

    /// Declares a graph input variable.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        dtype: DataType,
        shape: Shape,
    ) -> Result<VariableId, EngineError> {
        Ok(self.graph.var(name, dtype, shape)?)
    }

    /// Adds a graph node applying `op` to the variable named `input_name`.
    pub fn build(
        &mut self,
        op: SameOp,
        input_name: &str,
        shape: Option<&[i64]>,
        in_place: bool,
        extra_args: Vec<ExtraArg>,
    ) -> Result<VariableId, EngineError> {
        let variable = self
            .graph
            .variable_by_name(input_name)
            .map(|v| v.id)
            .ok_or_else(|| EngineError::NameNotFound(input_name.to_string()))?;
        let input = self.graph.operand(variable)?;

        let construction = match shape {
            Some(dims) => Construction::symbolic_with_wide_shape(input, dims, in_place, extra_args),
            None => Construction::symbolic(input, in_place).with_extra_args(extra_args),
        };

        let mut transform = TransformSameOp::new(op, construction);
        self.executor.build(&mut transform, &mut self.graph)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}
