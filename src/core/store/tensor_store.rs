// src/core/store/tensor_store.rs

use crate::core::dtype::DataType;
use crate::core::tensor::{Shape, Storage, Tensor, TensorId};

#[derive(Debug)]
pub enum StoreError {
    TensorNotFound(TensorId),
    InvalidTensor(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::TensorNotFound(id) => write!(f, "Tensor not found: {:?}", id),
            StoreError::InvalidTensor(msg) => write!(f, "Invalid tensor: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Motor en memoria: guarda los buffers del llamador en una lista.
/// Transforms only reference these buffers by `TensorId`; the store keeps ownership.
#[derive(Debug, Default)]
pub struct InMemoryTensorStore {
    next_id: u64,
    tensors: Vec<Tensor>,
}

impl InMemoryTensorStore {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            tensors: Vec::new(),
        }
    }

    /// Genera un nuevo ID interno
    pub fn gen_id_internal(&mut self) -> TensorId {
        let id = TensorId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Inserta un buffer a partir de shape + storage
    pub fn insert_tensor(
        &mut self,
        shape: Shape,
        storage: Storage,
    ) -> Result<TensorId, StoreError> {
        let id = self.gen_id_internal();
        let tensor = Tensor::new(id, shape, storage).map_err(StoreError::InvalidTensor)?;
        self.tensors.push(tensor);
        Ok(id)
    }

    /// Inserts a zero-filled buffer of the given type and shape.
    pub fn insert_zeros(&mut self, dtype: DataType, shape: Shape) -> Result<TensorId, StoreError> {
        let storage = Storage::zeros(dtype, shape.num_elements());
        self.insert_tensor(shape, storage)
    }

    /// Obtiene referencia a un buffer por ID
    pub fn get(&self, id: TensorId) -> Result<&Tensor, StoreError> {
        self.tensors
            .iter()
            .find(|t| t.id == id)
            .ok_or(StoreError::TensorNotFound(id))
    }

    pub fn get_mut(&mut self, id: TensorId) -> Result<&mut Tensor, StoreError> {
        self.tensors
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TensorNotFound(id))
    }

    /// Drops a buffer from the store and hands it back to the caller.
    pub fn remove(&mut self, id: TensorId) -> Result<Tensor, StoreError> {
        let pos = self
            .tensors
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::TensorNotFound(id))?;
        Ok(self.tensors.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}
