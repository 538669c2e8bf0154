// src/core/tensor.rs

use super::dtype::DataType;
use half::{bf16, f16};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identificador de buffer (newtype para no confundir con otros u64)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensorId(pub u64);

/// Representa la forma (shape) de un tensor.
/// []        -> escalar (rank 0)
/// [3]       -> vector (rank 1)
/// [2, 3]    -> matriz 2x3 (rank 2)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub dims: Vec<usize>,
}

impl Shape {
    /// Crea un nuevo shape a partir de una lista de dimensiones
    pub fn new<D: Into<Vec<usize>>>(dims: D) -> Self {
        Self { dims: dims.into() }
    }

    pub fn scalar() -> Self {
        Self { dims: Vec::new() }
    }

    /// Número de dimensiones (rank)
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Número total de elementos
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Trailing-dimension broadcast check: every dimension of `self`, aligned from the
    /// right, must equal the target's or be 1. `self` may not have a higher rank.
    pub fn is_broadcastable_to(&self, target: &Shape) -> bool {
        if self.rank() > target.rank() {
            return false;
        }
        self.dims
            .iter()
            .rev()
            .zip(target.dims.iter().rev())
            .all(|(&from, &to)| from == to || from == 1)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        if self.dims.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

/// Element type and shape of an operand, as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorMeta {
    pub dtype: DataType,
    pub shape: Shape,
}

impl TensorMeta {
    pub fn new(dtype: DataType, shape: Shape) -> Self {
        Self { dtype, shape }
    }

    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }
}

/// Typed, contiguous, row-major element storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Storage {
    Bool(Vec<bool>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F16(Vec<f16>),
    BF16(Vec<bf16>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// Runs `$body` with `$v` bound to the inner vector of whichever variant `$storage` is.
macro_rules! with_storage {
    ($storage:expr, $v:ident => $body:expr) => {
        match $storage {
            Storage::Bool($v) => $body,
            Storage::I8($v) => $body,
            Storage::I16($v) => $body,
            Storage::I32($v) => $body,
            Storage::I64($v) => $body,
            Storage::U8($v) => $body,
            Storage::U16($v) => $body,
            Storage::U32($v) => $body,
            Storage::U64($v) => $body,
            Storage::F16($v) => $body,
            Storage::BF16($v) => $body,
            Storage::F32($v) => $body,
            Storage::F64($v) => $body,
        }
    };
}

macro_rules! with_storage_pair {
    ($dst:expr, $src:expr, $d:ident, $s:ident => $body:expr, else $otherwise:expr) => {
        match ($dst, $src) {
            (Storage::Bool($d), Storage::Bool($s)) => $body,
            (Storage::I8($d), Storage::I8($s)) => $body,
            (Storage::I16($d), Storage::I16($s)) => $body,
            (Storage::I32($d), Storage::I32($s)) => $body,
            (Storage::I64($d), Storage::I64($s)) => $body,
            (Storage::U8($d), Storage::U8($s)) => $body,
            (Storage::U16($d), Storage::U16($s)) => $body,
            (Storage::U32($d), Storage::U32($s)) => $body,
            (Storage::U64($d), Storage::U64($s)) => $body,
            (Storage::F16($d), Storage::F16($s)) => $body,
            (Storage::BF16($d), Storage::BF16($s)) => $body,
            (Storage::F32($d), Storage::F32($s)) => $body,
            (Storage::F64($d), Storage::F64($s)) => $body,
            _ => $otherwise,
        }
    };
}

impl Storage {
    pub fn dtype(&self) -> DataType {
        match self {
            Storage::Bool(_) => DataType::Bool,
            Storage::I8(_) => DataType::Int8,
            Storage::I16(_) => DataType::Int16,
            Storage::I32(_) => DataType::Int32,
            Storage::I64(_) => DataType::Int64,
            Storage::U8(_) => DataType::UInt8,
            Storage::U16(_) => DataType::UInt16,
            Storage::U32(_) => DataType::UInt32,
            Storage::U64(_) => DataType::UInt64,
            Storage::F16(_) => DataType::Half,
            Storage::BF16(_) => DataType::BFloat16,
            Storage::F32(_) => DataType::Float,
            Storage::F64(_) => DataType::Double,
        }
    }

    pub fn len(&self) -> usize {
        with_storage!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage of `len` zero (false) elements.
    pub fn zeros(dtype: DataType, len: usize) -> Self {
        match dtype {
            DataType::Bool => Storage::Bool(vec![false; len]),
            DataType::Int8 => Storage::I8(vec![0; len]),
            DataType::Int16 => Storage::I16(vec![0; len]),
            DataType::Int32 => Storage::I32(vec![0; len]),
            DataType::Int64 => Storage::I64(vec![0; len]),
            DataType::UInt8 => Storage::U8(vec![0; len]),
            DataType::UInt16 => Storage::U16(vec![0; len]),
            DataType::UInt32 => Storage::U32(vec![0; len]),
            DataType::UInt64 => Storage::U64(vec![0; len]),
            DataType::Half => Storage::F16(vec![f16::ZERO; len]),
            DataType::BFloat16 => Storage::BF16(vec![bf16::ZERO; len]),
            DataType::Float => Storage::F32(vec![0.0; len]),
            DataType::Double => Storage::F64(vec![0.0; len]),
        }
    }

    /// Converts `values` into storage of `dtype` with `as`-cast semantics
    /// (bool is `v != 0`).
    pub fn from_f64(dtype: DataType, values: &[f64]) -> Self {
        match dtype {
            DataType::Bool => Storage::Bool(values.iter().map(|&v| v != 0.0).collect()),
            DataType::Int8 => Storage::I8(values.iter().map(|&v| v as i8).collect()),
            DataType::Int16 => Storage::I16(values.iter().map(|&v| v as i16).collect()),
            DataType::Int32 => Storage::I32(values.iter().map(|&v| v as i32).collect()),
            DataType::Int64 => Storage::I64(values.iter().map(|&v| v as i64).collect()),
            DataType::UInt8 => Storage::U8(values.iter().map(|&v| v as u8).collect()),
            DataType::UInt16 => Storage::U16(values.iter().map(|&v| v as u16).collect()),
            DataType::UInt32 => Storage::U32(values.iter().map(|&v| v as u32).collect()),
            DataType::UInt64 => Storage::U64(values.iter().map(|&v| v as u64).collect()),
            DataType::Half => Storage::F16(values.iter().map(|&v| f16::from_f64(v)).collect()),
            DataType::BFloat16 => {
                Storage::BF16(values.iter().map(|&v| bf16::from_f64(v)).collect())
            }
            DataType::Float => Storage::F32(values.iter().map(|&v| v as f32).collect()),
            DataType::Double => Storage::F64(values.to_vec()),
        }
    }

    /// Lossy widening of every element to f64 (bool maps to 0/1).
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Storage::Bool(v) => v.iter().map(|&x| if x { 1.0 } else { 0.0 }).collect(),
            Storage::I8(v) => v.iter().map(|&x| x as f64).collect(),
            Storage::I16(v) => v.iter().map(|&x| x as f64).collect(),
            Storage::I32(v) => v.iter().map(|&x| x as f64).collect(),
            Storage::I64(v) => v.iter().map(|&x| x as f64).collect(),
            Storage::U8(v) => v.iter().map(|&x| x as f64).collect(),
            Storage::U16(v) => v.iter().map(|&x| x as f64).collect(),
            Storage::U32(v) => v.iter().map(|&x| x as f64).collect(),
            Storage::U64(v) => v.iter().map(|&x| x as f64).collect(),
            Storage::F16(v) => v.iter().map(|x| x.to_f64()).collect(),
            Storage::BF16(v) => v.iter().map(|x| x.to_f64()).collect(),
            Storage::F32(v) => v.iter().map(|&x| x as f64).collect(),
            Storage::F64(v) => v.clone(),
        }
    }

    /// Copy of the first `count` elements (clamped to the length).
    pub fn prefix(&self, count: usize) -> Storage {
        let count = count.min(self.len());
        match self {
            Storage::Bool(v) => Storage::Bool(v[..count].to_vec()),
            Storage::I8(v) => Storage::I8(v[..count].to_vec()),
            Storage::I16(v) => Storage::I16(v[..count].to_vec()),
            Storage::I32(v) => Storage::I32(v[..count].to_vec()),
            Storage::I64(v) => Storage::I64(v[..count].to_vec()),
            Storage::U8(v) => Storage::U8(v[..count].to_vec()),
            Storage::U16(v) => Storage::U16(v[..count].to_vec()),
            Storage::U32(v) => Storage::U32(v[..count].to_vec()),
            Storage::U64(v) => Storage::U64(v[..count].to_vec()),
            Storage::F16(v) => Storage::F16(v[..count].to_vec()),
            Storage::BF16(v) => Storage::BF16(v[..count].to_vec()),
            Storage::F32(v) => Storage::F32(v[..count].to_vec()),
            Storage::F64(v) => Storage::F64(v[..count].to_vec()),
        }
    }

    /// Overwrites the leading `src.len()` elements with `src`.
    pub fn copy_prefix_from(&mut self, src: &Storage) -> Result<(), String> {
        let (dst_type, src_type) = (self.dtype(), src.dtype());
        let dst_len = self.len();
        with_storage_pair!(self, src, d, s => {
            if s.len() > dst_len {
                return Err(format!(
                    "Cannot copy {} elements into a buffer of {}",
                    s.len(),
                    dst_len
                ));
            }
            d[..s.len()].copy_from_slice(s);
            Ok(())
        }, else Err(format!(
            "Storage type mismatch: {} vs {}",
            dst_type, src_type
        )))
    }
}

/// Buffer denso con layout row-major y tipo de elemento explícito
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tensor {
    pub id: TensorId,
    pub shape: Shape,
    pub storage: Storage,
}

impl Tensor {
    /// Crea un tensor verificando que storage.len() coincide con shape.num_elements()
    pub fn new(id: TensorId, shape: Shape, storage: Storage) -> Result<Self, String> {
        let expected = shape.num_elements();
        if storage.len() != expected {
            return Err(format!(
                "Data length {} does not match shape {:?} (expected {})",
                storage.len(),
                shape.dims,
                expected
            ));
        }
        Ok(Self { id, shape, storage })
    }

    pub fn dtype(&self) -> DataType {
        self.storage.dtype()
    }

    pub fn meta(&self) -> TensorMeta {
        TensorMeta::new(self.dtype(), self.shape.clone())
    }

    /// Número de elementos
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.storage.to_f64_vec()
    }
}
