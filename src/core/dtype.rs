// src/core/dtype.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Element type of a buffer or symbolic variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "i8", alias = "int8")]
    Int8,
    #[serde(rename = "i16", alias = "int16")]
    Int16,
    #[serde(rename = "i32", alias = "int32")]
    Int32,
    #[serde(rename = "i64", alias = "int64")]
    Int64,
    #[serde(rename = "u8", alias = "uint8")]
    UInt8,
    #[serde(rename = "u16", alias = "uint16")]
    UInt16,
    #[serde(rename = "u32", alias = "uint32")]
    UInt32,
    #[serde(rename = "u64", alias = "uint64")]
    UInt64,
    #[serde(rename = "f16", alias = "half")]
    Half,
    #[serde(rename = "bf16", alias = "bfloat16")]
    BFloat16,
    #[serde(rename = "f32", alias = "float")]
    Float,
    #[serde(rename = "f64", alias = "double")]
    Double,
}

impl DataType {
    pub const ALL: [DataType; 13] = [
        DataType::Bool,
        DataType::Int8,
        DataType::Int16,
        DataType::Int32,
        DataType::Int64,
        DataType::UInt8,
        DataType::UInt16,
        DataType::UInt32,
        DataType::UInt64,
        DataType::Half,
        DataType::BFloat16,
        DataType::Float,
        DataType::Double,
    ];

    /// Short lowercase name, also accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Bool => "bool",
            DataType::Int8 => "i8",
            DataType::Int16 => "i16",
            DataType::Int32 => "i32",
            DataType::Int64 => "i64",
            DataType::UInt8 => "u8",
            DataType::UInt16 => "u16",
            DataType::UInt32 => "u32",
            DataType::UInt64 => "u64",
            DataType::Half => "f16",
            DataType::BFloat16 => "bf16",
            DataType::Float => "f32",
            DataType::Double => "f64",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let dtype = match lowered.as_str() {
            "bool" => DataType::Bool,
            "i8" | "int8" => DataType::Int8,
            "i16" | "int16" => DataType::Int16,
            "i32" | "int32" | "int" => DataType::Int32,
            "i64" | "int64" | "long" => DataType::Int64,
            "u8" | "uint8" => DataType::UInt8,
            "u16" | "uint16" => DataType::UInt16,
            "u32" | "uint32" => DataType::UInt32,
            "u64" | "uint64" => DataType::UInt64,
            "f16" | "half" => DataType::Half,
            "bf16" | "bfloat16" => DataType::BFloat16,
            "f32" | "float" => DataType::Float,
            "f64" | "double" => DataType::Double,
            _ => return Err(format!("Unknown data type: {}", s)),
        };
        Ok(dtype)
    }
}
