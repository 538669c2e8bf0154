// src/core/value.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Auxiliary scalar passed through to a transform kernel (thresholds, clip bounds...).
/// The transform layer never interprets these; only the kernel does.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraArg {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl ExtraArg {
    /// Numeric view of the argument (bool is 0/1).
    pub fn as_f64(&self) -> f64 {
        match self {
            ExtraArg::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            ExtraArg::Int(i) => *i as f64,
            ExtraArg::Float(f) => *f,
        }
    }
}

// Bitwise float comparison so the payload can sit in Eq/Hash containers.
impl PartialEq for ExtraArg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ExtraArg::Bool(a), ExtraArg::Bool(b)) => a == b,
            (ExtraArg::Int(a), ExtraArg::Int(b)) => a == b,
            (ExtraArg::Float(a), ExtraArg::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for ExtraArg {}

impl std::hash::Hash for ExtraArg {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ExtraArg::Bool(v) => v.hash(state),
            ExtraArg::Int(v) => v.hash(state),
            ExtraArg::Float(v) => v.to_bits().hash(state),
        }
    }
}

impl fmt::Display for ExtraArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtraArg::Bool(b) => write!(f, "{}", b),
            ExtraArg::Int(i) => write!(f, "{}", i),
            ExtraArg::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for ExtraArg {
    fn from(v: f64) -> Self {
        ExtraArg::Float(v)
    }
}

impl From<f32> for ExtraArg {
    fn from(v: f32) -> Self {
        ExtraArg::Float(v as f64)
    }
}

impl From<i64> for ExtraArg {
    fn from(v: i64) -> Self {
        ExtraArg::Int(v)
    }
}

impl From<i32> for ExtraArg {
    fn from(v: i32) -> Self {
        ExtraArg::Int(v as i64)
    }
}

impl From<bool> for ExtraArg {
    fn from(v: bool) -> Self {
        ExtraArg::Bool(v)
    }
}
