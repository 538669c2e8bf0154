// src/ops/kind.rs

use serde::Serialize;
use std::fmt;

/// Identity of a concrete transform: stable name plus the engine's legacy op number.
pub trait OpKind: Copy + fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn op_num(&self) -> i32;
}

/// Elementwise transforms whose output element type is the input element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SameOp {
    /// |x|
    Abs,
    /// -1, 0 or 1
    Sign,
    /// 1 everywhere
    Ones,
    /// -x
    Neg,
    /// nearest integer, halves away from zero
    Round,
    /// x * (1 - x)
    TimesOneMinus,
    /// x^3
    Cube,
    /// 1 - x
    OneMinus,
    /// 3x^2
    CubeDerivative,
    /// 1 / x
    Reciprocal,
    /// x^2
    Square,
    Identity,
    Ceiling,
    Floor,
    /// clamp(x, min, max), bounds from the extra args
    ClipByValue,
    /// reverses element order over the processed range
    Reverse,
}

impl SameOp {
    pub const ALL: [SameOp; 16] = [
        SameOp::Abs,
        SameOp::Sign,
        SameOp::Ones,
        SameOp::Neg,
        SameOp::Round,
        SameOp::TimesOneMinus,
        SameOp::Cube,
        SameOp::OneMinus,
        SameOp::CubeDerivative,
        SameOp::Reciprocal,
        SameOp::Square,
        SameOp::Identity,
        SameOp::Ceiling,
        SameOp::Floor,
        SameOp::ClipByValue,
        SameOp::Reverse,
    ];

    /// Number of extra args the kernel reads.
    pub fn extra_arg_count(&self) -> usize {
        match self {
            SameOp::ClipByValue => 2,
            _ => 0,
        }
    }

    /// Accepts the canonical name plus a few common aliases.
    pub fn from_name(name: &str) -> Option<SameOp> {
        let lowered = name.trim().to_ascii_lowercase();
        let alias = match lowered.as_str() {
            "negate" | "negative" => Some(SameOp::Neg),
            "ceiling" => Some(SameOp::Ceiling),
            "clip" => Some(SameOp::ClipByValue),
            "signum" => Some(SameOp::Sign),
            _ => None,
        };
        alias.or_else(|| SameOp::ALL.into_iter().find(|op| op.name() == lowered))
    }
}

impl OpKind for SameOp {
    fn name(&self) -> &'static str {
        match self {
            SameOp::Abs => "abs",
            SameOp::Sign => "sign",
            SameOp::Ones => "ones",
            SameOp::Neg => "neg",
            SameOp::Round => "round",
            SameOp::TimesOneMinus => "times_one_minus",
            SameOp::Cube => "cube",
            SameOp::OneMinus => "one_minus",
            SameOp::CubeDerivative => "cube_derivative",
            SameOp::Reciprocal => "reciprocal",
            SameOp::Square => "square",
            SameOp::Identity => "identity",
            SameOp::Ceiling => "ceil",
            SameOp::Floor => "floor",
            SameOp::ClipByValue => "clip_by_value",
            SameOp::Reverse => "reverse",
        }
    }

    fn op_num(&self) -> i32 {
        match self {
            SameOp::Abs => 0,
            SameOp::Sign => 1,
            SameOp::Ones => 2,
            SameOp::Neg => 3,
            SameOp::Round => 4,
            SameOp::TimesOneMinus => 5,
            SameOp::Cube => 6,
            SameOp::OneMinus => 7,
            SameOp::CubeDerivative => 10,
            SameOp::Reciprocal => 11,
            SameOp::Square => 12,
            SameOp::Identity => 15,
            SameOp::Ceiling => 17,
            SameOp::Floor => 18,
            SameOp::ClipByValue => 19,
            SameOp::Reverse => 20,
        }
    }
}

impl fmt::Display for SameOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
