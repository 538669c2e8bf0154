// src/engine/kernels.rs

use half::{bf16, f16};
use thiserror::Error;

use crate::core::dtype::DataType;
use crate::core::store::InMemoryTensorStore;
use crate::core::tensor::Storage;
use crate::core::value::ExtraArg;
use crate::ops::{DispatchArgs, SameOp};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    #[error("{op} is not defined for {dtype} elements")]
    UnsupportedType { op: SameOp, dtype: DataType },

    #[error("{op} expects {expected} extra args, got {actual}")]
    MissingExtraArgs {
        op: SameOp,
        expected: usize,
        actual: usize,
    },

    #[error("division by zero in {op}")]
    DivisionByZero { op: SameOp },

    #[error("buffer element type {actual} differs from dispatched type {expected}")]
    TypeMismatch {
        expected: DataType,
        actual: DataType,
    },

    #[error("element count {count} exceeds buffer of {len} elements")]
    CountOutOfRange { count: usize, len: usize },

    #[error("buffer error: {0}")]
    Buffer(String),
}

/// Runs resolved transforms against concrete buffers.
pub trait KernelDispatcher<K> {
    fn dispatch(
        &self,
        args: &DispatchArgs<K>,
        buffers: &mut InMemoryTensorStore,
    ) -> Result<(), KernelError>;
}

/// Scalar arithmetic the reference kernels need. Integer arithmetic wraps; half
/// precision types compute through f32.
pub trait Element: Copy + PartialOrd {
    fn zero() -> Self;
    fn one() -> Self;
    fn from_f64(v: f64) -> Self;
    fn magnitude(self) -> Self;
    fn negated(self) -> Self;
    fn rounded(self) -> Self;
    fn ceiled(self) -> Self;
    fn floored(self) -> Self;
    fn plus(self, other: Self) -> Self;
    fn minus(self, other: Self) -> Self;
    fn times(self, other: Self) -> Self;
    /// `None` when the reciprocal is undefined for the type (integer zero).
    fn reciprocal(self) -> Option<Self>;
}

macro_rules! impl_signed_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                fn zero() -> Self { 0 }
                fn one() -> Self { 1 }
                fn from_f64(v: f64) -> Self { v as $t }
                fn magnitude(self) -> Self { self.wrapping_abs() }
                fn negated(self) -> Self { self.wrapping_neg() }
                fn rounded(self) -> Self { self }
                fn ceiled(self) -> Self { self }
                fn floored(self) -> Self { self }
                fn plus(self, other: Self) -> Self { self.wrapping_add(other) }
                fn minus(self, other: Self) -> Self { self.wrapping_sub(other) }
                fn times(self, other: Self) -> Self { self.wrapping_mul(other) }
                fn reciprocal(self) -> Option<Self> {
                    if self == 0 { None } else { Some(1 / self) }
                }
            }
        )*
    };
}

macro_rules! impl_unsigned_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                fn zero() -> Self { 0 }
                fn one() -> Self { 1 }
                fn from_f64(v: f64) -> Self { v as $t }
                fn magnitude(self) -> Self { self }
                fn negated(self) -> Self { self.wrapping_neg() }
                fn rounded(self) -> Self { self }
                fn ceiled(self) -> Self { self }
                fn floored(self) -> Self { self }
                fn plus(self, other: Self) -> Self { self.wrapping_add(other) }
                fn minus(self, other: Self) -> Self { self.wrapping_sub(other) }
                fn times(self, other: Self) -> Self { self.wrapping_mul(other) }
                fn reciprocal(self) -> Option<Self> {
                    if self == 0 { None } else { Some(1 / self) }
                }
            }
        )*
    };
}

macro_rules! impl_float_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                fn zero() -> Self { 0.0 }
                fn one() -> Self { 1.0 }
                fn from_f64(v: f64) -> Self { v as $t }
                fn magnitude(self) -> Self { self.abs() }
                fn negated(self) -> Self { -self }
                fn rounded(self) -> Self { self.round() }
                fn ceiled(self) -> Self { self.ceil() }
                fn floored(self) -> Self { self.floor() }
                fn plus(self, other: Self) -> Self { self + other }
                fn minus(self, other: Self) -> Self { self - other }
                fn times(self, other: Self) -> Self { self * other }
                fn reciprocal(self) -> Option<Self> { Some(1.0 / self) }
            }
        )*
    };
}

macro_rules! impl_half_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                fn zero() -> Self { <$t>::ZERO }
                fn one() -> Self { <$t>::ONE }
                fn from_f64(v: f64) -> Self { <$t>::from_f64(v) }
                fn magnitude(self) -> Self { <$t>::from_f32(self.to_f32().abs()) }
                fn negated(self) -> Self { <$t>::from_f32(-self.to_f32()) }
                fn rounded(self) -> Self { <$t>::from_f32(self.to_f32().round()) }
                fn ceiled(self) -> Self { <$t>::from_f32(self.to_f32().ceil()) }
                fn floored(self) -> Self { <$t>::from_f32(self.to_f32().floor()) }
                fn plus(self, other: Self) -> Self {
                    <$t>::from_f32(self.to_f32() + other.to_f32())
                }
                fn minus(self, other: Self) -> Self {
                    <$t>::from_f32(self.to_f32() - other.to_f32())
                }
                fn times(self, other: Self) -> Self {
                    <$t>::from_f32(self.to_f32() * other.to_f32())
                }
                fn reciprocal(self) -> Option<Self> { Some(<$t>::from_f32(1.0 / self.to_f32())) }
            }
        )*
    };
}

impl_signed_element!(i8, i16, i32, i64);
impl_unsigned_element!(u8, u16, u32, u64);
impl_float_element!(f32, f64);
impl_half_element!(f16, bf16);

/// -1, 0 or 1; zero and NaN map to themselves.
fn sign<T: Element>(x: T) -> T {
    if x > T::zero() {
        T::one()
    } else if x < T::zero() {
        T::zero().minus(T::one())
    } else {
        x
    }
}

fn clip_bounds<T: Element>(op: SameOp, extra: &[ExtraArg]) -> Result<(T, T), KernelError> {
    if extra.len() < 2 {
        return Err(KernelError::MissingExtraArgs {
            op,
            expected: 2,
            actual: extra.len(),
        });
    }
    Ok((T::from_f64(extra[0].as_f64()), T::from_f64(extra[1].as_f64())))
}

/// Aplica la transformación sobre todo el slice
pub fn apply_slice<T: Element>(
    op: SameOp,
    values: &mut [T],
    extra: &[ExtraArg],
) -> Result<(), KernelError> {
    match op {
        SameOp::Reverse => values.reverse(),
        SameOp::ClipByValue => {
            let (lo, hi) = clip_bounds::<T>(op, extra)?;
            for x in values.iter_mut() {
                if *x < lo {
                    *x = lo;
                } else if *x > hi {
                    *x = hi;
                }
            }
        }
        SameOp::Reciprocal => {
            for x in values.iter_mut() {
                *x = x.reciprocal().ok_or(KernelError::DivisionByZero { op })?;
            }
        }
        _ => {
            for x in values.iter_mut() {
                *x = unary(op, *x);
            }
        }
    }
    Ok(())
}

fn unary<T: Element>(op: SameOp, x: T) -> T {
    match op {
        SameOp::Abs => x.magnitude(),
        SameOp::Sign => sign(x),
        SameOp::Ones => T::one(),
        SameOp::Neg => x.negated(),
        SameOp::Round => x.rounded(),
        SameOp::TimesOneMinus => x.times(T::one().minus(x)),
        SameOp::Cube => x.times(x).times(x),
        SameOp::OneMinus => T::one().minus(x),
        SameOp::CubeDerivative => T::from_f64(3.0).times(x.times(x)),
        SameOp::Square => x.times(x),
        SameOp::Ceiling => x.ceiled(),
        SameOp::Floor => x.floored(),
        SameOp::Identity | SameOp::Reverse | SameOp::ClipByValue | SameOp::Reciprocal => x,
    }
}

/// Bool buffers only support transforms that are well defined on {0, 1}.
fn apply_bool(op: SameOp, values: &mut [bool]) -> Result<(), KernelError> {
    match op {
        SameOp::Identity
        | SameOp::Abs
        | SameOp::Sign
        | SameOp::Round
        | SameOp::Ceiling
        | SameOp::Floor
        | SameOp::Square
        | SameOp::Cube => Ok(()),
        SameOp::Ones => {
            values.fill(true);
            Ok(())
        }
        SameOp::Reverse => {
            values.reverse();
            Ok(())
        }
        _ => Err(KernelError::UnsupportedType {
            op,
            dtype: DataType::Bool,
        }),
    }
}

/// Applies `op` to every element of `storage`.
pub fn apply_storage(
    op: SameOp,
    storage: &mut Storage,
    extra: &[ExtraArg],
) -> Result<(), KernelError> {
    match storage {
        Storage::Bool(v) => apply_bool(op, v),
        Storage::I8(v) => apply_slice(op, v, extra),
        Storage::I16(v) => apply_slice(op, v, extra),
        Storage::I32(v) => apply_slice(op, v, extra),
        Storage::I64(v) => apply_slice(op, v, extra),
        Storage::U8(v) => apply_slice(op, v, extra),
        Storage::U16(v) => apply_slice(op, v, extra),
        Storage::U32(v) => apply_slice(op, v, extra),
        Storage::U64(v) => apply_slice(op, v, extra),
        Storage::F16(v) => apply_slice(op, v, extra),
        Storage::BF16(v) => apply_slice(op, v, extra),
        Storage::F32(v) => apply_slice(op, v, extra),
        Storage::F64(v) => apply_slice(op, v, extra),
    }
}

/// Reference single-threaded kernels over `InMemoryTensorStore` buffers.
///
/// The leading `count` elements are computed on a copy and written back only once
/// every element succeeded, so a failing dispatch leaves the output untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuKernels;

impl KernelDispatcher<SameOp> for CpuKernels {
    fn dispatch(
        &self,
        args: &DispatchArgs<SameOp>,
        buffers: &mut InMemoryTensorStore,
    ) -> Result<(), KernelError> {
        if args.count == 0 {
            log::warn!("{}: dispatch with zero elements, nothing to do", args.op);
            return Ok(());
        }

        let input = buffers
            .get(args.input)
            .map_err(|e| KernelError::Buffer(e.to_string()))?;
        if input.dtype() != args.dtype {
            return Err(KernelError::TypeMismatch {
                expected: args.dtype,
                actual: input.dtype(),
            });
        }
        if args.count > input.len() {
            return Err(KernelError::CountOutOfRange {
                count: args.count,
                len: input.len(),
            });
        }

        let mut work = input.storage.prefix(args.count);
        apply_storage(args.op, &mut work, &args.extra_args)?;

        let output = buffers
            .get_mut(args.output)
            .map_err(|e| KernelError::Buffer(e.to_string()))?;
        if output.dtype() != args.dtype {
            return Err(KernelError::TypeMismatch {
                expected: args.dtype,
                actual: output.dtype(),
            });
        }
        output
            .storage
            .copy_prefix_from(&work)
            .map_err(KernelError::Buffer)?;

        log::debug!(
            "{}: {} x {} {:?} -> {:?}",
            args.op,
            args.count,
            args.dtype,
            args.input,
            args.output
        );
        Ok(())
    }
}
