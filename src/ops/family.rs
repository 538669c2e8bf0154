use std::fmt;

use crate::core::dtype::DataType;

use super::kind::{OpKind, SameOp};

/// A family of transforms sharing binding and resolution, differing only in how the
/// output element type follows from the input element type.
pub trait TransformFamily: fmt::Debug + Clone + Send + Sync + 'static {
    type Kind: OpKind;

    /// Tag recorded on graph nodes.
    const NAME: &'static str = "transform";

    fn result_type(kind: &Self::Kind, input: DataType) -> DataType;
}

/// Output element type is always the primary input's element type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SameFamily;

impl TransformFamily for SameFamily {
    type Kind = SameOp;

    const NAME: &'static str = "same";

    fn result_type(_kind: &SameOp, input: DataType) -> DataType {
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_family_preserves_every_type() {
        for dtype in DataType::ALL {
            for op in SameOp::ALL {
                assert_eq!(SameFamily::result_type(&op, dtype), dtype);
            }
        }
    }
}
