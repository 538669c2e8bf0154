// tests/resolution.rs

use ndxform::{
    BufferProvider, ConfigurationError, Construction, DataType, GraphProvider,
    InMemoryTensorStore, OpError, SameOp, Shape, ShapePolicy, SymbolicGraph, TransformSameOp,
};

fn config_err(result: Result<impl std::fmt::Debug, OpError>) -> ConfigurationError {
    match result {
        Err(OpError::Configuration(e)) => e,
        other => panic!("expected a configuration failure, got {:?}", other),
    }
}

#[test]
fn test_eager_float_matrix() {
    let mut store = InMemoryTensorStore::new();
    let x = store.insert_zeros(DataType::Float, Shape::new(vec![3, 4])).unwrap();
    let y = store.insert_zeros(DataType::Float, Shape::new(vec![3, 4])).unwrap();

    let mut op = TransformSameOp::new(
        SameOp::Abs,
        Construction::eager(store.operand(x).unwrap(), store.operand(y).unwrap()),
    );

    let resolution = op.resolve().unwrap();
    assert_eq!(resolution.dtype, DataType::Float);
    assert_eq!(resolution.shape, Shape::new(vec![3, 4]));
}

#[test]
fn test_eager_in_place_vector() {
    let mut store = InMemoryTensorStore::new();
    let x = store.insert_zeros(DataType::Double, Shape::new(vec![10])).unwrap();

    let mut op = TransformSameOp::new(
        SameOp::Neg,
        Construction::eager_in_place(store.operand(x).unwrap()),
    );

    assert_eq!(op.resolve().unwrap().shape, Shape::new(vec![10]));
    assert_eq!(op.output_buffer().unwrap(), x);
    assert_eq!(op.input_buffer().unwrap(), x);
}

#[test]
fn test_in_place_explicit_shape_must_match_input() {
    let mut graph = SymbolicGraph::new();
    let x = graph.var("x", DataType::Float, Shape::new(vec![3, 4])).unwrap();
    let input = graph.operand(x).unwrap();

    let mut op = TransformSameOp::new(
        SameOp::Abs,
        Construction::symbolic_with_shape(input.clone(), &[5, 5], true, vec![]),
    );
    assert!(matches!(
        config_err(op.resolve()),
        ConfigurationError::InPlaceShapeMismatch { .. }
    ));

    // An explicit shape equal to the input shape is fine.
    let mut op = TransformSameOp::new(
        SameOp::Abs,
        Construction::symbolic_with_shape(input.clone(), &[3, 4], true, vec![]),
    );
    assert_eq!(op.resolve().unwrap().shape, Shape::new(vec![3, 4]));
}

#[test]
fn test_out_of_place_shape_policies() {
    let mut graph = SymbolicGraph::new();
    let x = graph.var("x", DataType::Float, Shape::new(vec![1, 4])).unwrap();
    let input = graph.operand(x).unwrap();

    let mut op = TransformSameOp::new(
        SameOp::Cube,
        Construction::symbolic_with_shape(input.clone(), &[3, 4], false, vec![]),
    );
    assert_eq!(
        op.resolve_with(ShapePolicy::Broadcast).unwrap().shape,
        Shape::new(vec![3, 4])
    );
    assert!(matches!(
        config_err(op.resolve_with(ShapePolicy::Exact)),
        ConfigurationError::IncompatibleShape { policy: ShapePolicy::Exact, .. }
    ));

    let mut op = TransformSameOp::new(
        SameOp::Cube,
        Construction::symbolic_with_shape(input, &[5, 5], false, vec![]),
    );
    assert!(matches!(
        config_err(op.resolve()),
        ConfigurationError::IncompatibleShape { .. }
    ));
}

#[test]
fn test_negative_dimension_rejected() {
    let mut graph = SymbolicGraph::new();
    let x = graph.var("x", DataType::Float, Shape::new(vec![4])).unwrap();

    let mut op = TransformSameOp::new(
        SameOp::Abs,
        Construction::symbolic_with_wide_shape(graph.operand(x).unwrap(), &[-4], false, vec![]),
    );

    assert_eq!(
        config_err(op.resolve()),
        ConfigurationError::NegativeDimension { axis: 0, value: -4 }
    );
}

#[test]
fn test_resolution_is_idempotent() {
    let mut graph = SymbolicGraph::new();
    let x = graph.var("x", DataType::Int64, Shape::new(vec![2, 2, 2])).unwrap();

    let mut op = TransformSameOp::new(
        SameOp::Square,
        Construction::symbolic(graph.operand(x).unwrap(), false),
    );

    let first = op.resolve().unwrap().clone();
    let second = op.resolve().unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(first.shape, Shape::new(vec![2, 2, 2]));
    assert_eq!(op.resolution().unwrap(), &first);
}

#[test]
fn test_eager_output_buffer_checks() {
    let mut store = InMemoryTensorStore::new();
    let x = store.insert_zeros(DataType::Float, Shape::new(vec![10])).unwrap();
    let wrong_type = store.insert_zeros(DataType::Double, Shape::new(vec![10])).unwrap();
    let wrong_shape = store.insert_zeros(DataType::Float, Shape::new(vec![2, 5])).unwrap();
    let short = store.insert_zeros(DataType::Float, Shape::new(vec![6])).unwrap();

    let input = store.operand(x).unwrap();

    let mut op = TransformSameOp::new(
        SameOp::Abs,
        Construction::eager(input.clone(), store.operand(wrong_type).unwrap()),
    );
    assert_eq!(
        config_err(op.resolve()),
        ConfigurationError::OutputTypeMismatch {
            input: DataType::Float,
            output: DataType::Double
        }
    );

    let mut op = TransformSameOp::new(
        SameOp::Abs,
        Construction::eager(input.clone(), store.operand(wrong_shape).unwrap()),
    );
    assert!(matches!(
        config_err(op.resolve()),
        ConfigurationError::OutputShapeMismatch { .. }
    ));

    // A count bound lifts the shape requirement but not the size limit.
    let mut op = TransformSameOp::new(
        SameOp::Abs,
        Construction::eager_bounded(input.clone(), store.operand(short).unwrap(), 6),
    );
    assert!(op.resolve().is_ok());

    let mut op = TransformSameOp::new(
        SameOp::Abs,
        Construction::eager_bounded(input, store.operand(short).unwrap(), 7),
    );
    assert_eq!(
        config_err(op.resolve()),
        ConfigurationError::CountOutOfRange {
            count: 7,
            available: 6
        }
    );
}

#[test]
fn test_secondary_operand_checks() {
    let mut graph = SymbolicGraph::new();
    let x = graph.var("x", DataType::Float, Shape::new(vec![3, 4])).unwrap();
    let row = graph.var("row", DataType::Float, Shape::new(vec![4])).unwrap();
    let ints = graph.var("ints", DataType::Int32, Shape::new(vec![3, 4])).unwrap();
    let col = graph.var("col", DataType::Float, Shape::new(vec![5])).unwrap();

    let mut store = InMemoryTensorStore::new();
    let b = store.insert_zeros(DataType::Float, Shape::new(vec![3, 4])).unwrap();

    let input = graph.operand(x).unwrap();

    let mut ok = TransformSameOp::new(
        SameOp::Identity,
        Construction::symbolic(input.clone(), false).with_secondary(graph.operand(row).unwrap()),
    );
    assert!(ok.resolve().is_ok());

    let mut op = TransformSameOp::new(
        SameOp::Identity,
        Construction::symbolic(input.clone(), false).with_secondary(graph.operand(ints).unwrap()),
    );
    assert!(matches!(
        config_err(op.resolve()),
        ConfigurationError::SecondaryTypeMismatch { .. }
    ));

    let mut op = TransformSameOp::new(
        SameOp::Identity,
        Construction::symbolic(input.clone(), false).with_secondary(graph.operand(col).unwrap()),
    );
    assert!(matches!(
        config_err(op.resolve()),
        ConfigurationError::SecondaryShapeMismatch { .. }
    ));

    let mut op = TransformSameOp::new(
        SameOp::Identity,
        Construction::symbolic(input, false).with_secondary(store.operand(b).unwrap()),
    );
    assert_eq!(
        config_err(op.resolve()),
        ConfigurationError::SecondaryModeMismatch
    );
}
