// tests/binding_forms.rs
//
// Every construction form preserves the input element type

use ndxform::ops::{ExecutionMode, RequestedShape};
use ndxform::{
    BufferProvider, Construction, DataType, ExtraArg, GraphProvider, InMemoryTensorStore,
    Lifecycle, OpError, SameOp, Shape, SymbolicGraph, TransformSameOp,
};

fn graph_input(dtype: DataType, dims: Vec<usize>) -> (SymbolicGraph, ndxform::SymbolicOperand) {
    let mut graph = SymbolicGraph::new();
    let x = graph.var("x", dtype, Shape::new(dims)).unwrap();
    let operand = graph.operand(x).unwrap();
    (graph, operand)
}

fn buffers(
    dtype: DataType,
    dims: Vec<usize>,
) -> (InMemoryTensorStore, ndxform::BufferOperand, ndxform::BufferOperand) {
    let mut store = InMemoryTensorStore::new();
    let x = store.insert_zeros(dtype, Shape::new(dims.clone())).unwrap();
    let y = store.insert_zeros(dtype, Shape::new(dims)).unwrap();
    let x = store.operand(x).unwrap();
    let y = store.operand(y).unwrap();
    (store, x, y)
}

#[test]
fn test_every_form_preserves_dtype() {
    for dtype in [DataType::Float, DataType::Int16, DataType::Half, DataType::UInt64] {
        let (_graph, sym) = graph_input(dtype, vec![2, 3]);
        let (_store, x, y) = buffers(dtype, vec![2, 3]);

        let forms = vec![
            Construction::symbolic_with_shape(sym.clone(), &[2, 3], false, vec![]),
            Construction::symbolic(sym.clone(), true),
            Construction::symbolic_with_wide_shape(sym.clone(), &[2, 3], false, vec![]),
            Construction::symbolic_with_args(sym.clone(), vec![ExtraArg::Float(0.5)]),
            Construction::eager(x.clone(), y.clone()),
            Construction::eager_bounded(x.clone(), y.clone(), 3),
            Construction::eager_in_place(x.clone()),
        ];

        for construction in forms {
            let mut op = TransformSameOp::new(SameOp::Abs, construction);
            assert_eq!(op.output_type().unwrap(), dtype);
            assert_eq!(op.resolve().unwrap().dtype, dtype);
        }

        let mut template = TransformSameOp::template(SameOp::Abs);
        template.bind(Construction::eager(x, y)).unwrap();
        assert_eq!(template.output_type().unwrap(), dtype);
    }
}

#[test]
fn test_narrow_and_wide_shapes_normalise_identically() {
    let narrow = RequestedShape::from(&[5i32, 7][..]);
    let wide = RequestedShape::from(&[5i64, 7][..]);
    assert_eq!(narrow, wide);
    assert_eq!(narrow.dims(), &[5i64, 7]);

    let (_graph, sym) = graph_input(DataType::Float, vec![1, 7]);
    let mut a = TransformSameOp::new(
        SameOp::Neg,
        Construction::symbolic_with_shape(sym.clone(), &[5, 7], false, vec![]),
    );
    let mut b = TransformSameOp::new(
        SameOp::Neg,
        Construction::symbolic_with_wide_shape(sym, &[5, 7], false, vec![]),
    );

    assert_eq!(a.operands().unwrap(), b.operands().unwrap());
    assert_eq!(a.resolve().unwrap().clone(), b.resolve().unwrap().clone());
}

#[test]
fn test_eager_in_place_aliases_input() {
    let (_store, x, y) = buffers(DataType::Float, vec![10]);

    let op = TransformSameOp::new(SameOp::Square, Construction::eager_in_place(x.clone()));
    assert!(op.in_place().unwrap());
    assert_eq!(op.input_buffer().unwrap(), op.output_buffer().unwrap());

    let same_twice = TransformSameOp::new(
        SameOp::Square,
        Construction::eager(x.clone(), x.clone()),
    );
    assert!(same_twice.in_place().unwrap());

    let distinct = TransformSameOp::new(SameOp::Square, Construction::eager(x, y));
    assert!(!distinct.in_place().unwrap());
}

#[test]
fn test_template_lifecycle() {
    let (_store, x, y) = buffers(DataType::Double, vec![4]);

    let mut op = TransformSameOp::template(SameOp::Floor);
    assert_eq!(op.lifecycle(), Lifecycle::Unbound);
    assert!(matches!(op.output_type(), Err(OpError::InvalidState(_))));
    assert!(matches!(op.resolve(), Err(OpError::InvalidState(_))));

    op.bind(Construction::eager(x.clone(), y.clone())).unwrap();
    assert_eq!(op.lifecycle(), Lifecycle::Bound);
    assert_eq!(op.mode().unwrap(), ExecutionMode::Eager);

    assert!(matches!(
        op.bind(Construction::eager(x, y)),
        Err(OpError::InvalidState(_))
    ));

    op.resolve().unwrap();
    assert_eq!(op.lifecycle(), Lifecycle::Resolved);
}

#[test]
fn test_extra_args_are_kept_in_order() {
    let (_graph, sym) = graph_input(DataType::Float, vec![3]);
    let args = vec![ExtraArg::Float(-1.0), ExtraArg::Int(2), ExtraArg::Bool(true)];

    let op = TransformSameOp::new(
        SameOp::ClipByValue,
        Construction::symbolic_with_args(sym, args.clone()),
    );

    assert_eq!(op.extra_args().unwrap(), args.as_slice());
    assert!(!op.in_place().unwrap());
}

#[test]
fn test_instances_are_send() {
    fn assert_send<T: Send>() {}
    assert_send::<TransformSameOp>();
    assert_send::<Construction>();
}
