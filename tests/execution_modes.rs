// tests/execution_modes.rs

use ndxform::{
    BufferProvider, Construction, DataType, EngineError, Executor, GraphProvider,
    InMemoryTensorStore, KernelError, Lifecycle, OpError, SameOp, Shape, Storage,
    SymbolicGraph, TransformSameOp,
};

fn ramp(store: &mut InMemoryTensorStore, dtype: DataType, n: usize) -> ndxform::TensorId {
    let values: Vec<f64> = (0..n).map(|i| i as f64 - 5.0).collect();
    store
        .insert_tensor(Shape::new(vec![n]), Storage::from_f64(dtype, &values))
        .unwrap()
}

#[test]
fn test_bounded_count_reaches_dispatch() {
    let mut store = InMemoryTensorStore::new();
    let x = ramp(&mut store, DataType::Float, 10);
    let y = store.insert_zeros(DataType::Float, Shape::new(vec![10])).unwrap();

    let mut op = TransformSameOp::new(
        SameOp::Abs,
        Construction::eager_bounded(store.operand(x).unwrap(), store.operand(y).unwrap(), 4),
    );
    let args = Executor::new().execute(&mut op, &mut store).unwrap();

    assert_eq!(args.count, 4);
    assert_eq!(args.op, SameOp::Abs);
    assert!(!args.in_place);
    assert_eq!(
        store.get(y).unwrap().to_f64_vec(),
        vec![5.0, 4.0, 3.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
    );
}

#[test]
fn test_unbound_template_execute_is_invalid_state() {
    let mut store = InMemoryTensorStore::new();
    let mut op = TransformSameOp::template(SameOp::Neg);

    let err = Executor::new().execute(&mut op, &mut store).unwrap_err();
    assert!(matches!(err, EngineError::Op(OpError::InvalidState(_))));
    assert_eq!(op.lifecycle(), Lifecycle::Unbound);
}

#[test]
fn test_default_count_is_input_length() {
    let mut store = InMemoryTensorStore::new();
    let x = ramp(&mut store, DataType::Int32, 10);
    let y = store.insert_zeros(DataType::Int32, Shape::new(vec![10])).unwrap();

    let mut op = TransformSameOp::new(
        SameOp::Square,
        Construction::eager(store.operand(x).unwrap(), store.operand(y).unwrap()),
    );
    op.resolve().unwrap();
    assert_eq!(op.dispatch_args().unwrap().count, 10);
}

#[test]
fn test_dispatch_args_require_resolution() {
    let mut store = InMemoryTensorStore::new();
    let x = ramp(&mut store, DataType::Float, 3);

    let op = TransformSameOp::new(
        SameOp::Abs,
        Construction::eager_in_place(store.operand(x).unwrap()),
    );
    assert!(matches!(op.dispatch_args(), Err(OpError::InvalidState(_))));
}

#[test]
fn test_repeated_in_place_execution() {
    let mut store = InMemoryTensorStore::new();
    let x = ramp(&mut store, DataType::Double, 3);
    let executor = Executor::new();

    let mut op = TransformSameOp::new(
        SameOp::Neg,
        Construction::eager_in_place(store.operand(x).unwrap()),
    );
    let args = executor.execute(&mut op, &mut store).unwrap();
    assert!(args.in_place);
    assert_eq!(args.input, args.output);
    assert_eq!(store.get(x).unwrap().to_f64_vec(), vec![5.0, 4.0, 3.0]);

    executor.execute(&mut op, &mut store).unwrap();
    assert_eq!(store.get(x).unwrap().to_f64_vec(), vec![-5.0, -4.0, -3.0]);
    assert_eq!(op.executions(), 2);
    assert_eq!(op.lifecycle(), Lifecycle::Executed);
}

#[test]
fn test_mode_specific_accessors() {
    let mut store = InMemoryTensorStore::new();
    let x = ramp(&mut store, DataType::Float, 4);
    let eager = TransformSameOp::new(
        SameOp::Abs,
        Construction::eager_in_place(store.operand(x).unwrap()),
    );

    assert!(matches!(eager.input_variable(), Err(OpError::InvalidOperation(_))));
    assert!(matches!(eager.node_spec(), Err(OpError::InvalidOperation(_))));

    let mut graph = SymbolicGraph::new();
    let v = graph.var("v", DataType::Float, Shape::new(vec![4])).unwrap();
    let mut symbolic = TransformSameOp::new(
        SameOp::Abs,
        Construction::symbolic(graph.operand(v).unwrap(), false),
    );
    symbolic.resolve().unwrap();

    assert!(matches!(symbolic.output_buffer(), Err(OpError::InvalidOperation(_))));
    assert!(matches!(symbolic.dispatch_args(), Err(OpError::InvalidOperation(_))));
    assert!(matches!(
        Executor::new().execute(&mut symbolic, &mut store),
        Err(EngineError::Op(OpError::InvalidOperation(_)))
    ));
}

#[test]
fn test_graph_registration_happens_once() {
    let mut graph = SymbolicGraph::new();
    let v = graph.var("v", DataType::Half, Shape::new(vec![2, 3])).unwrap();
    let executor = Executor::new();

    let mut op = TransformSameOp::new(
        SameOp::Floor,
        Construction::symbolic(graph.operand(v).unwrap(), false),
    );
    assert!(matches!(op.output_variable(), Err(OpError::InvalidState(_))));

    let out = executor.build(&mut op, &mut graph).unwrap();
    assert_ne!(out, v);
    assert_eq!(op.output_variable().unwrap(), out);
    assert_eq!(graph.variable(out).unwrap().meta.dtype, DataType::Half);

    assert!(matches!(
        executor.build(&mut op, &mut graph),
        Err(EngineError::Op(OpError::InvalidState(_)))
    ));
    assert_eq!(graph.nodes().len(), 1);
}

#[test]
fn test_in_place_graph_node_aliases_input() {
    let mut graph = SymbolicGraph::new();
    let v = graph.var("v", DataType::Float, Shape::new(vec![5])).unwrap();

    let mut op = TransformSameOp::new(
        SameOp::Round,
        Construction::symbolic(graph.operand(v).unwrap(), true),
    );
    assert_eq!(op.output_variable().unwrap(), v);

    let out = Executor::new().build(&mut op, &mut graph).unwrap();
    assert_eq!(out, v);
    assert_eq!(graph.variables().len(), 1);
    assert!(graph.nodes()[0].in_place);
}

#[test]
fn test_foreign_graph_rejected() {
    let mut home = SymbolicGraph::new();
    let mut other = SymbolicGraph::new();
    let v = home.var("v", DataType::Float, Shape::new(vec![3])).unwrap();

    let mut op = TransformSameOp::new(
        SameOp::Abs,
        Construction::symbolic(home.operand(v).unwrap(), false),
    );
    op.resolve().unwrap();

    assert!(matches!(op.register(&mut other), Err(OpError::InvalidOperation(_))));
    assert!(op.register(&mut home).is_ok());
}

#[test]
fn test_kernel_failure_leaves_output_untouched() {
    let mut store = InMemoryTensorStore::new();
    let x = store
        .insert_tensor(Shape::new(vec![3]), Storage::I32(vec![2, 0, 4]))
        .unwrap();
    let y = store
        .insert_tensor(Shape::new(vec![3]), Storage::I32(vec![7, 7, 7]))
        .unwrap();

    let mut op = TransformSameOp::new(
        SameOp::Reciprocal,
        Construction::eager(store.operand(x).unwrap(), store.operand(y).unwrap()),
    );
    let err = Executor::new().execute(&mut op, &mut store).unwrap_err();

    assert!(matches!(
        err,
        EngineError::Kernel(KernelError::DivisionByZero { .. })
    ));
    assert_eq!(store.get(y).unwrap().to_f64_vec(), vec![7.0, 7.0, 7.0]);
    assert_eq!(op.executions(), 0);
}
