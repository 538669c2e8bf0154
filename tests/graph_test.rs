// tests/graph_test.rs

use ndxform::graph::{NodeOutput, NodeSpec};
use ndxform::{
    Construction, DataType, Differentiator, Executor, GraphError, GraphProvider, NodeId,
    SameOp, Shape, SymbolicGraph, Transform, TransformFamily, TransformSameOp, VariableId,
};

/// Sibling family whose outputs are always boolean.
#[derive(Debug, Clone)]
struct BoolFamily;

impl TransformFamily for BoolFamily {
    type Kind = SameOp;
    const NAME: &'static str = "bool";

    fn result_type(_kind: &SameOp, _input: DataType) -> DataType {
        DataType::Bool
    }
}

/// d(-x) = -dx; every other op is treated as identity for the test.
struct NegGradient;

impl Differentiator for NegGradient {
    fn backward(
        &self,
        graph: &mut SymbolicGraph,
        node: NodeId,
        grad_output: VariableId,
    ) -> Result<Vec<VariableId>, GraphError> {
        let op_name = graph.node(node)?.op_name.clone();
        if op_name != "neg" {
            return Ok(vec![grad_output]);
        }

        let operand = graph
            .operand(grad_output)
            .map_err(|e| GraphError::Export(e.to_string()))?;
        let mut grad = TransformSameOp::new(SameOp::Neg, Construction::symbolic(operand, false));
        let out = Executor::new()
            .build(&mut grad, graph)
            .map_err(|e| GraphError::Export(e.to_string()))?;
        Ok(vec![out])
    }
}

#[test]
fn test_chain_and_export() {
    let mut graph = SymbolicGraph::new();
    let x = graph.var("x", DataType::Float, Shape::new(vec![2, 2])).unwrap();
    let executor = Executor::new();

    let mut abs = TransformSameOp::new(
        SameOp::Abs,
        Construction::symbolic(graph.operand(x).unwrap(), false),
    );
    let a = executor.build(&mut abs, &mut graph).unwrap();

    let mut sq = TransformSameOp::new(
        SameOp::Square,
        Construction::symbolic(graph.operand(a).unwrap(), true),
    );
    let b = executor.build(&mut sq, &mut graph).unwrap();

    assert_eq!(a, b);
    assert_eq!(graph.nodes().len(), 2);
    assert_eq!(graph.variable(a).unwrap().producer, Some(sq.node_id().unwrap()));
    assert_eq!(graph.nodes()[0].op_num, 0);
    assert_eq!(graph.nodes()[1].family, "same");

    let json = graph.to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["nodes"][1]["op_name"], "square");
}

#[test]
fn test_duplicate_and_unknown_variables() {
    let mut graph = SymbolicGraph::new();
    graph.var("x", DataType::Float, Shape::new(vec![1])).unwrap();

    assert_eq!(
        graph.var("x", DataType::Float, Shape::new(vec![1])),
        Err(GraphError::DuplicateName("x".to_string()))
    );

    let mut other = SymbolicGraph::new();
    other.var("a", DataType::Float, Shape::new(vec![1])).unwrap();
    other.var("b", DataType::Float, Shape::new(vec![1])).unwrap();
    let stray = other.var("c", DataType::Float, Shape::new(vec![1])).unwrap();

    let spec = NodeSpec {
        op_name: "abs".to_string(),
        op_num: 0,
        family: "same".to_string(),
        inputs: vec![stray],
        output: NodeOutput::New(ndxform::TensorMeta::new(DataType::Float, Shape::new(vec![1]))),
        extra_args: vec![],
        in_place: false,
    };
    assert!(matches!(
        graph.register_node(spec),
        Err(GraphError::UnknownVariable(_))
    ));
}

#[test]
fn test_differentiator_builds_gradient_nodes() {
    let mut graph = SymbolicGraph::new();
    let x = graph.var("x", DataType::Double, Shape::new(vec![3])).unwrap();
    let dy = graph.var("dy", DataType::Double, Shape::new(vec![3])).unwrap();

    let mut neg = TransformSameOp::new(
        SameOp::Neg,
        Construction::symbolic(graph.operand(x).unwrap(), false),
    );
    Executor::new().build(&mut neg, &mut graph).unwrap();

    let grads = NegGradient
        .backward(&mut graph, neg.node_id().unwrap(), dy)
        .unwrap();

    assert_eq!(grads.len(), 1);
    let grad = graph.variable(grads[0]).unwrap();
    assert_eq!(grad.meta.dtype, DataType::Double);
    assert_eq!(graph.nodes().len(), 2);
    assert_eq!(graph.nodes()[1].inputs, vec![dy]);
}

#[test]
fn test_sibling_family_picks_its_own_output_type() {
    let mut graph = SymbolicGraph::new();
    let x = graph.var("x", DataType::Int32, Shape::new(vec![4])).unwrap();

    let mut op: Transform<BoolFamily> =
        Transform::new(SameOp::Sign, Construction::symbolic(graph.operand(x).unwrap(), false));

    assert_eq!(op.output_type().unwrap(), DataType::Bool);
    assert_eq!(op.family(), "bool");

    let out = Executor::new().build(&mut op, &mut graph).unwrap();
    assert_eq!(graph.variable(out).unwrap().meta.dtype, DataType::Bool);
    assert_eq!(graph.nodes()[0].family, "bool");
}
