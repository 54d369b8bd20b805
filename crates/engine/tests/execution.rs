//! End-to-end execution tests: a small string/number pipeline, failure
//! isolation, cycle rejection, and serialisation through the live API.

use serde_json::json;

use engine::{ProcessorError, ProcessorRegistry, WorkflowGraph};
use graph::{
    Connection, ConnectionId, DataType, GraphError, Node, NodeId, NodeTypeName, Port, PortId,
    PortValues,
};

fn nid(s: &str) -> NodeId {
    NodeId::new(s).unwrap()
}

fn pid(s: &str) -> PortId {
    PortId::new(s).unwrap()
}

fn tname(s: &str) -> NodeTypeName {
    NodeTypeName::new(s).unwrap()
}

fn wire(id: &str, from: (&str, &str), to: (&str, &str), dt: DataType) -> Connection {
    Connection::new(nid(from.0), pid(from.1), nid(to.0), pid(to.1), dt)
        .with_id(ConnectionId::new(id).unwrap())
}

fn outputs_of(pairs: &[(&str, serde_json::Value)]) -> PortValues {
    pairs
        .iter()
        .map(|(p, v)| (pid(p), v.clone()))
        .collect()
}

/// Builds the three-node pipeline from the greeting scenario:
/// A emits a string, B consumes it and emits a number, C consumes the number.
fn pipeline() -> WorkflowGraph {
    let mut g = WorkflowGraph::new();
    g.add_node(
        Node::new(nid("a"), tname("greet"), "A")
            .with_output(Port::new(pid("p"), "P", DataType::String)),
    );
    g.add_node(
        Node::new(nid("b"), tname("measure"), "B")
            .with_input(Port::new(pid("q"), "Q", DataType::String))
            .with_output(Port::new(pid("r"), "R", DataType::Number)),
    );
    g.add_node(
        Node::new(nid("c"), tname("consume"), "C")
            .with_input(Port::new(pid("s"), "S", DataType::Number)),
    );
    g.add_connection(wire("ab", ("a", "p"), ("b", "q"), DataType::String))
        .unwrap();
    g.add_connection(wire("bc", ("b", "r"), ("c", "s"), DataType::Number))
        .unwrap();
    g
}

fn pipeline_registry() -> ProcessorRegistry {
    let mut registry = ProcessorRegistry::new();
    registry.register_fn(tname("greet"), |_inputs, _node| async {
        Ok(outputs_of(&[("p", json!("hello"))]))
    });
    registry.register_fn(tname("measure"), |inputs: PortValues, _node| async move {
        let q = inputs.get(&pid("q")).ok_or(ProcessorError::MissingInput {
            port: pid("q"),
        })?;
        assert_eq!(q, &json!("hello"));
        Ok(outputs_of(&[("r", json!(5))]))
    });
    registry.register_fn(tname("consume"), |inputs: PortValues, _node| async move {
        let s = inputs.get(&pid("s")).ok_or(ProcessorError::MissingInput {
            port: pid("s"),
        })?;
        assert_eq!(s, &json!(5));
        Ok(PortValues::new())
    });
    registry
}

#[tokio::test]
async fn values_flow_through_the_pipeline_in_order() {
    let mut g = pipeline();
    let order = g.execution_order().unwrap().to_vec();
    let position =
        |id: &str| order.iter().position(|n| n.as_str() == id).unwrap();
    assert!(position("a") < position("b"));
    assert!(position("b") < position("c"));

    let results = g.execute(&pipeline_registry()).await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[&nid("a")].outputs[&pid("p")], json!("hello"));
    assert_eq!(results[&nid("b")].outputs[&pid("r")], json!(5));
    assert!(results[&nid("c")].outputs.is_empty());
    assert!(results.values().all(|r| r.is_success()));
}

#[tokio::test]
async fn failing_node_is_isolated_and_the_rest_still_run() {
    let mut g = pipeline();
    let mut registry = pipeline_registry();
    registry.register_fn(tname("measure"), |_inputs, _node| async {
        Err::<PortValues, _>(ProcessorError::failed("measurement exploded"))
    });

    let results = g.execute(&registry).await.unwrap();
    assert_eq!(results.len(), 3);
    assert!(results[&nid("a")].is_success());

    let b = &results[&nid("b")];
    assert!(b.outputs.is_empty());
    assert_eq!(b.error.as_deref(), Some("measurement exploded"));
    assert_eq!(
        g.node(&nid("b")).unwrap().error.as_deref(),
        Some("measurement exploded")
    );
    assert!(!g.node(&nid("b")).unwrap().is_processing);

    // C ran, saw no input for its required lookup, and failed on its own
    // terms — it was not skipped.
    let c = &results[&nid("c")];
    assert!(c.error.is_some());
}

#[tokio::test]
async fn missing_processor_is_a_per_node_error() {
    let mut g = pipeline();
    // Only A and C have processors; B's type is unregistered.
    let mut registry = ProcessorRegistry::new();
    registry.register_fn(tname("greet"), |_i, _n| async {
        Ok(outputs_of(&[("p", json!("hello"))]))
    });
    registry.register_fn(tname("consume"), |_i, _n| async { Ok(PortValues::new()) });

    let results = g.execute(&registry).await.unwrap();
    assert!(results[&nid("a")].is_success());
    let b_error = results[&nid("b")].error.as_deref().unwrap();
    assert!(b_error.contains("no processor registered"));
    assert!(b_error.contains("measure"));
    assert!(results[&nid("c")].is_success());
}

#[tokio::test]
async fn cycle_rejects_execution_with_no_results() {
    let mut g = WorkflowGraph::new();
    for id in ["a", "b"] {
        g.add_node(
            Node::new(nid(id), tname("echo"), id)
                .with_input(Port::new(pid("in"), "In", DataType::String))
                .with_output(Port::new(pid("out"), "Out", DataType::String)),
        );
    }
    g.add_connection(wire("c1", ("a", "out"), ("b", "in"), DataType::String))
        .unwrap();
    g.add_connection(wire("c2", ("b", "out"), ("a", "in"), DataType::String))
        .unwrap();

    let mut registry = ProcessorRegistry::new();
    registry.register_fn(tname("echo"), |inputs, _n| async move { Ok(inputs) });

    let err = g.execute(&registry).await.unwrap_err();
    assert!(matches!(err, GraphError::CycleDetected { .. }));

    let report = g.validate();
    assert!(!report.valid);
    assert!(report
        .messages()
        .iter()
        .any(|m| m.contains("cycle detected")));
}

#[tokio::test]
async fn default_value_feeds_an_unconnected_input() {
    let mut g = WorkflowGraph::new();
    g.add_node(
        Node::new(nid("n"), tname("shout"), "Shout").with_input(
            Port::new(pid("text"), "Text", DataType::String)
                .required()
                .with_default(json!("quiet")),
        ),
    );

    let mut registry = ProcessorRegistry::new();
    registry.register_fn(tname("shout"), |inputs: PortValues, _n| async move {
        let text = inputs
            .get(&pid("text"))
            .and_then(|v| v.as_str())
            .ok_or(ProcessorError::MissingInput { port: pid("text") })?;
        Ok(outputs_of(&[("loud", json!(text.to_uppercase()))]))
    });

    assert!(g.validate().valid);
    let results = g.execute(&registry).await.unwrap();
    assert_eq!(results[&nid("n")].outputs[&pid("loud")], json!("QUIET"));
}

#[tokio::test]
async fn failing_port_predicate_fails_only_that_node() {
    let mut g = WorkflowGraph::new();
    g.add_node(
        Node::new(nid("a"), tname("greet"), "A")
            .with_output(Port::new(pid("p"), "P", DataType::Number)),
    );
    g.add_node(
        Node::new(nid("b"), tname("positive"), "B").with_input(
            Port::new(pid("q"), "Q", DataType::Number)
                .with_validator(|v| v.as_f64().is_some_and(|n| n > 0.0)),
        ),
    );
    g.add_connection(wire("ab", ("a", "p"), ("b", "q"), DataType::Number))
        .unwrap();

    let mut registry = ProcessorRegistry::new();
    registry.register_fn(tname("greet"), |_i, _n| async {
        Ok(outputs_of(&[("p", json!(-3))]))
    });
    registry.register_fn(tname("positive"), |_i, _n| async { Ok(PortValues::new()) });

    let results = g.execute(&registry).await.unwrap();
    assert!(results[&nid("a")].is_success());
    let b_error = results[&nid("b")].error.as_deref().unwrap();
    assert!(b_error.contains("validation failed"));
}

#[tokio::test]
async fn round_tripped_graph_executes_identically() {
    let mut g = pipeline();
    let json = g.to_json().unwrap();

    let mut restored = WorkflowGraph::new();
    restored.from_json(&json).unwrap();
    assert_eq!(restored.node_count(), g.node_count());
    assert_eq!(restored.connection_count(), g.connection_count());

    let results = restored.execute(&pipeline_registry()).await.unwrap();
    assert_eq!(results[&nid("a")].outputs[&pid("p")], json!("hello"));
    assert_eq!(results[&nid("b")].outputs[&pid("r")], json!(5));
}

#[tokio::test]
async fn rejected_type_mismatch_never_reaches_execution() {
    let mut g = WorkflowGraph::new();
    g.add_node(
        Node::new(nid("a"), tname("greet"), "A")
            .with_output(Port::new(pid("p"), "P", DataType::String)),
    );
    g.add_node(
        Node::new(nid("b"), tname("consume"), "B")
            .with_input(Port::new(pid("q"), "Q", DataType::Number)),
    );
    let err = g
        .add_connection(wire("ab", ("a", "p"), ("b", "q"), DataType::String))
        .unwrap_err();
    assert!(matches!(err, GraphError::TypeMismatch { .. }));
    assert!(g.get_output_connections(&nid("a")).is_empty());
}
