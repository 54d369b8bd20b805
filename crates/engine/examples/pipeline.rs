//! Minimal end-to-end pipeline: prompt -> uppercase -> word count.
//!
//! Run with `cargo run --example pipeline -p engine`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use engine::{ProcessorError, ProcessorRegistry, WorkflowGraph};
use graph::{
    Connection, DataType, GraphEvent, GraphObserver, Node, NodeId, NodeTypeName, Port, PortId,
    PortValues,
};

struct LogObserver;

impl GraphObserver for LogObserver {
    fn on_event(&self, event: &GraphEvent) {
        match event {
            GraphEvent::NodeAdded(n) => println!("+ node {}", n.id),
            GraphEvent::ConnectionAdded(c) => {
                println!("+ wire {} -> {}", c.source_node_id, c.target_node_id)
            }
            _ => {}
        }
    }
}

fn nid(s: &str) -> NodeId {
    NodeId::new(s).expect("non-empty id")
}

fn pid(s: &str) -> PortId {
    PortId::new(s).expect("non-empty id")
}

fn tname(s: &str) -> NodeTypeName {
    NodeTypeName::new(s).expect("non-empty id")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let mut workflow = WorkflowGraph::new();
    workflow.subscribe(Arc::new(LogObserver));

    workflow.add_node(
        Node::new(nid("prompt"), tname("constant"), "Prompt")
            .with_output(Port::new(pid("text"), "Text", DataType::String))
            .with_position(0.0, 0.0),
    );
    workflow.add_node(
        Node::new(nid("shout"), tname("uppercase"), "Uppercase")
            .with_input(Port::new(pid("text"), "Text", DataType::String).required())
            .with_output(Port::new(pid("text"), "Text", DataType::String))
            .with_position(220.0, 0.0),
    );
    workflow.add_node(
        Node::new(nid("count"), tname("word-count"), "Word count")
            .with_input(Port::new(pid("text"), "Text", DataType::String).required())
            .with_output(Port::new(pid("words"), "Words", DataType::Number))
            .with_position(440.0, 0.0),
    );

    workflow.add_connection(Connection::new(
        nid("prompt"),
        pid("text"),
        nid("shout"),
        pid("text"),
        DataType::String,
    ))?;
    workflow.add_connection(Connection::new(
        nid("shout"),
        pid("text"),
        nid("count"),
        pid("text"),
        DataType::String,
    ))?;

    let mut registry = ProcessorRegistry::new();
    registry.register_fn(tname("constant"), |_inputs, _node| async {
        let mut outputs: PortValues = HashMap::new();
        outputs.insert(pid("text"), json!("the quick brown fox"));
        Ok(outputs)
    });
    registry.register_fn(tname("uppercase"), |inputs: PortValues, _node| async move {
        let text = inputs
            .get(&pid("text"))
            .and_then(|v| v.as_str())
            .ok_or(ProcessorError::MissingInput { port: pid("text") })?;
        let mut outputs: PortValues = HashMap::new();
        outputs.insert(pid("text"), json!(text.to_uppercase()));
        Ok(outputs)
    });
    registry.register_fn(tname("word-count"), |inputs: PortValues, _node| async move {
        let text = inputs
            .get(&pid("text"))
            .and_then(|v| v.as_str())
            .ok_or(ProcessorError::MissingInput { port: pid("text") })?;
        let mut outputs: PortValues = HashMap::new();
        outputs.insert(pid("words"), json!(text.split_whitespace().count()));
        Ok(outputs)
    });

    let report = workflow.validate();
    if !report.valid {
        for message in report.messages() {
            eprintln!("invalid workflow: {message}");
        }
        return Ok(());
    }

    let results = workflow.execute(&registry).await?;
    for node_id in workflow.execution_order()? {
        let result = &results[node_id];
        match &result.error {
            Some(error) => println!("{node_id}: failed: {error}"),
            None => println!("{node_id}: {:?}", result.outputs),
        }
    }
    Ok(())
}
