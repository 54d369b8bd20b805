//! FlowGraph execution engine.
//!
//! An embeddable, typed data-flow workflow engine: computational nodes with
//! typed input/output ports, wired by connections, executed in dependency
//! order with cycle detection, per-node error isolation, and validation of
//! required inputs. There is no rendering here — the engine exposes only the
//! graph model and execution API a rendering layer would consume.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`store`] | [`WorkflowGraph`]: mutations, introspection, events, serialisation |
//! | `scheduler` | Topological sort and cycle detection (crate-internal) |
//! | [`executor`] | `WorkflowGraph::execute` |
//! | [`validator`] | `WorkflowGraph::validate` and findings |
//! | [`registry`] | [`NodeProcessor`], [`ProcessorRegistry`] |
//!
//! ## Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use engine::{ProcessorRegistry, WorkflowGraph};
//! use graph::{DataType, Node, NodeId, NodeTypeName, Port, PortId};
//!
//! # async fn demo() -> Result<(), graph::GraphError> {
//! let mut workflow = WorkflowGraph::new();
//! workflow.add_node(
//!     Node::new(
//!         NodeId::new("greet").unwrap(),
//!         NodeTypeName::new("constant").unwrap(),
//!         "Greeting",
//!     )
//!     .with_output(Port::new(PortId::new("text").unwrap(), "Text", DataType::String)),
//! );
//!
//! let mut registry = ProcessorRegistry::new();
//! registry.register_fn(NodeTypeName::new("constant").unwrap(), |_inputs, _node| async {
//!     let mut outputs = HashMap::new();
//!     outputs.insert(PortId::new("text").unwrap(), "hello".into());
//!     Ok(outputs)
//! });
//!
//! let results = workflow.execute(&registry).await?;
//! assert!(results[&NodeId::new("greet").unwrap()].is_success());
//! # Ok(())
//! # }
//! ```

pub mod executor;
pub mod registry;
mod scheduler;
pub mod store;
pub mod validator;

pub use registry::{NodeProcessor, ProcessorError, ProcessorRegistry};
pub use store::WorkflowGraph;
pub use validator::{ValidationFinding, ValidationReport};
