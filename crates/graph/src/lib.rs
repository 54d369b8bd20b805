//! Domain model for the FlowGraph typed data-flow workflow engine.
//!
//! This crate contains every graph concept, newtype identifier, shared value
//! type, event, and structural error used by the engine. It performs no I/O
//! and runs nothing; the `engine` crate owns the store, scheduler, executor,
//! and validator that operate on these types.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`NodeId`, `PortId`, `ConnectionId`, `NodeTypeName`) |
//! | [`types`] | `Port`, `Node`, `Connection`, `ExecutionResult`, `GraphSnapshot` |
//! | [`errors`] | Structural error taxonomy (`GraphError`) |
//! | [`events`] | Structural-change notifications (`GraphEvent`, `GraphObserver`) |

pub mod errors;
pub mod events;
pub mod identifiers;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::GraphError;
pub use events::{GraphEvent, GraphObserver};
pub use identifiers::{ConnectionId, NodeId, NodeTypeName, PortId};
pub use types::{
    Connection, DataType, ExecutionResult, GraphSnapshot, Node, Port, PortDirection, PortValidator,
    PortValues, Position,
};
