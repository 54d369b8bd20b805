//! Structural error taxonomy for the workflow graph.
//!
//! [`GraphError`] covers conditions that reject a mutation or abort an
//! execution as a whole. Per-node execution failures (missing processor,
//! processor errors, input validation failures) are deliberately *not* here:
//! they are captured as strings in the failing node's
//! [`crate::ExecutionResult`] so one bad node never aborts the run.

use crate::identifiers::{ConnectionId, NodeId, PortId};
use crate::types::{DataType, PortDirection};

/// Errors raised by graph mutations and by scheduling.
///
/// Reference and type errors are raised synchronously at `add_connection`
/// time and leave the graph unchanged; [`GraphError::CycleDetected`] is the
/// only error fatal to an `execute` call as a whole.
///
/// `Display` and `Error` are implemented by hand rather than derived with
/// `thiserror`: the spec fixes the `TypeMismatch` field name `source`, which
/// `thiserror` would otherwise hijack as the chained error source.
#[derive(Debug)]
pub enum GraphError {
    /// A connection names a node that does not exist in the graph.
    UnknownNode {
        /// The offending connection.
        connection: ConnectionId,
        /// The missing node.
        node: NodeId,
    },

    /// A connection names a port its endpoint node does not declare in the
    /// required direction (output on the source, input on the target).
    UnknownPort {
        /// The endpoint node.
        node: NodeId,
        /// The missing port.
        port: PortId,
        /// Direction the port was looked up in.
        direction: PortDirection,
    },

    /// A connection's endpoint ports carry different data types, or the
    /// connection's own tag disagrees with its ports.
    TypeMismatch {
        /// The offending connection.
        connection: ConnectionId,
        /// Data type on the source side.
        source: DataType,
        /// Data type on the target side.
        target: DataType,
    },

    /// The target input port already has an incoming connection.
    ///
    /// Input ports accept at most one wire; replace the existing connection
    /// (same id) or remove it first.
    InputPortOccupied {
        /// The target node.
        node: NodeId,
        /// The occupied input port.
        port: PortId,
    },

    /// The connection graph is not a DAG; no execution order exists.
    CycleDetected {
        /// A node on the detected cycle.
        node: NodeId,
    },

    /// A serialised graph could not be parsed.
    Snapshot(serde_json::Error),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNode { connection, node } => {
                write!(f, "connection '{connection}' references unknown node '{node}'")
            }
            Self::UnknownPort { node, port, direction } => {
                write!(f, "node '{node}' has no {direction} port '{port}'")
            }
            Self::TypeMismatch { connection, source, target } => {
                write!(f, "data type mismatch on connection '{connection}': {source} -> {target}")
            }
            Self::InputPortOccupied { node, port } => {
                write!(f, "input port '{port}' on node '{node}' already has an incoming connection")
            }
            Self::CycleDetected { node } => {
                write!(f, "cycle detected in workflow at node '{node}'")
            }
            Self::Snapshot(err) => write!(f, "invalid workflow snapshot: {err}"),
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::Snapshot(err)
    }
}
