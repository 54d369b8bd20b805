//! The graph store: authoritative in-memory representation of one workflow
//! graph.
//!
//! All structural mutation goes through [`WorkflowGraph`]. Mutations validate
//! before inserting, recompute the cached execution order eagerly, and notify
//! registered observers afterwards, so the graph is never observable in an
//! invalid structural state and the cached order is always consistent with
//! the current connections.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use graph::{
    Connection, ConnectionId, GraphError, GraphEvent, GraphObserver, GraphSnapshot, Node, NodeId,
    PortDirection, Position,
};

use crate::scheduler;

/// A caller-owned workflow graph: nodes, connections, cached execution order,
/// and registered observers.
///
/// Nodes and connections are held in insertion-ordered maps; insertion order
/// is the tie-break for the execution order of mutually independent nodes.
/// Connections reference their endpoints by id only, so removal never chases
/// pointers: it is a map deletion plus cascading id-based cleanup.
pub struct WorkflowGraph {
    pub(crate) nodes: IndexMap<NodeId, Node>,
    pub(crate) connections: IndexMap<ConnectionId, Connection>,
    /// Cached execution order, or the node that closed a cycle.
    pub(crate) order: Result<Vec<NodeId>, NodeId>,
    observers: Vec<Arc<dyn GraphObserver>>,
}

impl Default for WorkflowGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            order: Ok(Vec::new()),
            observers: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Registers an observer for structural-change notifications.
    pub fn subscribe(&mut self, observer: Arc<dyn GraphObserver>) {
        self.observers.push(observer);
    }

    fn notify(&self, event: GraphEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    // -----------------------------------------------------------------------
    // Node mutation
    // -----------------------------------------------------------------------

    /// Inserts a node, keyed by its id.
    ///
    /// Upsert semantics: a node with an id already in use replaces the
    /// existing node (existing connections to it are kept; they were
    /// validated against the old port set, so replace ports with care).
    pub fn add_node(&mut self, node: Node) {
        debug!(node = %node.id, node_type = %node.node_type, "node added");
        let event = GraphEvent::NodeAdded(node.clone());
        self.nodes.insert(node.id.clone(), node);
        self.recompute_order();
        self.notify(event);
    }

    /// Removes a node and every connection whose source or target references
    /// it. No-op if the node is absent; removing the same id twice has the
    /// same graph-state effect as removing it once.
    pub fn remove_node(&mut self, node_id: &NodeId) {
        let Some(node) = self.nodes.shift_remove(node_id) else {
            return;
        };

        let cascaded: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.touches(node_id))
            .map(|c| c.id.clone())
            .collect();
        let mut removed = Vec::with_capacity(cascaded.len());
        for id in &cascaded {
            if let Some(conn) = self.connections.shift_remove(id) {
                removed.push(conn);
            }
        }

        debug!(node = %node_id, cascaded = removed.len(), "node removed");
        self.recompute_order();
        for conn in removed {
            self.notify(GraphEvent::ConnectionRemoved(conn));
        }
        self.notify(GraphEvent::NodeRemoved(node));
    }

    /// Updates a node's canvas position.
    ///
    /// Position is opaque layout metadata; this is not a structural change
    /// and does not touch the execution order. No-op if the node is absent.
    pub fn update_node_position(&mut self, node_id: &NodeId, position: Position) {
        let Some(node) = self.nodes.get_mut(node_id) else {
            return;
        };
        node.position = Some(position);
        let event = GraphEvent::NodeUpdated(node.clone());
        self.notify(event);
    }

    // -----------------------------------------------------------------------
    // Connection mutation
    // -----------------------------------------------------------------------

    /// Inserts a connection after validating it.
    ///
    /// Rejected (graph unchanged) when:
    /// - either endpoint node is missing ([`GraphError::UnknownNode`]);
    /// - the source node has no such output port, or the target node no such
    ///   input port ([`GraphError::UnknownPort`]);
    /// - the two ports, or the connection's own tag, disagree on data type
    ///   ([`GraphError::TypeMismatch`]);
    /// - the target input port already has a different incoming connection
    ///   ([`GraphError::InputPortOccupied`]).
    ///
    /// A connection with an id already in use replaces the existing
    /// connection (upsert, matching node semantics).
    pub fn add_connection(&mut self, connection: Connection) -> Result<(), GraphError> {
        let source_node =
            self.nodes
                .get(&connection.source_node_id)
                .ok_or_else(|| GraphError::UnknownNode {
                    connection: connection.id.clone(),
                    node: connection.source_node_id.clone(),
                })?;
        let target_node =
            self.nodes
                .get(&connection.target_node_id)
                .ok_or_else(|| GraphError::UnknownNode {
                    connection: connection.id.clone(),
                    node: connection.target_node_id.clone(),
                })?;

        let source_port =
            source_node
                .output(&connection.source_port_id)
                .ok_or_else(|| GraphError::UnknownPort {
                    node: source_node.id.clone(),
                    port: connection.source_port_id.clone(),
                    direction: PortDirection::Output,
                })?;
        let target_port =
            target_node
                .input(&connection.target_port_id)
                .ok_or_else(|| GraphError::UnknownPort {
                    node: target_node.id.clone(),
                    port: connection.target_port_id.clone(),
                    direction: PortDirection::Input,
                })?;

        if source_port.data_type != target_port.data_type {
            return Err(GraphError::TypeMismatch {
                connection: connection.id.clone(),
                source: source_port.data_type,
                target: target_port.data_type,
            });
        }
        if connection.data_type != source_port.data_type {
            return Err(GraphError::TypeMismatch {
                connection: connection.id.clone(),
                source: source_port.data_type,
                target: connection.data_type,
            });
        }

        // At most one wire per input port. A connection replacing itself
        // (same id) is not an occupancy conflict.
        let occupied = self.connections.values().any(|c| {
            c.id != connection.id
                && c.target_node_id == connection.target_node_id
                && c.target_port_id == connection.target_port_id
        });
        if occupied {
            return Err(GraphError::InputPortOccupied {
                node: connection.target_node_id.clone(),
                port: connection.target_port_id.clone(),
            });
        }

        debug!(
            connection = %connection.id,
            source = %connection.source_node_id,
            target = %connection.target_node_id,
            "connection added"
        );
        let event = GraphEvent::ConnectionAdded(connection.clone());
        self.connections.insert(connection.id.clone(), connection);
        self.recompute_order();
        self.notify(event);
        Ok(())
    }

    /// Removes a connection if present; no-op otherwise.
    pub fn remove_connection(&mut self, connection_id: &ConnectionId) {
        let Some(conn) = self.connections.shift_remove(connection_id) else {
            return;
        };
        debug!(connection = %connection_id, "connection removed");
        self.recompute_order();
        self.notify(GraphEvent::ConnectionRemoved(conn));
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Looks up a node by id.
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Iterates nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Iterates connections in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of connections in the graph.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Connections whose target is the given node.
    pub fn get_input_connections(&self, node_id: &NodeId) -> Vec<&Connection> {
        self.connections
            .values()
            .filter(|c| &c.target_node_id == node_id)
            .collect()
    }

    /// Connections whose source is the given node.
    pub fn get_output_connections(&self, node_id: &NodeId) -> Vec<&Connection> {
        self.connections
            .values()
            .filter(|c| &c.source_node_id == node_id)
            .collect()
    }

    /// The current execution order, or [`GraphError::CycleDetected`] if the
    /// connection graph is not a DAG.
    pub fn execution_order(&self) -> Result<&[NodeId], GraphError> {
        match &self.order {
            Ok(order) => Ok(order),
            Err(node) => Err(GraphError::CycleDetected { node: node.clone() }),
        }
    }

    fn recompute_order(&mut self) {
        self.order = scheduler::topological_order(&self.nodes, &self.connections);
    }

    // -----------------------------------------------------------------------
    // Serialisation
    // -----------------------------------------------------------------------

    /// Captures the graph as a serialisable snapshot.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.values().cloned().collect(),
            connections: self.connections.values().cloned().collect(),
        }
    }

    /// Serialises the graph to a JSON string.
    pub fn to_json(&self) -> Result<String, GraphError> {
        serde_json::to_string(&self.snapshot()).map_err(GraphError::from)
    }

    /// Clears the graph and replays a snapshot through the normal validated
    /// mutation path: every node first, then every connection.
    ///
    /// A corrupt or type-mismatched serialised connection is rejected exactly
    /// as it would be via the live API; on error the graph holds whatever was
    /// loaded before the offending entry. Transient node status is reset.
    pub fn load_snapshot(&mut self, snapshot: GraphSnapshot) -> Result<(), GraphError> {
        self.clear();
        for mut node in snapshot.nodes {
            node.reset_status();
            self.add_node(node);
        }
        for connection in snapshot.connections {
            self.add_connection(connection)?;
        }
        Ok(())
    }

    /// Parses a JSON string produced by [`WorkflowGraph::to_json`] and loads
    /// it via [`WorkflowGraph::load_snapshot`].
    pub fn from_json(&mut self, json: &str) -> Result<(), GraphError> {
        let snapshot: GraphSnapshot = serde_json::from_str(json)?;
        self.load_snapshot(snapshot)
    }

    /// Removes every node and connection. Observers are kept; no events fire.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.order = Ok(Vec::new());
    }
}
