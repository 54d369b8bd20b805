//! Shared value types for the workflow graph domain.
//!
//! These are the entities the graph store owns: [`Port`], [`Node`],
//! [`Connection`], plus the per-node [`ExecutionResult`] produced by the
//! engine and the [`GraphSnapshot`] serialisation form.
//!
//! Serde renames follow the wire format used by graph editors: struct fields
//! are `camelCase`, [`DataType`] tags are lowercase words.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identifiers::{ConnectionId, NodeId, NodeTypeName, PortId};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// The type tag carried by every port and connection.
///
/// A connection is only accepted when its source port, target port, and the
/// connection itself all carry the same tag. The tag set covers plain JSON
/// shapes plus the media and ML artefact kinds that flow through AI-oriented
/// pipelines; [`DataType::Custom`] is the escape hatch for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Image,
    Audio,
    Video,
    Model,
    Embedding,
    Tensor,
    Prompt,
    Completion,
    File,
    Directory,
    Custom,
}

impl DataType {
    /// Returns the lowercase wire tag for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Array => "array",
            DataType::Object => "object",
            DataType::Image => "image",
            DataType::Audio => "audio",
            DataType::Video => "video",
            DataType::Model => "model",
            DataType::Embedding => "embedding",
            DataType::Tensor => "tensor",
            DataType::Prompt => "prompt",
            DataType::Completion => "completion",
            DataType::File => "file",
            DataType::Directory => "directory",
            DataType::Custom => "custom",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a port consumes values (input) or produces them (output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

impl std::fmt::Display for PortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortDirection::Input => write!(f, "input"),
            PortDirection::Output => write!(f, "output"),
        }
    }
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Runtime check applied to a value arriving at a port.
///
/// Predicates are process-local (they cannot be serialised) and are applied by
/// the executor when gathering a node's inputs; a failing predicate fails that
/// node only.
pub type PortValidator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A typed input or output slot on a node.
///
/// Port ids are unique within a node and direction; the data type is fixed
/// after creation.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    /// Port identifier, unique within the owning node and direction.
    pub id: PortId,

    /// Human-readable port name.
    pub name: String,

    /// Type tag of values flowing through this port.
    pub data_type: DataType,

    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// For input ports: whether a value must be available (via a connection or
    /// a default) for the graph to validate. Ignored on output ports.
    #[serde(default)]
    pub required: bool,

    /// Fallback value used when an input port has no incoming connection, or
    /// its upstream node produced nothing for the connected output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// Optional runtime validation predicate. Never serialised; a snapshot
    /// loaded from JSON carries no predicates.
    #[serde(skip)]
    pub validator: Option<PortValidator>,
}

impl Port {
    /// Creates a port with the given id, display name, and data type.
    pub fn new(id: PortId, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id,
            name: name.into(),
            data_type,
            description: None,
            required: false,
            default_value: None,
            validator: None,
        }
    }

    /// Marks this port as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value used when no connected value is available.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Attaches a runtime validation predicate.
    pub fn with_validator<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(predicate));
        self
    }
}

impl std::fmt::Debug for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Port")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("default_value", &self.default_value)
            .field("validator", &self.validator.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// Canvas coordinates for a node.
///
/// Opaque layout metadata: the engine passes it through unmodified; only a
/// rendering layer interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A unit of computation: named, typed input and output ports plus an opaque
/// data payload.
///
/// The `node_type` field is the key under which the node's processor is
/// registered; a node whose type has no registered processor fails at
/// execution time without aborting the run.
///
/// `is_processing` and `error` are transient execution status for inspection
/// by callers (e.g. a UI); they are reset whenever a snapshot is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Globally unique node identifier.
    pub id: NodeId,

    /// Processor registry key for this node.
    #[serde(rename = "type")]
    pub node_type: NodeTypeName,

    /// Human-readable node name.
    pub name: String,

    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional palette/grouping category for editors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Input ports, in declaration order.
    #[serde(default)]
    pub inputs: Vec<Port>,

    /// Output ports, in declaration order.
    #[serde(default)]
    pub outputs: Vec<Port>,

    /// Canvas position (layout metadata, engine-opaque).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    /// Opaque per-node payload (e.g. editor-configured parameters). Passed to
    /// the processor unmodified as part of the node declaration.
    #[serde(default)]
    pub data: Map<String, Value>,

    /// Opaque auxiliary metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,

    /// True while this node's processor invocation is in flight.
    #[serde(default)]
    pub is_processing: bool,

    /// Message of the most recent execution failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Node {
    /// Creates a node with no ports and an empty payload.
    pub fn new(id: NodeId, node_type: NodeTypeName, name: impl Into<String>) -> Self {
        Self {
            id,
            node_type,
            name: name.into(),
            description: None,
            category: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            position: None,
            data: Map::new(),
            metadata: Map::new(),
            is_processing: false,
            error: None,
        }
    }

    /// Appends an input port.
    pub fn with_input(mut self, port: Port) -> Self {
        self.inputs.push(port);
        self
    }

    /// Appends an output port.
    pub fn with_output(mut self, port: Port) -> Self {
        self.outputs.push(port);
        self
    }

    /// Sets the canvas position.
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position { x, y });
        self
    }

    /// Sets a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Looks up an input port by id.
    pub fn input(&self, port: &PortId) -> Option<&Port> {
        self.inputs.iter().find(|p| &p.id == port)
    }

    /// Looks up an output port by id.
    pub fn output(&self, port: &PortId) -> Option<&Port> {
        self.outputs.iter().find(|p| &p.id == port)
    }

    /// Clears transient execution status (`is_processing`, `error`).
    pub fn reset_status(&mut self) {
        self.is_processing = false;
        self.error = None;
    }
}

// ---------------------------------------------------------------------------
// Connections
// ---------------------------------------------------------------------------

/// A typed wire from one node's output port to another node's input port.
///
/// Connections reference their endpoints by id only; the store validates
/// endpoint existence and type agreement at insertion time and cascades
/// deletion when either endpoint node is removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Connection identifier (caller-supplied or generated).
    pub id: ConnectionId,

    /// Node owning the source (output) port.
    pub source_node_id: NodeId,

    /// Output port on the source node.
    pub source_port_id: PortId,

    /// Node owning the target (input) port.
    pub target_node_id: NodeId,

    /// Input port on the target node.
    pub target_port_id: PortId,

    /// Type tag; must equal both endpoint ports' data types.
    pub data_type: DataType,
}

impl Connection {
    /// Creates a connection with a generated id.
    pub fn new(
        source_node_id: NodeId,
        source_port_id: PortId,
        target_node_id: NodeId,
        target_port_id: PortId,
        data_type: DataType,
    ) -> Self {
        Self {
            id: ConnectionId::generate(),
            source_node_id,
            source_port_id,
            target_node_id,
            target_port_id,
            data_type,
        }
    }

    /// Replaces the generated id with an explicit one.
    pub fn with_id(mut self, id: ConnectionId) -> Self {
        self.id = id;
        self
    }

    /// Returns `true` if this connection touches the given node on either end.
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source_node_id == node || &self.target_node_id == node
    }
}

// ---------------------------------------------------------------------------
// Execution results
// ---------------------------------------------------------------------------

/// Values keyed by port id, as consumed and produced by processors.
pub type PortValues = HashMap<PortId, Value>;

/// Outcome of running one node.
///
/// After an execution completes, one result exists for every node in the
/// graph — failed nodes included (empty outputs, non-empty error).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// The node this result belongs to.
    pub node_id: NodeId,

    /// Values produced per output port. Empty on failure.
    pub outputs: PortValues,

    /// Failure message, if the node's processor was missing or failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Builds a successful result.
    pub fn success(node_id: NodeId, outputs: PortValues) -> Self {
        Self {
            node_id,
            outputs,
            error: None,
        }
    }

    /// Builds a failed result (empty outputs).
    pub fn failure(node_id: NodeId, error: impl Into<String>) -> Self {
        Self {
            node_id,
            outputs: PortValues::new(),
            error: Some(error.into()),
        }
    }

    /// Returns `true` if the node completed without error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

// ---------------------------------------------------------------------------
// Serialisation snapshot
// ---------------------------------------------------------------------------

/// Serialisable form of a whole graph: every node, then every connection.
///
/// Loading a snapshot replays it through the normal validated mutation path,
/// so a corrupt or type-mismatched serialised connection is rejected exactly
/// as it would be via the live API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
}
