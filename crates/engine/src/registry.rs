//! Processor registry: maps a node's declared type to the callable that
//! transforms its named inputs into named outputs.
//!
//! The registry is read-only during execution — the executor borrows it
//! immutably, so no processor can be registered mid-run.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use graph::{Node, NodeTypeName, PortId, PortValues};

/// Failure surfaced by a processor's own logic.
///
/// Recorded as the failing node's execution error; never aborts the run.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// An input the processor needs was absent from the gathered values.
    #[error("missing input '{port}'")]
    MissingInput {
        /// The absent input port.
        port: PortId,
    },

    /// An input was present but unusable.
    #[error("invalid input '{port}': {reason}")]
    InvalidInput {
        /// The offending input port.
        port: PortId,
        /// What was wrong with the value.
        reason: String,
    },

    /// Any other processor failure.
    #[error("{0}")]
    Failed(String),
}

impl ProcessorError {
    /// Builds a [`ProcessorError::Failed`] from any message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// A unit of computation behind a node type.
///
/// Receives the gathered input values (one entry per connected or defaulted
/// input port; unconnected ports are simply absent) and the node declaration,
/// and produces values keyed by output port id.
#[async_trait]
pub trait NodeProcessor: Send + Sync {
    async fn process(&self, inputs: PortValues, node: &Node) -> Result<PortValues, ProcessorError>;
}

/// Adapter so plain async closures can act as processors.
struct FnProcessor<F>(F);

#[async_trait]
impl<F, Fut> NodeProcessor for FnProcessor<F>
where
    F: Fn(PortValues, Node) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PortValues, ProcessorError>> + Send + 'static,
{
    async fn process(&self, inputs: PortValues, node: &Node) -> Result<PortValues, ProcessorError> {
        (self.0)(inputs, node.clone()).await
    }
}

/// Maps node types to their processors.
#[derive(Default)]
pub struct ProcessorRegistry {
    processors: HashMap<NodeTypeName, Arc<dyn NodeProcessor>>,
}

impl ProcessorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a processor for a node type, replacing any previous one.
    pub fn register(&mut self, node_type: NodeTypeName, processor: Arc<dyn NodeProcessor>) {
        self.processors.insert(node_type, processor);
    }

    /// Registers an async closure as the processor for a node type.
    ///
    /// The closure receives the gathered inputs and a clone of the node
    /// declaration.
    pub fn register_fn<F, Fut>(&mut self, node_type: NodeTypeName, f: F)
    where
        F: Fn(PortValues, Node) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PortValues, ProcessorError>> + Send + 'static,
    {
        self.register(node_type, Arc::new(FnProcessor(f)));
    }

    /// Looks up the processor for a node type.
    pub fn get(&self, node_type: &NodeTypeName) -> Option<&Arc<dyn NodeProcessor>> {
        self.processors.get(node_type)
    }

    /// Returns `true` if a processor is registered for the node type.
    pub fn contains(&self, node_type: &NodeTypeName) -> bool {
        self.processors.contains_key(node_type)
    }
}
