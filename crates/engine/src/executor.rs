//! Execution: runs every node exactly once, in scheduler order, isolating
//! failures to the failing node.
//!
//! One processor is awaited at a time, in strict scheduler order, so a node's
//! processor is never invoked before every upstream node has a recorded
//! result ("completed" means recorded, not succeeded — the executor never
//! skips downstream of a failure; those nodes simply see absent inputs).

use std::collections::HashMap;

use tracing::{debug, warn};

use graph::{ExecutionResult, GraphError, Node, NodeId, PortValues};

use crate::registry::ProcessorRegistry;
use crate::store::WorkflowGraph;

impl WorkflowGraph {
    /// Runs the whole graph, producing one [`ExecutionResult`] per node.
    ///
    /// If the connection graph is not a DAG the call rejects with
    /// [`GraphError::CycleDetected`] and produces no results at all. Any
    /// other failure — missing processor, processor error, input validation
    /// failure — is recorded in that node's result (and in the node's
    /// transient `error` field) and execution continues.
    pub async fn execute(
        &mut self,
        registry: &ProcessorRegistry,
    ) -> Result<HashMap<NodeId, ExecutionResult>, GraphError> {
        let order = self.execution_order()?.to_vec();
        debug!(nodes = order.len(), "executing workflow");

        let mut results: HashMap<NodeId, ExecutionResult> = HashMap::with_capacity(order.len());
        for node_id in order {
            // The order is recomputed on every mutation, so every scheduled
            // node exists.
            let Some(node) = self.nodes.get(&node_id) else {
                continue;
            };
            let node = node.clone();

            if let Some(live) = self.nodes.get_mut(&node_id) {
                live.is_processing = true;
                live.error = None;
            }

            let outcome = self.run_node(&node, &results, registry).await;

            let result = match outcome {
                Ok(outputs) => {
                    debug!(node = %node_id, outputs = outputs.len(), "node completed");
                    ExecutionResult::success(node_id.clone(), outputs)
                }
                Err(message) => {
                    warn!(node = %node_id, error = %message, "node failed");
                    ExecutionResult::failure(node_id.clone(), message)
                }
            };

            if let Some(live) = self.nodes.get_mut(&node_id) {
                live.is_processing = false;
                live.error = result.error.clone();
            }
            results.insert(node_id, result);
        }

        Ok(results)
    }

    /// Gathers one node's inputs and invokes its processor.
    ///
    /// Returns the produced outputs, or the failure message to record.
    async fn run_node(
        &self,
        node: &Node,
        results: &HashMap<NodeId, ExecutionResult>,
        registry: &ProcessorRegistry,
    ) -> Result<PortValues, String> {
        let inputs = self.gather_inputs(node, results)?;

        let Some(processor) = registry.get(&node.node_type) else {
            return Err(format!(
                "no processor registered for node type '{}'",
                node.node_type
            ));
        };

        processor
            .process(inputs, node)
            .await
            .map_err(|e| e.to_string())
    }

    /// Collects values for a node's input ports.
    ///
    /// Each input port reads the already-recorded output of its single
    /// incoming connection's source node. A port with no connection, or whose
    /// upstream produced nothing (e.g. the upstream failed), falls back to
    /// its declared default; otherwise it is simply absent and the processor
    /// applies its own required-input policy.
    fn gather_inputs(
        &self,
        node: &Node,
        results: &HashMap<NodeId, ExecutionResult>,
    ) -> Result<PortValues, String> {
        let mut inputs = PortValues::new();
        for port in &node.inputs {
            let connected = self
                .connections
                .values()
                .find(|c| c.target_node_id == node.id && c.target_port_id == port.id);

            let value = match connected {
                Some(conn) => results
                    .get(&conn.source_node_id)
                    .and_then(|r| r.outputs.get(&conn.source_port_id))
                    .cloned()
                    .or_else(|| port.default_value.clone()),
                None => port.default_value.clone(),
            };

            if let Some(value) = value {
                if let Some(validator) = &port.validator {
                    if !validator(&value) {
                        return Err(format!(
                            "validation failed for input port '{}'",
                            port.id
                        ));
                    }
                }
                inputs.insert(port.id.clone(), value);
            }
        }
        Ok(inputs)
    }
}
