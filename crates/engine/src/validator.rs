//! Static well-formedness checks: required inputs satisfied, no cycles.
//!
//! Validation is advisory — it never blocks mutations (structural type
//! checking already happens at connection time) and runs no processor. Call
//! it before `execute` to short-circuit obviously broken graphs without
//! paying execution cost.

use thiserror::Error;

use graph::{NodeId, PortId};

use crate::store::WorkflowGraph;

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFinding {
    /// A required input port has neither an incoming connection nor a
    /// declared default value.
    #[error("required input '{port}' on node '{node}' has no connection and no default value")]
    MissingRequiredInput {
        /// The node owning the unsatisfied port.
        node: NodeId,
        /// The unsatisfied input port.
        port: PortId,
    },

    /// The connection graph is not a DAG.
    #[error("cycle detected in workflow at node '{node}'")]
    CycleDetected {
        /// A node on the detected cycle.
        node: NodeId,
    },
}

/// Outcome of [`WorkflowGraph::validate`].
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// True iff no findings were produced.
    pub valid: bool,
    /// Every finding, in node iteration order (cycle finding last).
    pub errors: Vec<ValidationFinding>,
}

impl ValidationReport {
    /// Renders every finding as a human-readable message.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

impl WorkflowGraph {
    /// Checks structural well-formedness without executing anything.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();

        for node in self.nodes.values() {
            for port in node.inputs.iter().filter(|p| p.required) {
                let connected = self
                    .connections
                    .values()
                    .any(|c| c.target_node_id == node.id && c.target_port_id == port.id);
                if !connected && port.default_value.is_none() {
                    errors.push(ValidationFinding::MissingRequiredInput {
                        node: node.id.clone(),
                        port: port.id.clone(),
                    });
                }
            }
        }

        if let Err(node) = &self.order {
            errors.push(ValidationFinding::CycleDetected { node: node.clone() });
        }

        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }
}
