//! Newtype domain identifiers.
//!
//! Every graph concept that has an identity is represented as a distinct newtype
//! wrapping a `String`. This prevents accidentally interchanging — for example —
//! a [`NodeId`] with a [`PortId`] even though both are strings under the hood.
//!
//! Identifiers are caller-supplied (a visual editor typically derives them from
//! user actions); the only generated identifier is [`ConnectionId::generate`],
//! used when a connection is created without an explicit id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Identifies a node within a workflow graph.
    ///
    /// Node ids are globally unique within one graph; inserting a node with an
    /// id already in use replaces the existing node (upsert semantics).
    NodeId
}

string_id! {
    /// Identifies a port on a node.
    ///
    /// Port ids are unique per node and direction: a node may not declare two
    /// input ports (or two output ports) with the same id, but an input and an
    /// output port may share one.
    PortId
}

string_id! {
    /// Identifies a connection between two ports.
    ///
    /// Either supplied by the caller (e.g. an editor that wants stable wire
    /// ids) or generated via [`ConnectionId::generate`].
    ConnectionId
}

string_id! {
    /// Identifies a node *type* — the key under which a processor is
    /// registered in the processor registry.
    NodeTypeName
}

impl ConnectionId {
    /// Generates a fresh random connection identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identifier_is_rejected() {
        assert!(NodeId::new("").is_none());
        assert!(PortId::new("").is_none());
        assert!(ConnectionId::new("").is_none());
        assert!(NodeTypeName::new("").is_none());
    }

    #[test]
    fn identifier_round_trips_through_display() {
        let id = NodeId::new("resize-image").unwrap();
        assert_eq!(id.as_str(), "resize-image");
        assert_eq!(id.to_string(), "resize-image");
    }

    #[test]
    fn generated_connection_ids_are_distinct() {
        assert_ne!(ConnectionId::generate(), ConnectionId::generate());
    }
}
