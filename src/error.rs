use crate::archive::ParseDiagnostic;
use itertools::Itertools;
use thiserror::Error;

/// Errors that can occur while turning a topology into an entity-spec tree.
#[derive(Error, Debug, Clone)]
pub enum TransformError {
    #[error(
        "Node template(s) '{}' requested by {requested_by} not found among the application children",
        .missing.iter().join("', '")
    )]
    TargetNotFound {
        missing: Vec<String>,
        requested_by: String,
    },

    #[error("Type was not found for policy '{policy}'")]
    MissingPolicyType { policy: String },

    #[error("Policy '{policy}' produced a malformed policy definition: {message}")]
    MalformedPolicyPayload { policy: String, message: String },

    #[error(
        "Node '{missing_node_id}' not found, which is required by a relationship from node '{source_node_id}'"
    )]
    NodeNotFound {
        missing_node_id: String,
        source_node_id: String,
    },

    #[error("Plan id '{0}' is used by more than one node of the topology")]
    DuplicatePlanId(String),

    #[error(
        "Could not parse {archive}:\n  {}",
        .diagnostics.iter().join("\n  ")
    )]
    ParseDiagnostic {
        archive: String,
        diagnostics: Vec<ParseDiagnostic>,
    },

    #[error("Topology '{0}' is not registered")]
    TopologyNotFound(String),

    #[error("Actor '{actor}' is not allowed to {operation}")]
    PermissionDenied { actor: String, operation: String },

    #[error("Failed to stage archive '{archive}': {message}")]
    Staging { archive: String, message: String },

    #[error(transparent)]
    AttributeResolution(#[from] AttributeResolutionError),
}

/// Errors raised by an attribute resolver while computing the attributes of a node.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributeResolutionError {
    #[error("Node '{0}' is not part of the topology")]
    UnknownNode(String),

    #[error("Node '{node_id}' declares no property named '{property}'")]
    UnknownProperty { node_id: String, property: String },

    #[error("Node '{node_id}' declares no attribute named '{attribute}'")]
    UnknownAttribute { node_id: String, attribute: String },

    #[error("Invalid '{function}' expression on node '{node_id}': {message}")]
    InvalidExpression {
        node_id: String,
        function: String,
        message: String,
    },

    #[error("Attribute '{attribute}' of node '{node_id}' references itself")]
    CyclicReference { node_id: String, attribute: String },

    #[error("Attribute resolution failed: {0}")]
    Generic(String),
}

/// Errors that can occur when persisting or loading a blueprint.
#[derive(Error, Debug, Clone)]
pub enum ArtifactError {
    #[error("Blueprint serialization failed: {0}")]
    Encode(String),

    #[error("Blueprint deserialization failed: {0}")]
    Decode(String),

    #[error("Blueprint I/O failed for '{path}': {message}")]
    Io { path: String, message: String },
}

/// Errors that can occur when converting a custom document format into a `Topology`.
#[derive(Error, Debug, Clone)]
pub enum ConversionError {
    #[error("Failed to parse topology document: {0}")]
    Parse(String),

    #[error("Invalid topology document: {0}")]
    Validation(String),
}
