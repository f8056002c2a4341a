//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the topospec crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use topospec::prelude::*;
//! use std::sync::Arc;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/topology.json")?;
//! let topology = TopologyDocument::from_json(&json)?.into_topology()?;
//!
//! let app = Transformer::builder(&topology, Arc::new(DeclaredAttributeResolver))
//!     .build()
//!     .transform()?;
//! println!("{}", serde_json::to_string_pretty(&app.root.to_json())?);
//! # Ok(())
//! # }
//! ```

// Transformation
pub use crate::transformer::{
    AttributeBinder, PolicyDecorator, SpecFactory, SpecModifier, TransformedApplication,
    Transformer,
};

// Runtime model
pub use crate::spec::{Decoration, EntitySpec, Initializer, PLAN_ID, PolicySpec, Value};

// Topology model
pub use crate::topology::{
    IntoTopology, PolicyDefinition, PolicyTarget, Relationship, Topology, TopologyDocument,
    TopologyNode,
};

// Lookups and collaborators
pub use crate::facade::{
    ApplicationContext, ArchiveService, AttributeResolver, DeclaredAttributeResolver,
    ResolvedAttributeMap, TopologyLookup,
};
pub use crate::resolve::{config_equals, find_child_by_plan_id};

// Platform
pub use crate::archive::{Blueprint, ParseDiagnostic, ParseLevel, ParsingResult};
pub use crate::catalog::InMemoryCatalog;
pub use crate::platform::{ActingIdentity, BundleMember, Platform, Role};

// Error types
pub use crate::error::{
    ArtifactError, AttributeResolutionError, ConversionError, TransformError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
