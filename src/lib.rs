//! # topospec - Topology to Entity-Spec Transformation Engine
//!
//! **topospec** turns a declarative application topology (nodes, relationships,
//! policies and attributes) into a tree of runtime entity specs that an
//! orchestrator can deploy. It resolves cross-references between nodes by plan
//! id, binds computed attributes onto specs as static values, and attaches
//! policies to the whole application or to groups of member specs.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic. It operates on a canonical `Topology` model,
//! and the primary workflow is:
//!
//! 1.  **Load Your Topology**: Parse your document format into your own Rust structs
//!     (or use the bundled JSON [`TopologyDocument`](topology::TopologyDocument)).
//! 2.  **Convert**: Implement `IntoTopology` for your structs to hand them over in canonical form.
//! 3.  **Transform**: Use `Transformer::builder` with an `AttributeResolver`. The
//!     transformer builds one spec per node, binds attributes, then decorates
//!     policy targets.
//! 4.  **Deploy**: Hand the resulting `EntitySpec` tree (or a persisted `Blueprint`)
//!     to your deployment subsystem.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use topospec::prelude::*;
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let topology = Topology {
//!         name: "shop".to_string(),
//!         version: "1.0.0".to_string(),
//!         nodes: vec![
//!             TopologyNode {
//!                 plan_id: "n1".to_string(),
//!                 name: "web".to_string(),
//!                 node_type: "tosca.nodes.WebServer".to_string(),
//!                 ..Default::default()
//!             },
//!             TopologyNode {
//!                 plan_id: "n2".to_string(),
//!                 name: "db".to_string(),
//!                 node_type: "tosca.nodes.Database".to_string(),
//!                 ..Default::default()
//!             },
//!         ],
//!         relationships: vec![],
//!         policies: vec![PolicyDefinition {
//!             name: "ha".to_string(),
//!             policy_type: Some("ha.policy".to_string()),
//!             properties: BTreeMap::from([("threshold".to_string(), Value::Int(3))]),
//!             target: PolicyTarget::from_members(["n1"]),
//!         }],
//!     };
//!
//!     let app = Transformer::builder(&topology, Arc::new(DeclaredAttributeResolver))
//!         .with_type_mapping("tosca.nodes.WebServer", "org.example.WebApp")
//!         .build()
//!         .transform()?;
//!
//!     for child in app.root.children() {
//!         println!("{} has {} policies", child, child.policies().count());
//!     }
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod catalog;
pub mod error;
pub mod facade;
pub mod platform;
pub mod prelude;
pub mod resolve;
pub mod spec;
pub mod topology;
pub mod transformer;
