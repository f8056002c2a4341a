//! Lookups over an entity-spec tree.

pub mod identity;
pub mod predicate;

pub use identity::*;
pub use predicate::*;
