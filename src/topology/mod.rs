pub mod conversion;
pub mod definition;
pub mod document;
pub mod policy;

pub use conversion::*;
pub use definition::*;
pub use document::TopologyDocument;
pub use policy::*;
