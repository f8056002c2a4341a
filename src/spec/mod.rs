pub mod entity;
pub mod value;

pub use entity::*;
pub use value::*;
