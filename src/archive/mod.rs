pub mod blueprint;
pub mod diagnostics;
pub mod staging;

pub use blueprint::*;
pub use diagnostics::*;
pub use staging::*;
