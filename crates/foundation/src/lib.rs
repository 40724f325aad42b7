//! Geographic and time primitives shared by every crate in the workspace.

pub mod bounds;
pub mod time;

pub use bounds::*;
pub use time::*;
