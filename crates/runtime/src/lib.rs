pub mod collector;
pub mod config;
pub mod driver;
pub mod scan;
pub mod tracking;

pub use collector::*;
pub use config::*;
pub use driver::*;
pub use scan::*;
pub use tracking::*;
