pub mod mode;
pub mod planner;
pub mod refresh;
pub mod state;

#[cfg(test)]
mod testing;

pub use mode::*;
pub use planner::*;
pub use refresh::*;
pub use state::*;
