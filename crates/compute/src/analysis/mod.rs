pub mod statistics;
pub mod trend;

pub use statistics::*;
pub use trend::*;
