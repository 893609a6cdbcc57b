pub mod analysis;
pub mod bands;
pub mod format;
pub mod summary;

pub use analysis::*;
pub use bands::*;
pub use summary::*;
