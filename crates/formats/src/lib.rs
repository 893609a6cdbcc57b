pub mod age_groups;
pub mod coordinate_table;
pub mod country;
pub mod error;
pub mod screen_use;
pub mod series;

pub use age_groups::*;
pub use coordinate_table::*;
pub use country::*;
pub use error::*;
pub use screen_use::*;
pub use series::*;
