//! Dataset renderers.
//!
//! Each renderer checks its target element before touching the network,
//! re-checks its navigation token after every fetch, and reports what
//! happened as an [`Outcome`](crate::outcome::Outcome). None of them can
//! fail a navigation.

pub mod countries;
pub mod proportion;
pub mod time_series;

pub use countries::CountrySelection;
pub use proportion::doughnut_chart;
pub use time_series::line_chart;
