//! Platform-neutral core of the wellbeing atlas dashboard.
//!
//! Front ends supply a [`Fetcher`], a [`Document`], a [`MapBackend`] and a
//! [`ChartBackend`]; everything else (routing, widget lifecycles, coordinate
//! resolution, summaries) lives here and runs the same in tests.

pub mod charts;
pub mod config;
pub mod coords;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod html;
pub mod map;
pub mod outcome;
pub mod render;
pub mod route;
pub mod surface;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use charts::{ChartBackend, ChartRegistry, ChartSpec};
pub use config::DashboardConfig;
pub use coords::{CoordinateResolver, Geocoder, resolve_with};
pub use dashboard::{Dashboard, InitTask, NavigationOutcome};
pub use error::{ChartError, DashboardError, FetchError, MapError, SurfaceError};
pub use fetch::{Fetcher, fetch_dataset};
pub use map::{EnsureMap, MapBackend, MapSession, MarkerPlacement, Tooltip};
pub use outcome::{Degradation, Outcome};
pub use route::{PageRoute, resolve_route};
pub use surface::Document;
