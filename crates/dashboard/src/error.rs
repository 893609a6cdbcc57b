use formats::FormatError;

/// Failure of a single HTTP GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response (offline, CORS, aborted).
    Network { url: String, message: String },
    /// A response arrived with a non-success status.
    Status { url: String, status: u16 },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Network { url, .. } | FetchError::Status { url, .. } => url,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network { url, message } => write!(f, "request to {url} failed: {message}"),
            FetchError::Status { url, status } => write!(f, "{url} answered HTTP {status}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Failure reported by the DOM surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    MissingElement(String),
    Host(String),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::MissingElement(id) => write!(f, "element #{id} not found"),
            SurfaceError::Host(msg) => write!(f, "dom error: {msg}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Failure reported by the map widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    MissingContainer(String),
    UnknownInstance,
    Widget(String),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::MissingContainer(id) => write!(f, "map container #{id} not found"),
            MapError::UnknownInstance => write!(f, "unknown map or marker instance"),
            MapError::Widget(msg) => write!(f, "map widget error: {msg}"),
        }
    }
}

impl std::error::Error for MapError {}

/// Failure reported by the charting widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    MissingCanvas(String),
    UnknownInstance,
    Widget(String),
}

impl std::fmt::Display for ChartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartError::MissingCanvas(id) => write!(f, "canvas #{id} not found"),
            ChartError::UnknownInstance => write!(f, "unknown chart instance"),
            ChartError::Widget(msg) => write!(f, "chart widget error: {msg}"),
        }
    }
}

impl std::error::Error for ChartError {}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardError {
    /// The HTML fragment for a page could not be fetched.
    PageLoad { page: String, source: FetchError },
    /// A dataset could not be fetched.
    Dataset(FetchError),
    /// A dataset was fetched but could not be decoded.
    Format(FormatError),
    /// The remote geocoder answered with something unusable.
    Geocode { country: String, message: String },
    Surface(SurfaceError),
    Map(MapError),
    Chart(ChartError),
    Config(String),
}

impl std::fmt::Display for DashboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardError::PageLoad { page, source } => {
                write!(f, "Failed to load page: {page} ({source})")
            }
            DashboardError::Dataset(e) => write!(f, "dataset unavailable: {e}"),
            DashboardError::Format(e) => write!(f, "{e}"),
            DashboardError::Geocode { country, message } => {
                write!(f, "geocoding {country} failed: {message}")
            }
            DashboardError::Surface(e) => write!(f, "{e}"),
            DashboardError::Map(e) => write!(f, "{e}"),
            DashboardError::Chart(e) => write!(f, "{e}"),
            DashboardError::Config(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::PageLoad { source, .. } => Some(source),
            DashboardError::Dataset(e) => Some(e),
            DashboardError::Format(e) => Some(e),
            DashboardError::Surface(e) => Some(e),
            DashboardError::Map(e) => Some(e),
            DashboardError::Chart(e) => Some(e),
            DashboardError::Geocode { .. } | DashboardError::Config(_) => None,
        }
    }
}

impl From<FormatError> for DashboardError {
    fn from(e: FormatError) -> Self {
        DashboardError::Format(e)
    }
}

impl From<SurfaceError> for DashboardError {
    fn from(e: SurfaceError) -> Self {
        DashboardError::Surface(e)
    }
}

impl From<MapError> for DashboardError {
    fn from(e: MapError) -> Self {
        DashboardError::Map(e)
    }
}

impl From<ChartError> for DashboardError {
    fn from(e: ChartError) -> Self {
        DashboardError::Chart(e)
    }
}
