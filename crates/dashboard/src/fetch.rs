use crate::error::{DashboardError, FetchError};

/// HTTP GET as seen by the dashboard.
///
/// Implementations live with each front end (browser `fetch`, `reqwest`,
/// the local filesystem). Futures are not required to be `Send`: the
/// dashboard runs on a single-threaded event loop.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Returns the response body of a successful GET.
    ///
    /// Non-success statuses must be reported as [`FetchError::Status`].
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

impl<T: Fetcher + ?Sized> Fetcher for std::rc::Rc<T> {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        (**self).get_text(url).await
    }
}

/// GETs a dataset and decodes it with `parse`.
pub async fn fetch_dataset<F, T, E>(
    fetcher: &F,
    url: &str,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> Result<T, DashboardError>
where
    F: Fetcher + ?Sized,
    E: Into<DashboardError>,
{
    let text = fetcher
        .get_text(url)
        .await
        .map_err(DashboardError::Dataset)?;
    parse(&text).map_err(Into::into)
}
