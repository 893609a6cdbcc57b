//! Offline helpers around the dashboard core: reading the data directory
//! from disk, printing the narratives the pages would show, and baking the
//! country coordinate table from a geocoder.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use compute::{ProportionSummary, TimeSeriesSummary};
use dashboard::{CoordinateResolver, DashboardConfig, DashboardError, FetchError, Fetcher, Geocoder, fetch_dataset};
use formats::{AgeBreakdown, CoordinateTable, CountryRecord, ScreenUseDataset, parse_countries};
use foundation::coords::LatLon;
use reqwest::Client;
use tracing::{debug, info, warn};

/// Serves dashboard URLs from a directory, the way a static file server
/// rooted there would.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Local path for a page-relative URL, or `None` for remote ones.
    pub fn path_for(&self, url: &str) -> Option<PathBuf> {
        if url.contains("://") {
            return None;
        }
        let relative = url.trim_start_matches("./").trim_start_matches('/');
        Some(self.root.join(relative))
    }
}

impl Fetcher for FileFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let Some(path) = self.path_for(url) else {
            return Err(FetchError::Network {
                url: url.to_string(),
                message: "not a local path".to_string(),
            });
        };
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
            Err(e) => Err(FetchError::Network {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Plain HTTP GETs through `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Public geocoders reject anonymous clients, so every request carries
    /// a named user agent.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("atlas-dash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let network = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };
        let resp = self.client.get(url).send().await.map_err(network)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(network)
    }
}

/// Where a country's marker would land.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRow {
    pub country: String,
    pub at: Option<LatLon>,
}

/// Text the home page would show, plus marker positions for the chart page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub time_series: Vec<String>,
    pub headline: Option<String>,
    pub detail: Option<String>,
    pub markers: Vec<MarkerRow>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "screen time vs. mental health")?;
        if self.time_series.is_empty() {
            writeln!(f, "  (no data)")?;
        }
        for sentence in &self.time_series {
            writeln!(f, "  {sentence}")?;
        }
        writeln!(f, "depression by age")?;
        match (&self.headline, &self.detail) {
            (Some(headline), Some(detail)) => writeln!(f, "  {headline}\n  {detail}")?,
            _ => writeln!(f, "  (no data)")?,
        }
        writeln!(f, "country markers")?;
        for row in &self.markers {
            match row.at {
                Some(at) => writeln!(f, "  {:<24} {:>9.4} {:>9.4}", row.country, at.lat, at.lon)?,
                None => writeln!(f, "  {:<24} (no coordinates)", row.country)?,
            }
        }
        Ok(())
    }
}

/// Loads every dataset `config` names and derives the report.
///
/// A missing coordinate table is tolerated the same way the dashboard
/// tolerates it; every other dataset must load.
pub async fn summarize<F: Fetcher + ?Sized>(
    fetcher: &F,
    config: &DashboardConfig,
) -> Result<Report, DashboardError> {
    let screen = fetch_dataset(fetcher, &config.data.screen_use, ScreenUseDataset::parse).await?;
    let time_series = TimeSeriesSummary::new(&screen.screen_time(), &screen.mental_health())
        .map(|s| s.sentences())
        .unwrap_or_default();

    let ages = fetch_dataset(fetcher, &config.data.age_groups, AgeBreakdown::parse).await?;
    let proportion = ProportionSummary::new(&ages.series(), ages.source());

    let countries = fetch_dataset(fetcher, &config.data.countries, parse_countries).await?;
    let resolver = CoordinateResolver::new(config.data.coordinates.clone());
    let mut markers = Vec::with_capacity(countries.len());
    for record in &countries {
        markers.push(MarkerRow {
            country: record.country.clone(),
            at: resolver.resolve(fetcher, record).await,
        });
    }

    Ok(Report {
        time_series,
        headline: proportion.as_ref().map(|p| p.headline("Depression prevalence")),
        detail: proportion.as_ref().map(|p| p.detail()),
        markers,
    })
}

/// Result of one baking run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Baked {
    pub table: CoordinateTable,
    /// Countries already present in the starting table.
    pub kept: usize,
    /// Countries the geocoder placed.
    pub found: usize,
    /// Countries the geocoder had no match for.
    pub unmatched: Vec<String>,
    /// Countries whose lookup failed in transport.
    pub failed: Vec<String>,
}

/// Looks up every country missing from `table`.
///
/// Records with embedded coordinates are copied as is. `pause` is slept
/// before each remote request after the first.
pub async fn bake_coordinates<F: Fetcher + ?Sized>(
    fetcher: &F,
    geocoder: &Geocoder,
    records: &[CountryRecord],
    table: CoordinateTable,
    pause: Duration,
) -> Baked {
    let mut baked = Baked {
        table,
        ..Baked::default()
    };
    let mut requested = false;
    for record in records {
        let name = record.country.as_str();
        if baked.table.contains(name) {
            baked.kept += 1;
            continue;
        }
        if let Some(at) = record.coordinates {
            debug!(country = name, "using embedded coordinates");
            baked.table.insert(name, at);
            baked.found += 1;
            continue;
        }
        if requested && geocoder.cached(name).is_none() && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        requested = true;
        match geocoder.lookup(fetcher, name).await {
            Ok(Some(at)) => {
                info!(country = name, lat = at.lat, lon = at.lon, "geocoded");
                baked.table.insert(name, at);
                baked.found += 1;
            }
            Ok(None) => {
                warn!(country = name, "no geocoder match");
                baked.unmatched.push(name.to_string());
            }
            Err(e) => {
                warn!(country = name, "geocoder lookup failed: {e}");
                baked.failed.push(name.to_string());
            }
        }
    }
    baked
}

/// Reads a coordinate table from disk; a missing file is an empty table.
pub async fn load_table(path: &Path) -> Result<CoordinateTable, Box<dyn std::error::Error>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(CoordinateTable::parse(&text)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no existing coordinate table");
            Ok(CoordinateTable::new())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard::testing::{StaticFetcher, fixtures};
    use pretty_assertions::assert_eq;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("atlas-dash-{name}-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("data")).unwrap();
        dir
    }

    #[tokio::test]
    async fn file_fetcher_reads_page_relative_urls() {
        let root = scratch_dir("read");
        std::fs::write(root.join("data/a.json"), "[1]").unwrap();
        let fetcher = FileFetcher::new(&root);

        assert_eq!(fetcher.get_text("./data/a.json").await.unwrap(), "[1]");
        assert_eq!(fetcher.get_text("/data/a.json").await.unwrap(), "[1]");
        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn file_fetcher_maps_missing_files_to_404() {
        let root = scratch_dir("missing");
        let fetcher = FileFetcher::new(&root);

        let err = fetcher.get_text("./data/nope.json").await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Status {
                url: "./data/nope.json".to_string(),
                status: 404
            }
        );
        assert!(matches!(
            fetcher.get_text("https://example.org/x").await,
            Err(FetchError::Network { .. })
        ));
        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn summarize_reports_narratives_and_markers() {
        let fetcher = fixtures::fetcher();
        let report = summarize(&fetcher, &DashboardConfig::default()).await.unwrap();

        assert_eq!(report.time_series.len(), 2);
        assert!(report.time_series[0].contains("has been increasing from 3.5h in 2019 to 6.2h in 2021"));
        assert_eq!(
            report.headline.as_deref(),
            Some("Depression prevalence is highest among 18-25 (40%) and lowest among 41+ (25%).")
        );
        assert!(report.detail.as_deref().unwrap_or_default().ends_with("Source: WHO 2022."));
        assert_eq!(
            report.markers,
            vec![
                MarkerRow {
                    country: "Greece".to_string(),
                    at: LatLon::new(39.0, 22.0)
                },
                MarkerRow {
                    country: "Chile".to_string(),
                    at: LatLon::new(-35.6, -71.5)
                },
                MarkerRow {
                    country: "Atlantis".to_string(),
                    at: None
                },
            ]
        );

        let text = report.to_string();
        assert!(text.contains("Atlantis"));
        assert!(text.contains("(no coordinates)"));
    }

    #[tokio::test]
    async fn summarize_fails_when_a_dataset_is_missing() {
        let fetcher = StaticFetcher::new()
            .with_body("./data/mental_health_vs_screen_use.json", fixtures::SCREEN_USE)
            .with_status("./data/age_wise_depression.json", 404);

        let err = summarize(&fetcher, &DashboardConfig::default()).await.unwrap_err();
        assert!(matches!(err, DashboardError::Dataset(FetchError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn bake_only_queries_countries_without_positions() {
        let geocoder = Geocoder::new("https://geo.test/search");
        let fetcher = StaticFetcher::new()
            .with_body(geocoder.query_url("Chile"), r#"[{"lat":"-35.6","lon":"-71.5"}]"#)
            .with_body(geocoder.query_url("Atlantis"), "[]");
        let records = vec![
            CountryRecord::new("Greece", 6.5, 7.1, 2021).with_coordinates(LatLon { lat: 39.0, lon: 22.0 }),
            CountryRecord::new("Chile", 5.8, 6.4, 2021),
            CountryRecord::new("Atlantis", 4.0, 4.5, 2021),
            CountryRecord::new("Peru", 4.9, 5.0, 2021),
            CountryRecord::new("Chile", 5.8, 6.4, 2022),
        ];
        let mut existing = CoordinateTable::new();
        existing.insert("Peru", LatLon { lat: -9.2, lon: -75.0 });

        let baked = bake_coordinates(&fetcher, &geocoder, &records, existing, Duration::ZERO).await;

        assert_eq!(baked.kept, 2);
        assert_eq!(baked.found, 2);
        assert_eq!(baked.unmatched, vec!["Atlantis".to_string()]);
        assert!(baked.failed.is_empty());
        assert_eq!(baked.table.get("Chile"), LatLon::new(-35.6, -71.5));
        assert_eq!(baked.table.get("Greece"), LatLon::new(39.0, 22.0));
        assert_eq!(fetcher.request_count(&geocoder.query_url("Chile")), 1);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn bake_records_transport_failures_separately() {
        let geocoder = Geocoder::new("https://geo.test/search");
        let fetcher = StaticFetcher::new().with_status(geocoder.query_url("Chile"), 429);
        let records = vec![CountryRecord::new("Chile", 5.8, 6.4, 2021)];

        let baked = bake_coordinates(&fetcher, &geocoder, &records, CoordinateTable::new(), Duration::ZERO).await;

        assert_eq!(baked.failed, vec!["Chile".to_string()]);
        assert!(baked.table.is_empty());
        assert_eq!(geocoder.cached("Chile"), None);
    }

    #[tokio::test]
    async fn load_table_treats_missing_file_as_empty() {
        let root = scratch_dir("table");
        std::fs::write(root.join("data/coords.json"), r#"{"Chile":{"lat":"-35.6","lon":-71.5}}"#).unwrap();

        let table = load_table(&root.join("data/coords.json")).await.unwrap();
        assert_eq!(table.get("Chile"), LatLon::new(-35.6, -71.5));
        assert!(load_table(&root.join("data/none.json")).await.unwrap().is_empty());
        std::fs::remove_dir_all(root).unwrap();
    }
}
