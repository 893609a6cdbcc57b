use std::cell::RefCell;

use runtime::{Event, EventBus, Job, Level, NavToken, NavigationClock, Scheduler};
use tracing::{debug, error, warn};

use crate::charts::{ChartBackend, ChartRegistry};
use crate::config::DashboardConfig;
use crate::coords::CoordinateResolver;
use crate::error::DashboardError;
use crate::fetch::Fetcher;
use crate::html;
use crate::map::{MapBackend, MapSession};
use crate::outcome::{Degradation, Outcome};
use crate::render::CountrySelection;
use crate::route::{PageRoute, resolve_route_or};
use crate::surface::Document;

/// Widget initialization run on the paint frame after a page was injected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InitTask {
    InitMap,
    CountryList,
    TimeSeries,
    Proportion,
}

impl InitTask {
    pub fn id(&self) -> &'static str {
        match self {
            InitTask::InitMap => "init_map",
            InitTask::CountryList => "country_list",
            InitTask::TimeSeries => "time_series",
            InitTask::Proportion => "proportion",
        }
    }

    /// Tasks a freshly injected page needs, in run order.
    pub fn for_route(route: &PageRoute) -> &'static [InitTask] {
        match route {
            PageRoute::Chart => &[InitTask::InitMap, InitTask::CountryList],
            PageRoute::Home => &[InitTask::TimeSeries, InitTask::Proportion],
            PageRoute::Other(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationOutcome {
    pub route: PageRoute,
    pub token: NavToken,
    /// Tasks deferred to the next frame.
    pub result: Outcome<Vec<InitTask>>,
}

/// One dashboard session bound to a page.
///
/// Generic over its four collaborators so the same logic drives the browser
/// (fetch, DOM, Leaflet, Chart.js) and the in-memory fakes used in tests.
/// Methods take `&self`; no `RefCell` borrow is held across an `.await`.
pub struct Dashboard<F, D, M, C> {
    pub(crate) config: DashboardConfig,
    pub(crate) fetcher: F,
    pub(crate) document: D,
    pub(crate) maps: RefCell<MapSession<M>>,
    pub(crate) charts: RefCell<ChartRegistry<C>>,
    pub(crate) resolver: CoordinateResolver,
    pub(crate) clock: NavigationClock,
    pub(crate) scheduler: RefCell<Scheduler<InitTask>>,
    pub(crate) events: RefCell<EventBus>,
    pub(crate) countries: RefCell<CountrySelection>,
}

impl<F, D, M, C> Dashboard<F, D, M, C>
where
    F: Fetcher,
    D: Document,
    M: MapBackend,
    C: ChartBackend,
{
    pub fn new(config: DashboardConfig, fetcher: F, document: D, map_backend: M, chart_backend: C) -> Self {
        let maps = MapSession::new(map_backend, config.map.clone(), config.elements.map.clone());
        let resolver = CoordinateResolver::new(config.data.coordinates.clone());
        let events = EventBus::with_capacity_limit(config.diagnostics_capacity);
        Self {
            maps: RefCell::new(maps),
            charts: RefCell::new(ChartRegistry::new(chart_backend)),
            resolver,
            clock: NavigationClock::new(),
            scheduler: RefCell::new(Scheduler::new()),
            events: RefCell::new(events),
            countries: RefCell::new(CountrySelection::default()),
            config,
            fetcher,
            document,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn resolver(&self) -> &CoordinateResolver {
        &self.resolver
    }

    pub fn with_maps<R>(&self, f: impl FnOnce(&MapSession<M>) -> R) -> R {
        f(&self.maps.borrow())
    }

    pub fn with_charts<R>(&self, f: impl FnOnce(&ChartRegistry<C>) -> R) -> R {
        f(&self.charts.borrow())
    }

    pub fn selected_country(&self) -> Option<usize> {
        self.countries.borrow().selected()
    }

    pub fn current_token(&self) -> NavToken {
        self.clock.current()
    }

    pub fn has_pending_jobs(&self) -> bool {
        self.scheduler.borrow().has_pending()
    }

    pub fn diagnostics(&self) -> Vec<Event> {
        self.events.borrow().events().to_vec()
    }

    pub(crate) fn record(&self, level: Level, kind: &'static str, message: impl Into<String>) {
        let frame = self.scheduler.borrow().frame();
        self.events.borrow_mut().emit(frame, level, kind, message);
    }

    pub(crate) fn is_stale(&self, token: NavToken) -> bool {
        !self.clock.is_current(token)
    }

    /// Resolves `fragment` (e.g. `#/home`) and navigates there.
    pub async fn navigate_to_fragment(&self, fragment: Option<&str>) -> NavigationOutcome {
        let route = resolve_route_or(fragment, &self.config.default_page);
        self.navigate(route).await
    }

    /// Fetches and injects the page fragment, then defers its widget
    /// initialization to the next frame.
    ///
    /// A failed fetch replaces the content with a visible error and defers
    /// nothing. A navigation overtaken by a newer one writes nothing.
    pub async fn navigate(&self, route: PageRoute) -> NavigationOutcome {
        let token = self.clock.advance();
        let url = self.config.page_url(route.as_str());
        self.record(Level::Info, "navigate", format!("{route} from {url}"));

        let fetched = self.fetcher.get_text(&url).await;
        if self.is_stale(token) {
            debug!(page = %route, "navigation superseded before the page arrived");
            return NavigationOutcome {
                route,
                token,
                result: Outcome::skipped(Degradation::Stale),
            };
        }

        let result = match fetched {
            Err(source) => {
                let err = DashboardError::PageLoad {
                    page: route.as_str().to_string(),
                    source,
                };
                error!("{err}");
                self.record(Level::Error, "page_load", err.to_string());
                if let Err(e) = self
                    .document
                    .set_inner_html(&self.config.content_id, &html::page_error(&err.to_string()))
                {
                    warn!("unable to show page error: {e}");
                }
                Outcome::Failed(err)
            }
            Ok(markup) => match self.document.set_inner_html(&self.config.content_id, &markup) {
                Err(e) => {
                    error!(page = %route, "unable to inject page: {e}");
                    Outcome::Failed(e.into())
                }
                Ok(()) => {
                    let tasks = InitTask::for_route(&route);
                    let mut scheduler = self.scheduler.borrow_mut();
                    for (order, task) in tasks.iter().enumerate() {
                        scheduler.defer(Job::with_priority(task.id(), order as i32, token, *task));
                    }
                    Outcome::Done(tasks.to_vec())
                }
            },
        };

        NavigationOutcome { route, token, result }
    }

    /// Starts the next frame and returns its jobs, dropping those scheduled
    /// by a navigation that has since been superseded.
    pub fn take_due_jobs(&self) -> Vec<Job<InitTask>> {
        let (_, due) = self.scheduler.borrow_mut().begin_frame();
        let (live, stale): (Vec<_>, Vec<_>) = due.into_iter().partition(|job| !self.is_stale(job.token));
        for job in &stale {
            self.record(Level::Debug, "stale_job", job.id);
        }
        live
    }

    pub async fn run_job(&self, job: Job<InitTask>) -> Outcome<()> {
        if self.is_stale(job.token) {
            return Outcome::skipped(Degradation::Stale);
        }
        let elements = &self.config.elements;
        let data = &self.config.data;
        let outcome = match job.task {
            InitTask::InitMap => self.init_map().map(|_| ()),
            InitTask::CountryList => self
                .render_country_list(&elements.countries_list, &data.countries, job.token)
                .await
                .map(|_| ()),
            InitTask::TimeSeries => self
                .render_time_series(&elements.home_chart, &data.screen_use, job.token)
                .await
                .map(|_| ()),
            InitTask::Proportion => self
                .render_proportion(&elements.age_chart, &data.age_groups, job.token)
                .await
                .map(|_| ()),
        };
        self.note(job.id, &outcome);
        outcome
    }

    /// Runs every job due in the next frame, one after another.
    pub async fn run_frame(&self) -> Vec<(InitTask, Outcome<()>)> {
        let mut results = Vec::new();
        for job in self.take_due_jobs() {
            let task = job.task;
            results.push((task, self.run_job(job).await));
        }
        results
    }

    pub(crate) fn note<T>(&self, kind: &'static str, outcome: &Outcome<T>) {
        match outcome {
            Outcome::Done(_) => self.record(Level::Debug, kind, "done"),
            Outcome::Degraded { reason, .. } => self.record(Level::Warn, kind, reason.to_string()),
            Outcome::Failed(e) => self.record(Level::Error, kind, e.to_string()),
        }
    }

    /// Releases every widget. The dashboard can still navigate afterwards.
    pub fn shutdown(&self) {
        self.charts.borrow_mut().dispose_all();
        if let Some(reason) = self.maps.borrow_mut().teardown().degradation() {
            warn!("{reason}");
        }
    }
}
