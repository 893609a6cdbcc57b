use console_error_panic_hook::set_once;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event};

use dashboard::{Dashboard, DashboardConfig};

mod dom;
mod logging;
mod widgets;

use dom::{BrowserDocument, HttpFetcher};
use widgets::{ChartJsBackend, LeafletBackend};

type WebDashboard = Dashboard<HttpFetcher, BrowserDocument, LeafletBackend, ChartJsBackend>;

thread_local! {
    static DASHBOARD: RefCell<Option<Rc<WebDashboard>>> = const { RefCell::new(None) };
}

fn current() -> Option<Rc<WebDashboard>> {
    DASHBOARD.with(|d| d.borrow().clone())
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Creates the dashboard and wires it to the page.
///
/// `config_json` overrides any subset of the defaults. Navigation starts on
/// `DOMContentLoaded`, or immediately when the document is already parsed.
#[wasm_bindgen]
pub fn boot(config_json: Option<String>) -> Result<(), JsValue> {
    if current().is_some() {
        return Ok(());
    }
    let config = match config_json.as_deref() {
        Some(text) => DashboardConfig::from_json_str(text).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => DashboardConfig::default(),
    };
    logging::init(&config.log_level);

    let document = BrowserDocument::from_window()?;
    let list_id = config.elements.countries_list.clone();
    let dash = Rc::new(Dashboard::new(
        config,
        HttpFetcher,
        document,
        LeafletBackend::default(),
        ChartJsBackend::default(),
    ));
    DASHBOARD.with(|d| *d.borrow_mut() = Some(dash));

    let window = window()?;
    let on_hash = Closure::<dyn FnMut()>::new(navigate_to_hash);
    window.add_event_listener_with_callback("hashchange", on_hash.as_ref().unchecked_ref())?;
    on_hash.forget();

    // List entries are re-created on every render; one delegated listener
    // covers all of them.
    let page = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(index) = clicked_country(&event, &list_id) {
            select_country(index);
        }
    });
    page.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();

    if page.ready_state() == "loading" {
        let on_ready = Closure::<dyn FnMut()>::new(navigate_to_hash);
        page.add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())?;
        on_ready.forget();
    } else {
        navigate_to_hash();
    }
    tracing::info!("dashboard booted");
    Ok(())
}

/// `data-index` of the list entry under the click, if it belongs to `#list_id`.
fn clicked_country(event: &Event, list_id: &str) -> Option<usize> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let item = target.closest("[data-index]").ok()??;
    let parent = item.parent_element()?;
    if parent.id() != list_id {
        return None;
    }
    item.get_attribute("data-index")?.parse().ok()
}

/// Resolves `location.hash` and navigates there.
#[wasm_bindgen]
pub fn navigate_to_hash() {
    let Some(dash) = current() else {
        tracing::warn!("navigate_to_hash called before boot");
        return;
    };
    let hash = window().and_then(|w| w.location().hash()).unwrap_or_default();
    spawn_local(async move {
        dash.navigate_to_fragment(Some(&hash)).await;
        request_frame(dash);
    });
}

/// Runs the jobs deferred by the last navigation on the next paint.
fn request_frame(dash: Rc<WebDashboard>) {
    if !dash.has_pending_jobs() {
        return;
    }
    let callback = Closure::once_into_js(move || {
        for job in dash.take_due_jobs() {
            let dash = dash.clone();
            spawn_local(async move {
                dash.run_job(job).await;
            });
        }
    });
    let requested = window().and_then(|w| w.request_animation_frame(callback.unchecked_ref()));
    if let Err(e) = requested {
        tracing::error!("requestAnimationFrame failed: {e:?}");
    }
}

/// Focuses the country list entry at `index`.
#[wasm_bindgen]
pub fn select_country(index: usize) {
    let Some(dash) = current() else {
        return;
    };
    spawn_local(async move {
        dash.select_country(index).await;
    });
}

#[derive(Serialize)]
struct DiagnosticEvent<'a> {
    frame: u64,
    level: &'static str,
    kind: &'static str,
    message: &'a str,
}

/// Recorded diagnostics as a JSON array, oldest first.
#[wasm_bindgen]
pub fn diagnostics_json() -> String {
    let Some(dash) = current() else {
        return "[]".to_string();
    };
    let events = dash.diagnostics();
    let rows: Vec<DiagnosticEvent<'_>> = events
        .iter()
        .map(|e| DiagnosticEvent {
            frame: e.frame_index,
            level: e.level.as_str(),
            kind: e.kind,
            message: &e.message,
        })
        .collect();
    serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
}
