use dashboard::{Document, FetchError, Fetcher, SurfaceError};
use gloo_net::http::Request;
use wasm_bindgen::JsValue;
use web_sys::Element;

fn host_error(e: JsValue) -> SurfaceError {
    SurfaceError::Host(format!("{e:?}"))
}

/// `fetch` through gloo-net.
pub struct HttpFetcher;

impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let network = |e: gloo_net::Error| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };
        let resp = Request::get(url).send().await.map_err(network)?;
        if !resp.ok() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status(),
            });
        }
        resp.text().await.map_err(network)
    }
}

/// The live page.
pub struct BrowserDocument {
    document: web_sys::Document,
}

impl BrowserDocument {
    pub fn from_window() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(Self { document })
    }

    fn element(&self, id: &str) -> Result<Element, SurfaceError> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| SurfaceError::MissingElement(id.to_string()))
    }
}

impl Document for BrowserDocument {
    fn has_element(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn set_inner_html(&self, id: &str, html: &str) -> Result<(), SurfaceError> {
        self.element(id)?.set_inner_html(html);
        Ok(())
    }

    fn render_list(&self, container_id: &str, class: &str, labels: &[String]) -> Result<(), SurfaceError> {
        let container = self.element(container_id)?;
        container.set_inner_html("");
        for (i, label) in labels.iter().enumerate() {
            let item = self.document.create_element("div").map_err(host_error)?;
            item.set_class_name(class);
            item.set_text_content(Some(label));
            item.set_attribute("data-index", &i.to_string())
                .map_err(host_error)?;
            container.append_child(&item).map_err(host_error)?;
        }
        Ok(())
    }

    fn toggle_item_class(
        &self,
        container_id: &str,
        index: usize,
        class: &str,
        on: bool,
    ) -> Result<(), SurfaceError> {
        let item = self
            .element(container_id)?
            .query_selector(&format!("[data-index=\"{index}\"]"))
            .map_err(host_error)?
            .ok_or_else(|| SurfaceError::MissingElement(format!("{container_id}[{index}]")))?;
        item.class_list()
            .toggle_with_force(class, on)
            .map_err(host_error)?;
        Ok(())
    }
}
