/// Page id used when the fragment names no page.
pub const DEFAULT_PAGE: &str = "chart";

/// Page selected by the URL fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageRoute {
    Home,
    Chart,
    /// A page with a fragment file but no widgets to initialize.
    Other(String),
}

impl PageRoute {
    pub fn from_id(id: &str) -> Self {
        match id {
            "home" => PageRoute::Home,
            "chart" => PageRoute::Chart,
            other => PageRoute::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PageRoute::Home => "home",
            PageRoute::Chart => "chart",
            PageRoute::Other(id) => id,
        }
    }

    /// Whether this page has widgets to initialize after it is injected.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, PageRoute::Other(_))
    }
}

impl std::fmt::Display for PageRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves `#/<page>` or `#<page>` to a route, defaulting to `chart`.
pub fn resolve_route(fragment: Option<&str>) -> PageRoute {
    resolve_route_or(fragment, DEFAULT_PAGE)
}

pub fn resolve_route_or(fragment: Option<&str>, default_page: &str) -> PageRoute {
    let fragment = fragment.unwrap_or("");
    let page = fragment
        .strip_prefix("#/")
        .or_else(|| fragment.strip_prefix('#'))
        .unwrap_or(fragment);
    if page.is_empty() {
        PageRoute::from_id(default_page)
    } else {
        PageRoute::from_id(page)
    }
}

#[cfg(test)]
mod tests {
    use super::{PageRoute, resolve_route, resolve_route_or};

    #[test]
    fn strips_a_single_leading_marker() {
        assert_eq!(resolve_route(Some("#/home")), PageRoute::Home);
        assert_eq!(resolve_route(Some("#chart")), PageRoute::Chart);
        assert_eq!(resolve_route(Some("#/about")), PageRoute::Other("about".to_string()));
        assert_eq!(resolve_route(Some("##home")), PageRoute::Other("#home".to_string()));
        assert_eq!(resolve_route(Some("#//home")), PageRoute::Other("/home".to_string()));
    }

    #[test]
    fn empty_or_absent_fragment_uses_default() {
        assert_eq!(resolve_route(None), PageRoute::Chart);
        assert_eq!(resolve_route(Some("")), PageRoute::Chart);
        assert_eq!(resolve_route(Some("#")), PageRoute::Chart);
        assert_eq!(resolve_route(Some("#/")), PageRoute::Chart);
        assert_eq!(resolve_route_or(Some("#/"), "home"), PageRoute::Home);
    }

    #[test]
    fn only_home_and_chart_are_recognized() {
        assert!(PageRoute::Home.is_recognized());
        assert!(PageRoute::Chart.is_recognized());
        assert!(!PageRoute::Other("about".into()).is_recognized());
        assert_eq!(PageRoute::Other("about".into()).as_str(), "about");
    }
}
