use crate::error::SurfaceError;

/// The slice of the DOM the dashboard writes to.
pub trait Document {
    fn has_element(&self, id: &str) -> bool;

    /// Replaces the markup inside `#id`.
    fn set_inner_html(&self, id: &str, html: &str) -> Result<(), SurfaceError>;

    /// Replaces the children of `#container_id` with one entry per label.
    ///
    /// Entries carry `class` and their position as `data-index`.
    fn render_list(&self, container_id: &str, class: &str, labels: &[String]) -> Result<(), SurfaceError>;

    /// Adds or removes `class` on the list entry at `index`.
    fn toggle_item_class(
        &self,
        container_id: &str,
        index: usize,
        class: &str,
        on: bool,
    ) -> Result<(), SurfaceError>;
}

impl<T: Document + ?Sized> Document for std::rc::Rc<T> {
    fn has_element(&self, id: &str) -> bool {
        (**self).has_element(id)
    }

    fn set_inner_html(&self, id: &str, html: &str) -> Result<(), SurfaceError> {
        (**self).set_inner_html(id, html)
    }

    fn render_list(&self, container_id: &str, class: &str, labels: &[String]) -> Result<(), SurfaceError> {
        (**self).render_list(container_id, class, labels)
    }

    fn toggle_item_class(
        &self,
        container_id: &str,
        index: usize,
        class: &str,
        on: bool,
    ) -> Result<(), SurfaceError> {
        (**self).toggle_item_class(container_id, index, class, on)
    }
}
