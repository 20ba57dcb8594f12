//! Compiled page render functions.

use std::sync::Arc;

use crate::node::ElementNode;

/// A compiled page.
///
/// Invoking [`RenderFn::render`] returns a fresh tree that the caller owns
/// outright; repeated calls yield structurally identical trees. Cloning a
/// `RenderFn` is cheap and it can be shared across threads.
#[derive(Debug, Clone)]
pub struct RenderFn {
    page_id: String,
    template: Arc<ElementNode>,
}

impl RenderFn {
    pub fn new(page_id: impl Into<String>, template: ElementNode) -> Self {
        Self {
            page_id: page_id.into(),
            template: Arc::new(template),
        }
    }

    /// Id of the page this function renders.
    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn render(&self) -> ElementNode {
        ElementNode::clone(&self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_returns_independent_trees() {
        let f = RenderFn::new("p", ElementNode::new("div").text("hi"));

        let mut first = f.render();
        first.children.clear();
        let second = f.render();

        assert_eq!(f.page_id(), "p");
        assert!(first.children.is_empty());
        assert_eq!(second.text_content(), "hi");
    }
}
