//! Output markup tree.

use std::collections::BTreeMap;

/// A node in the output markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(ElementNode),
    Text(String),
}

impl From<ElementNode> for Node {
    fn from(element: ElementNode) -> Self {
        Self::Element(element)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// An element with attributes and ordered children.
///
/// Every node is owned by exactly one parent, so trees are finite and
/// acyclic. Attributes live in a sorted map; their order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementNode {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Direct element children.
    pub fn elements(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// All descendant elements (including self) with the given tag, depth first.
    pub fn find_all(&self, tag: &str) -> Vec<&ElementNode> {
        let mut found = Vec::new();
        self.collect_tag(tag, &mut found);
        found
    }

    fn collect_tag<'a>(&'a self, tag: &str, found: &mut Vec<&'a ElementNode>) {
        if self.tag == tag {
            found.push(self);
        }
        for child in self.elements() {
            child.collect_tag(tag, found);
        }
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.push_text(out),
            }
        }
    }

    /// Number of elements in the tree, including self.
    pub fn element_count(&self) -> usize {
        1 + self.elements().map(ElementNode::element_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ElementNode {
        ElementNode::new("table").child(
            ElementNode::new("tbody")
                .child(ElementNode::new("tr").child(ElementNode::new("td").text("1")))
                .child(ElementNode::new("tr").child(ElementNode::new("td").text("2"))),
        )
    }

    #[test]
    fn builder_sets_attributes_and_children() {
        let node = ElementNode::new("a").attr("href", "#x").class("anchor").text("#");

        assert_eq!(node.get_attribute("href"), Some("#x"));
        assert_eq!(node.get_attribute("class"), Some("anchor"));
        assert_eq!(node.children, vec![Node::Text("#".to_string())]);
    }

    #[test]
    fn finds_descendants_in_order() {
        let tree = sample();

        let cells: Vec<_> = tree.find_all("td").iter().map(|td| td.text_content()).collect();

        assert_eq!(cells, vec!["1", "2"]);
        assert_eq!(tree.find_all("tr").len(), 2);
    }

    #[test]
    fn counts_elements() {
        assert_eq!(sample().element_count(), 6);
        assert_eq!(sample().text_content(), "12");
    }
}
