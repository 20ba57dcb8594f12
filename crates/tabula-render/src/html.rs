//! HTML serialization.

use std::io::Write;

use tabula_compiler::{ElementNode, Node};

use crate::error::RenderError;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Render a tree to an HTML string.
pub fn render_html(root: &ElementNode) -> String {
    let mut out = String::new();
    push_element(root, &mut out);
    out
}

/// Render a tree into a writer.
///
/// The document is serialized in full before anything is written.
pub fn write_html<W: Write>(root: &ElementNode, out: &mut W) -> Result<(), RenderError> {
    out.write_all(render_html(root).as_bytes())?;
    out.flush()?;
    Ok(())
}

fn push_element(element: &ElementNode, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);

    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
    }

    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        return;
    }

    for child in &element.children {
        match child {
            Node::Element(e) => push_element(e, out),
            Node::Text(text) => out.push_str(&escape_text(text)),
        }
    }

    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

/// Escape text content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;

    #[test]
    fn renders_nested_elements() {
        let tree = ElementNode::new("p")
            .class("note")
            .text("a < b & ")
            .child(ElementNode::new("code").text("<T>"));

        assert_eq!(
            render_html(&tree),
            r#"<p class="note">a &lt; b &amp; <code>&lt;T&gt;</code></p>"#
        );
    }

    #[test]
    fn sorts_and_escapes_attributes() {
        let tree = ElementNode::new("a")
            .attr("title", "say \"hi\"")
            .attr("href", "/x?a=1&b=2");

        assert_eq!(
            render_html(&tree),
            r#"<a href="/x?a=1&amp;b=2" title="say &quot;hi&quot;"></a>"#
        );
    }

    #[test]
    fn void_and_boolean_attributes() {
        let tree = ElementNode::new("li")
            .child(
                ElementNode::new("input")
                    .attr("type", "checkbox")
                    .attr("checked", ""),
            )
            .child(ElementNode::new("br"));

        assert_eq!(
            render_html(&tree),
            r#"<li><input checked type="checkbox"><br></li>"#
        );
    }

    #[test]
    fn writes_to_writer() {
        let mut buf = Vec::new();

        write_html(&ElementNode::new("hr"), &mut buf).unwrap();

        assert_eq!(buf, b"<hr>");
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn surfaces_io_errors() {
        let err = write_html(&ElementNode::new("p"), &mut FullDisk).unwrap_err();

        assert!(matches!(err, RenderError::Io(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
