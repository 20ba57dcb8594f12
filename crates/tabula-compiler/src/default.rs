//! Default page compiler.
//!
//! Lowers content blocks to the markup of a classic documentation theme:
//! headings carry a `header-anchor` link, `:::` containers become
//! `custom-block` boxes, table cells carry their column alignment as an
//! inline `text-align` style, and external links open in a new tab with an
//! outbound marker.

use tabula_content::{
    CodeBlock, Container, ContainerKind, ContentBlock, ContentError, Heading, Inline, Link, List,
    PageDescriptor, Table, TableRow,
};

use crate::links::{is_external, rewrite_markdown_link};
use crate::node::{ElementNode, Node};
use crate::render_fn::RenderFn;
use crate::traits::{CompileContext, PageCompiler};
use crate::validate::validate_page;

/// Default documentation theme compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCompiler;

impl DefaultCompiler {
    pub fn new() -> Self {
        Self
    }

    fn lower_blocks(&self, blocks: &[ContentBlock], ctx: &CompileContext) -> Vec<Node> {
        blocks
            .iter()
            .flat_map(|block| self.lower_block(block, ctx))
            .collect()
    }

    fn lower_block(&self, block: &ContentBlock, ctx: &CompileContext) -> Vec<Node> {
        let element = match block {
            ContentBlock::Heading(heading) => self.lower_heading(heading, ctx),
            ContentBlock::Paragraph(inlines) => {
                ElementNode::new("p").children(self.lower_inlines(inlines, ctx))
            }
            ContentBlock::Text(inlines) => return self.lower_inlines(inlines, ctx),
            ContentBlock::Table(table) => self.lower_table(table, ctx),
            ContentBlock::Container(container) => self.lower_container(container, ctx),
            ContentBlock::Code(code) => lower_code(code),
            ContentBlock::List(list) => self.lower_list(list, ctx),
            ContentBlock::Quote(inner) => {
                ElementNode::new("blockquote").children(self.lower_blocks(inner, ctx))
            }
            ContentBlock::Rule => ElementNode::new("hr"),
        };

        vec![element.into()]
    }

    fn lower_heading(&self, heading: &Heading, ctx: &CompileContext) -> ElementNode {
        let anchor = ElementNode::new("a")
            .class("header-anchor")
            .attr("href", format!("#{}", heading.id))
            .text(ctx.anchor_symbol.as_str());

        ElementNode::new(format!("h{}", heading.level))
            .attr("id", heading.id.as_str())
            .child(anchor)
            .text(" ")
            .children(self.lower_inlines(&heading.content, ctx))
    }

    fn lower_container(&self, container: &Container, ctx: &CompileContext) -> ElementNode {
        let class = format!("custom-block {}", container.kind.as_str());
        let body = self.lower_blocks(&container.blocks, ctx);

        match container.kind {
            ContainerKind::Details => ElementNode::new("details")
                .class(class)
                .child(ElementNode::new("summary").text(container.title.as_str()))
                .children(body),
            _ => ElementNode::new("div")
                .class(class)
                .child(
                    ElementNode::new("p")
                        .class("custom-block-title")
                        .text(container.title.as_str()),
                )
                .children(body),
        }
    }

    fn lower_list(&self, list: &List, ctx: &CompileContext) -> ElementNode {
        let mut element = if list.ordered {
            ElementNode::new("ol")
        } else {
            ElementNode::new("ul")
        };

        if let Some(start) = list.start.filter(|s| *s != 1) {
            element = element.attr("start", start.to_string());
        }

        element.children(
            list.items
                .iter()
                .map(|item| ElementNode::new("li").children(self.lower_blocks(item, ctx)).into()),
        )
    }

    fn lower_table(&self, table: &Table, ctx: &CompileContext) -> ElementNode {
        let head =
            ElementNode::new("thead").child(self.lower_row(table, &table.header, "th", ctx));
        let body = ElementNode::new("tbody").children(
            table
                .rows
                .iter()
                .map(|row| self.lower_row(table, row, "td", ctx).into()),
        );

        ElementNode::new("table").child(head).child(body)
    }

    fn lower_row(
        &self,
        table: &Table,
        row: &TableRow,
        cell_tag: &str,
        ctx: &CompileContext,
    ) -> ElementNode {
        ElementNode::new("tr").children(row.cells.iter().enumerate().map(|(column, cell)| {
            let mut element = ElementNode::new(cell_tag);
            if let Some(align) = table.alignment(column).as_css() {
                element = element.attr("style", format!("text-align:{}", align));
            }
            match row.content.get(column) {
                Some(content) => element.children(self.lower_inlines(content, ctx)).into(),
                None => element.text(cell.as_str()).into(),
            }
        }))
    }

    fn lower_inlines(&self, inlines: &[Inline], ctx: &CompileContext) -> Vec<Node> {
        inlines
            .iter()
            .map(|inline| self.lower_inline(inline, ctx))
            .collect()
    }

    fn lower_inline(&self, inline: &Inline, ctx: &CompileContext) -> Node {
        match inline {
            Inline::Text(text) => Node::Text(text.clone()),
            Inline::Code(code) => ElementNode::new("code").text(code.as_str()).into(),
            Inline::Emphasis(inner) => ElementNode::new("em")
                .children(self.lower_inlines(inner, ctx))
                .into(),
            Inline::Strong(inner) => ElementNode::new("strong")
                .children(self.lower_inlines(inner, ctx))
                .into(),
            Inline::Strikethrough(inner) => ElementNode::new("del")
                .children(self.lower_inlines(inner, ctx))
                .into(),
            Inline::Link(link) => self.lower_link(link, ctx).into(),
            Inline::Image { src, title, alt } => {
                let mut img = ElementNode::new("img")
                    .attr("src", src.as_str())
                    .attr("alt", alt.as_str());
                if let Some(title) = title {
                    img = img.attr("title", title.as_str());
                }
                img.into()
            }
            Inline::TaskMarker(checked) => {
                let mut input = ElementNode::new("input")
                    .attr("type", "checkbox")
                    .attr("disabled", "");
                if *checked {
                    input = input.attr("checked", "");
                }
                input.into()
            }
            Inline::LineBreak => ElementNode::new("br").into(),
        }
    }

    fn lower_link(&self, link: &Link, ctx: &CompileContext) -> ElementNode {
        let external = is_external(&link.href);
        let href = if ctx.rewrite_markdown_links {
            rewrite_markdown_link(&link.href)
        } else {
            link.href.clone()
        };

        let mut a = ElementNode::new("a").attr("href", href);
        if let Some(title) = &link.title {
            a = a.attr("title", title.as_str());
        }

        a = a.children(self.lower_inlines(&link.children, ctx));

        if external && ctx.outbound_links {
            a = a
                .attr("target", "_blank")
                .attr("rel", "noopener noreferrer")
                .child(
                    ElementNode::new("span")
                        .class("outbound-link")
                        .attr("aria-hidden", "true")
                        .text("\u{2197}"),
                );
        }

        a
    }
}

impl PageCompiler for DefaultCompiler {
    fn name(&self) -> &'static str {
        "default"
    }

    fn compile(
        &self,
        page: &PageDescriptor,
        ctx: &CompileContext,
    ) -> Result<RenderFn, ContentError> {
        validate_page(page)?;

        let root = ElementNode::new("div")
            .class("content")
            .attr("data-page", page.id())
            .children(self.lower_blocks(page.blocks(), ctx));

        Ok(RenderFn::new(page.id(), root))
    }
}

fn lower_code(code: &CodeBlock) -> ElementNode {
    let language = code.language.as_deref().unwrap_or("text");

    ElementNode::new("div")
        .class(format!("language-{}", language))
        .child(
            ElementNode::new("pre").child(
                ElementNode::new("code")
                    .class(format!("language-{}", language))
                    .text(code.source.as_str()),
            ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabula_content::{load_page, Alignment, SourceFormat};

    fn compile_markdown(source: &str) -> ElementNode {
        let page = load_page("test", source, SourceFormat::Markdown).unwrap();
        DefaultCompiler::new()
            .compile(&page, &CompileContext::default())
            .unwrap()
            .render()
    }

    #[test]
    fn root_wraps_page_content() {
        let root = compile_markdown("Hello");

        assert_eq!(root.tag, "div");
        assert_eq!(root.get_attribute("class"), Some("content"));
        assert_eq!(root.get_attribute("data-page"), Some("test"));
        assert_eq!(root.find_all("p")[0].text_content(), "Hello");
    }

    #[test]
    fn headings_get_anchor_links() {
        let root = compile_markdown("## Account Info");

        let expected = ElementNode::new("h2")
            .attr("id", "account-info")
            .child(
                ElementNode::new("a")
                    .class("header-anchor")
                    .attr("href", "#account-info")
                    .text("#"),
            )
            .text(" ")
            .text("Account Info");

        assert_eq!(root.find_all("h2"), vec![&expected]);
    }

    #[test]
    fn table_scenario() {
        let table = Table::from_rows(vec![vec!["a", "b"], vec!["1", "2"]]);
        let page = PageDescriptor::new("t", vec![ContentBlock::Table(table)]);

        let root = crate::compile(&page).unwrap().render();

        let table = root.find_all("table")[0];
        let header: Vec<_> = table.find_all("th").iter().map(|c| c.text_content()).collect();
        let body_rows = table.find_all("tbody")[0].find_all("tr");
        let body: Vec<_> = body_rows[0].find_all("td").iter().map(|c| c.text_content()).collect();

        assert_eq!(table.find_all("thead")[0].find_all("tr").len(), 1);
        assert_eq!(header, vec!["a", "b"]);
        assert_eq!(body_rows.len(), 1);
        assert_eq!(body, vec!["1", "2"]);
    }

    #[test]
    fn aligned_cells_carry_style() {
        let table = Table::from_rows(vec![vec!["Name", "Type"], vec!["x", "y"]])
            .with_alignments(vec![Alignment::Center, Alignment::None]);
        let page = PageDescriptor::new("t", vec![ContentBlock::Table(table)]);

        let root = crate::compile(&page).unwrap().render();

        let cells = root.find_all("td");
        assert_eq!(cells[0].get_attribute("style"), Some("text-align:center"));
        assert_eq!(cells[1].get_attribute("style"), None);
    }

    #[test]
    fn table_cells_keep_inline_markup() {
        let root = compile_markdown(
            "| Name | Description |\n|---|---|\n| previousHash | For the first block `0000` is filled |\n",
        );

        let cell = root.find_all("td")[1];
        let code = cell.find_all("code");
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].text_content(), "0000");
        assert_eq!(cell.text_content(), "For the first block 0000 is filled");
    }

    #[test]
    fn table_cell_links_are_lowered() {
        let root = compile_markdown("| See |\n|---|\n| [models](models.md) and **bold** |\n");

        let cell = root.find_all("td")[0];
        assert_eq!(cell.find_all("a")[0].get_attribute("href"), Some("models.html"));
        assert_eq!(cell.find_all("strong")[0].text_content(), "bold");
    }

    #[test]
    fn containers_become_custom_blocks() {
        let root = compile_markdown("::: tip Maintainer\nBody\n:::\n\n::: details\nHidden\n:::\n");

        let tip = root.find_all("div")[1];
        assert_eq!(tip.get_attribute("class"), Some("custom-block tip"));
        assert_eq!(tip.find_all("p")[0].get_attribute("class"), Some("custom-block-title"));
        assert_eq!(tip.find_all("p")[0].text_content(), "Maintainer");

        let details = root.find_all("details")[0];
        assert_eq!(details.find_all("summary")[0].text_content(), "DETAILS");
    }

    #[test]
    fn external_links_open_in_new_tab() {
        let root = compile_markdown("[lyd00](https://github.com/lyd00) and [models](models.md#top)");

        let links = root.find_all("a");
        assert_eq!(links[0].get_attribute("target"), Some("_blank"));
        assert_eq!(links[0].get_attribute("rel"), Some("noopener noreferrer"));
        assert_eq!(links[0].find_all("span")[0].get_attribute("class"), Some("outbound-link"));
        assert_eq!(links[1].get_attribute("href"), Some("models.html#top"));
        assert_eq!(links[1].get_attribute("target"), None);
    }

    #[test]
    fn context_disables_outbound_marker() {
        let page = load_page("t", "[x](https://x.dev)", SourceFormat::Markdown).unwrap();
        let ctx = CompileContext {
            outbound_links: false,
            ..Default::default()
        };

        let root = DefaultCompiler::new().compile(&page, &ctx).unwrap().render();

        assert!(root.find_all("span").is_empty());
        assert_eq!(root.find_all("a")[0].get_attribute("target"), None);
    }

    #[test]
    fn lists_code_and_breaks() {
        let root = compile_markdown("3. three\n4. four\n\n```json\n{}\n```\n");

        let ol = root.find_all("ol")[0];
        assert_eq!(ol.get_attribute("start"), Some("3"));
        assert_eq!(ol.find_all("li").len(), 2);

        let code = root.find_all("code")[0];
        assert_eq!(code.get_attribute("class"), Some("language-json"));
        assert_eq!(code.text_content(), "{}\n");
    }

    #[test]
    fn malformed_table_fails_compile() {
        let table = Table::from_rows(vec![vec!["a", "b"], vec!["1"]]);
        let page = PageDescriptor::new("t", vec![ContentBlock::Rule, ContentBlock::Table(table)]);

        let err = crate::compile(&page).unwrap_err();

        assert_eq!(err.block().map(|b| b.to_string()), Some("2".to_string()));
    }

    #[test]
    fn compile_is_deterministic() {
        let source = "# T\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n::: warning\n*x*\n:::\n";
        let page = load_page("p", source, SourceFormat::Markdown).unwrap();

        let first = crate::compile(&page).unwrap().render();
        let second = crate::compile(&page).unwrap().render();

        assert_eq!(first, second);
    }
}
