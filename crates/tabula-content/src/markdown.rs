//! Markdown to content block conversion.
//!
//! pulldown-cmark events are well nested, so every `parse_*` helper consumes
//! events up to and including the `End` that closes the construct it was
//! called for.

use std::iter::Peekable;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use crate::descriptor::{
    inline_text, Alignment, CodeBlock, ContentBlock, Heading, Inline, Link, List, Table, TableRow,
};

/// Markdown extensions enabled for page content.
pub fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Parse markdown into content blocks.
///
/// Heading ids are taken from `{#id}` attributes when present and left empty
/// otherwise; the loader assigns anchors afterwards.
pub fn parse_markdown(source: &str) -> Vec<ContentBlock> {
    let mut events = Parser::new_ext(source, markdown_options()).peekable();
    parse_blocks(&mut events)
}

fn parse_blocks<'a, I>(events: &mut Peekable<I>) -> Vec<ContentBlock>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut blocks = Vec::new();

    loop {
        let Some(next) = events.peek() else {
            break;
        };

        if matches!(next, Event::End(_)) {
            events.next();
            break;
        }

        // Tight list items carry inline events without a paragraph.
        if is_inline(next) {
            let run = parse_inline_run(events);
            if !run.is_empty() {
                blocks.push(ContentBlock::Text(run));
            }
            continue;
        }

        let Some(event) = events.next() else {
            break;
        };

        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                let content = parse_inlines(events);
                blocks.push(ContentBlock::Heading(Heading {
                    level: level as u8,
                    id: id.map(|i| i.to_string()).unwrap_or_default(),
                    content,
                }));
            }

            Event::Start(Tag::Paragraph) => {
                let content = parse_inlines(events);
                if !content.is_empty() {
                    blocks.push(ContentBlock::Paragraph(content));
                }
            }

            Event::Start(Tag::BlockQuote { .. }) => {
                blocks.push(ContentBlock::Quote(parse_blocks(events)));
            }

            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_string)
                    }
                    CodeBlockKind::Indented => None,
                };
                let source = collect_text(events);
                blocks.push(ContentBlock::Code(CodeBlock { language, source }));
            }

            Event::Start(Tag::List(start)) => {
                let items = parse_list_items(events);
                blocks.push(ContentBlock::List(List {
                    ordered: start.is_some(),
                    start,
                    items,
                }));
            }

            Event::Start(Tag::Table(alignments)) => {
                let table = parse_table(events)
                    .with_alignments(alignments.into_iter().map(Alignment::from).collect());
                blocks.push(ContentBlock::Table(table));
            }

            Event::Start(Tag::HtmlBlock { .. }) => {
                let html = collect_text(events);
                tracing::debug!("Dropping raw HTML block ({} bytes)", html.len());
            }

            Event::Start(_) => skip_to_end(events),

            Event::Rule => blocks.push(ContentBlock::Rule),

            _ => {}
        }
    }

    blocks
}

fn is_inline(event: &Event<'_>) -> bool {
    matches!(
        event,
        Event::Text(_)
            | Event::Code(_)
            | Event::SoftBreak
            | Event::HardBreak
            | Event::InlineHtml(_)
            | Event::TaskListMarker(_)
            | Event::FootnoteReference(_)
            | Event::Start(
                Tag::Emphasis
                    | Tag::Strong
                    | Tag::Strikethrough
                    | Tag::Link { .. }
                    | Tag::Image { .. }
            )
    )
}

/// Consume inline events up to the closing `End`.
fn parse_inlines<'a, I>(events: &mut Peekable<I>) -> Vec<Inline>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut out = Vec::new();

    while let Some(event) = events.next() {
        if matches!(event, Event::End(_)) {
            break;
        }
        push_inline(event, events, &mut out);
    }

    out
}

/// Consume inline events while they keep coming, leaving the next block
/// event (or `End`) in place.
fn parse_inline_run<'a, I>(events: &mut Peekable<I>) -> Vec<Inline>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut out = Vec::new();

    while events.peek().is_some_and(is_inline) {
        let Some(event) = events.next() else {
            break;
        };
        push_inline(event, events, &mut out);
    }

    out
}

fn push_inline<'a, I>(event: Event<'a>, events: &mut Peekable<I>, out: &mut Vec<Inline>)
where
    I: Iterator<Item = Event<'a>>,
{
    match event {
        Event::Text(text) => push_text(out, &text),
        Event::Code(code) => out.push(Inline::Code(code.to_string())),
        Event::SoftBreak => push_text(out, "\n"),
        Event::HardBreak => out.push(Inline::LineBreak),
        // Raw HTML is kept as text and escaped on output.
        Event::InlineHtml(html) | Event::Html(html) => push_text(out, &html),
        Event::TaskListMarker(checked) => out.push(Inline::TaskMarker(checked)),

        Event::Start(Tag::Emphasis) => out.push(Inline::Emphasis(parse_inlines(events))),
        Event::Start(Tag::Strong) => out.push(Inline::Strong(parse_inlines(events))),
        Event::Start(Tag::Strikethrough) => {
            out.push(Inline::Strikethrough(parse_inlines(events)))
        }

        Event::Start(Tag::Link {
            dest_url, title, ..
        }) => {
            let children = parse_inlines(events);
            out.push(Inline::Link(Link {
                href: dest_url.to_string(),
                title: non_empty(&title),
                children,
            }));
        }

        Event::Start(Tag::Image {
            dest_url, title, ..
        }) => {
            let alt = inline_text(&parse_inlines(events));
            out.push(Inline::Image {
                src: dest_url.to_string(),
                title: non_empty(&title),
                alt,
            });
        }

        Event::Start(_) => out.extend(parse_inlines(events)),

        _ => {}
    }
}

/// Append text, merging with a preceding text node.
fn push_text(out: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Inline::Text(text.to_string()));
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_list_items<'a, I>(events: &mut Peekable<I>) -> Vec<Vec<ContentBlock>>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut items = Vec::new();

    while let Some(event) = events.next() {
        match event {
            Event::Start(Tag::Item) => items.push(parse_blocks(events)),
            Event::Start(_) => skip_to_end(events),
            Event::End(_) => break,
            _ => {}
        }
    }

    items
}

fn parse_table<'a, I>(events: &mut Peekable<I>) -> Table
where
    I: Iterator<Item = Event<'a>>,
{
    let mut rows = Vec::new();

    while let Some(event) = events.next() {
        match event {
            Event::Start(Tag::TableHead) | Event::Start(Tag::TableRow) => {
                rows.push(parse_row(events))
            }
            Event::Start(_) => skip_to_end(events),
            Event::End(_) => break,
            _ => {}
        }
    }

    let mut rows = rows.into_iter();
    Table {
        alignments: Vec::new(),
        header: rows.next().unwrap_or_default(),
        rows: rows.collect(),
    }
}

fn parse_row<'a, I>(events: &mut Peekable<I>) -> TableRow
where
    I: Iterator<Item = Event<'a>>,
{
    let mut cells = Vec::new();

    while let Some(event) = events.next() {
        match event {
            Event::Start(Tag::TableCell) => cells.push(parse_inlines(events)),
            Event::Start(_) => skip_to_end(events),
            Event::End(_) => break,
            _ => {}
        }
    }

    TableRow::from_inlines(cells)
}

/// Collect the text of a leaf block such as a code block.
fn collect_text<'a, I>(events: &mut Peekable<I>) -> String
where
    I: Iterator<Item = Event<'a>>,
{
    let mut text = String::new();

    while let Some(event) = events.next() {
        match event {
            Event::Text(t) | Event::Html(t) => text.push_str(&t),
            Event::Start(_) => skip_to_end(events),
            Event::End(_) => break,
            _ => {}
        }
    }

    text
}

fn skip_to_end<'a, I>(events: &mut Peekable<I>)
where
    I: Iterator<Item = Event<'a>>,
{
    let mut depth = 1usize;

    for event in events.by_ref() {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn parses_heading_with_explicit_id() {
        let blocks = parse_markdown("## Balance Info {#balance}\n");

        assert_eq!(
            blocks,
            vec![ContentBlock::Heading(Heading {
                level: 2,
                id: "balance".to_string(),
                content: vec![text("Balance Info")],
            })]
        );
    }

    #[test]
    fn parses_aligned_table() {
        let source = "\
| Name | Type |
|:----:|-----:|
| address | string |
| height | `uint64` |
";

        let blocks = parse_markdown(source);

        let ContentBlock::Table(table) = &blocks[0] else {
            panic!("expected table, got {:?}", blocks);
        };
        assert_eq!(table.alignments, vec![Alignment::Center, Alignment::Right]);
        assert_eq!(table.header, TableRow::new(["Name", "Type"]));
        assert_eq!(table.rows[0], TableRow::new(["address", "string"]));
        assert_eq!(table.rows[1].cells, vec!["height", "uint64"]);
        assert_eq!(table.rows[1].content[1], vec![Inline::Code("uint64".to_string())]);
    }

    #[test]
    fn table_cells_keep_inline_markup() {
        let source = "\
| Name | Description |
|------|-------------|
| previousHash | For the first block `0000` is filled |
| toAddress | See [AccountInfo](./models.md) |
";

        let blocks = parse_markdown(source);

        let ContentBlock::Table(table) = &blocks[0] else {
            panic!("expected table, got {:?}", blocks);
        };
        assert_eq!(table.rows[0].cells[1], "For the first block 0000 is filled");
        assert_eq!(
            table.rows[0].content[1],
            vec![
                text("For the first block "),
                Inline::Code("0000".to_string()),
                text(" is filled"),
            ]
        );
        assert!(matches!(&table.rows[1].content[1][1], Inline::Link(link) if link.href == "./models.md"));
    }

    #[test]
    fn parses_inline_formatting_and_links() {
        let blocks = parse_markdown("See **the [docs](https://example.com \"Docs\")** and `code`.");

        assert_eq!(
            blocks,
            vec![ContentBlock::Paragraph(vec![
                text("See "),
                Inline::Strong(vec![
                    text("the "),
                    Inline::Link(Link {
                        href: "https://example.com".to_string(),
                        title: Some("Docs".to_string()),
                        children: vec![text("docs")],
                    }),
                ]),
                text(" and "),
                Inline::Code("code".to_string()),
                text("."),
            ])]
        );
    }

    #[test]
    fn tight_list_items_are_bare_text() {
        let blocks = parse_markdown("- one\n- two\n");

        assert_eq!(
            blocks,
            vec![ContentBlock::List(List {
                ordered: false,
                start: None,
                items: vec![
                    vec![ContentBlock::Text(vec![text("one")])],
                    vec![ContentBlock::Text(vec![text("two")])],
                ],
            })]
        );
    }

    #[test]
    fn task_list_markers() {
        let blocks = parse_markdown("- [x] done\n");

        let ContentBlock::List(list) = &blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(
            list.items[0],
            vec![ContentBlock::Text(vec![Inline::TaskMarker(true), text("done")])]
        );
    }

    #[test]
    fn parses_code_quote_and_rule() {
        let source = "```rust\nfn main() {}\n```\n\n> quoted\n\n---\n";

        let blocks = parse_markdown(source);

        assert_eq!(
            blocks,
            vec![
                ContentBlock::Code(CodeBlock {
                    language: Some("rust".to_string()),
                    source: "fn main() {}\n".to_string(),
                }),
                ContentBlock::Quote(vec![ContentBlock::Paragraph(vec![text("quoted")])]),
                ContentBlock::Rule,
            ]
        );
    }

    #[test]
    fn drops_raw_html_blocks() {
        let blocks = parse_markdown("<div>raw</div>\n\nAfter\n");

        assert_eq!(blocks, vec![ContentBlock::Paragraph(vec![text("After")])]);
    }
}
