//! Page descriptors and the content blocks they are made of.

use serde::Deserialize;

/// One documentation page prior to rendering.
///
/// Descriptors are immutable once loaded: the loader fills them through the
/// builder methods and hands out read-only accessors afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDescriptor {
    id: String,
    title: String,
    description: Option<String>,
    order: Option<i32>,
    nav: bool,
    slug: Option<String>,
    blocks: Vec<ContentBlock>,
}

impl PageDescriptor {
    /// Create a descriptor from an id and its blocks.
    ///
    /// The title defaults to the first level-1 heading, or the id when the
    /// page has none.
    pub fn new(id: impl Into<String>, blocks: Vec<ContentBlock>) -> Self {
        let id = id.into();
        let title = blocks
            .iter()
            .find_map(|block| match block {
                ContentBlock::Heading(h) if h.level == 1 => Some(inline_text(&h.content)),
                _ => None,
            })
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| id.clone());

        Self {
            id,
            title,
            description: None,
            order: None,
            nav: true,
            slug: None,
            blocks,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_order(mut self, order: Option<i32>) -> Self {
        self.order = order;
        self
    }

    pub fn with_nav(mut self, nav: bool) -> Self {
        self.nav = nav;
        self
    }

    pub fn with_slug(mut self, slug: Option<String>) -> Self {
        self.slug = slug;
        self
    }

    /// Page identifier: the source path relative to the content root, without
    /// extension and with `/` separators.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn order(&self) -> Option<i32> {
        self.order
    }

    /// Whether the page is listed in site navigation.
    pub fn nav(&self) -> bool {
        self.nav
    }

    /// Output path override from frontmatter.
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// All headings on the page in document order, including nested ones.
    pub fn headings(&self) -> Vec<&Heading> {
        let mut out = Vec::new();
        collect_headings(&self.blocks, &mut out);
        out
    }

    /// Plain text of every paragraph on the page, for search indexing.
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        collect_text(&self.blocks, &mut parts);
        parts.join(" ")
    }
}

fn collect_headings<'a>(blocks: &'a [ContentBlock], out: &mut Vec<&'a Heading>) {
    for block in blocks {
        match block {
            ContentBlock::Heading(h) => out.push(h),
            ContentBlock::Container(c) => collect_headings(&c.blocks, out),
            ContentBlock::Quote(inner) => collect_headings(inner, out),
            ContentBlock::List(list) => {
                for item in &list.items {
                    collect_headings(item, out);
                }
            }
            _ => {}
        }
    }
}

fn collect_text(blocks: &[ContentBlock], out: &mut Vec<String>) {
    for block in blocks {
        match block {
            ContentBlock::Paragraph(inlines) | ContentBlock::Text(inlines) => {
                out.push(inline_text(inlines))
            }
            ContentBlock::Table(table) => {
                for row in table.all_rows() {
                    out.push(row.cells.join(" "));
                }
            }
            ContentBlock::Container(c) => collect_text(&c.blocks, out),
            ContentBlock::Quote(inner) => collect_text(inner, out),
            ContentBlock::List(list) => {
                for item in &list.items {
                    collect_text(item, out);
                }
            }
            ContentBlock::Heading(_) | ContentBlock::Code(_) | ContentBlock::Rule => {}
        }
    }
}

/// A block of page content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Heading(Heading),
    Paragraph(Vec<Inline>),
    /// Inline run without a paragraph wrapper (tight list items)
    Text(Vec<Inline>),
    Table(Table),
    Container(Container),
    Code(CodeBlock),
    List(List),
    Quote(Vec<ContentBlock>),
    Rule,
}

/// A section heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    /// Heading level (1-6)
    pub level: u8,
    /// Anchor ID, unique within the page
    pub id: String,
    pub content: Vec<Inline>,
}

impl Heading {
    pub fn text(&self) -> String {
        inline_text(&self.content)
    }
}

/// Kind of a `:::` custom container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Tip,
    Warning,
    Danger,
    Details,
}

impl ContainerKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "tip" => Some(Self::Tip),
            "warning" => Some(Self::Warning),
            "danger" => Some(Self::Danger),
            "details" => Some(Self::Details),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tip => "tip",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Details => "details",
        }
    }

    /// Title used when the container opener does not name one.
    pub fn default_title(&self) -> &'static str {
        match self {
            Self::Tip => "TIP",
            Self::Warning | Self::Danger => "WARNING",
            Self::Details => "DETAILS",
        }
    }
}

/// A titled callout box.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub kind: ContainerKind,
    pub title: String,
    pub blocks: Vec<ContentBlock>,
}

/// A fenced or indented code block.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub source: String,
}

/// An ordered or bullet list.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub ordered: bool,
    /// First number of an ordered list
    pub start: Option<u64>,
    pub items: Vec<Vec<ContentBlock>>,
}

/// Inline content inside paragraphs, headings and list items.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link(Link),
    Image {
        src: String,
        title: Option<String>,
        alt: String,
    },
    /// Task list checkbox
    TaskMarker(bool),
    LineBreak,
}

/// A hyperlink.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub href: String,
    pub title: Option<String>,
    pub children: Vec<Inline>,
}

/// Flatten inline content to its text.
pub fn inline_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_inline_text(inlines, &mut out);
    out
}

fn push_inline_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(t) | Inline::Code(t) => out.push_str(t),
            Inline::Emphasis(c) | Inline::Strong(c) | Inline::Strikethrough(c) => {
                push_inline_text(c, out)
            }
            Inline::Link(link) => push_inline_text(&link.children, out),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::LineBreak => out.push('\n'),
            Inline::TaskMarker(_) => {}
        }
    }
}

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    /// CSS `text-align` value, if any.
    pub fn as_css(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
        }
    }
}

impl From<pulldown_cmark::Alignment> for Alignment {
    fn from(value: pulldown_cmark::Alignment) -> Self {
        match value {
            pulldown_cmark::Alignment::None => Self::None,
            pulldown_cmark::Alignment::Left => Self::Left,
            pulldown_cmark::Alignment::Center => Self::Center,
            pulldown_cmark::Alignment::Right => Self::Right,
        }
    }
}

/// One table row. Rows have no identity beyond their position.
///
/// `cells` holds the plain text of each cell and drives validation;
/// `content` holds the same cells with their inline markup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub content: Vec<Vec<Inline>>,
}

impl TableRow {
    /// Row of plain text cells.
    pub fn new<S: Into<String>>(cells: impl IntoIterator<Item = S>) -> Self {
        let cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        let content = cells.iter().map(|cell| plain_cell(cell)).collect();
        Self { cells, content }
    }

    /// Row of cells with inline markup. Surrounding whitespace is trimmed.
    pub fn from_inlines(content: impl IntoIterator<Item = Vec<Inline>>) -> Self {
        let content: Vec<Vec<Inline>> = content.into_iter().map(trim_inlines).collect();
        let cells = content.iter().map(|cell| inline_text(cell)).collect();
        Self { cells, content }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

fn plain_cell(cell: &str) -> Vec<Inline> {
    if cell.is_empty() {
        Vec::new()
    } else {
        vec![Inline::Text(cell.to_string())]
    }
}

fn trim_inlines(mut inlines: Vec<Inline>) -> Vec<Inline> {
    if let Some(Inline::Text(first)) = inlines.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(Inline::Text(last)) = inlines.last_mut() {
        *last = last.trim_end().to_string();
    }
    inlines.retain(|inline| !matches!(inline, Inline::Text(t) if t.is_empty()));
    inlines
}

/// A table with a header row and body rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Per-column alignment; empty means unaligned
    pub alignments: Vec<Alignment>,
    pub header: TableRow,
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Build a table from raw rows; the first row becomes the header.
    ///
    /// Rows are kept as given, so mismatched lengths survive until the
    /// compiler validates them.
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rows = rows.into_iter().map(|row| TableRow::new(row));
        let header = rows.next().unwrap_or_default();
        Self {
            alignments: Vec::new(),
            header,
            rows: rows.collect(),
        }
    }

    pub fn with_alignments(mut self, alignments: Vec<Alignment>) -> Self {
        self.alignments = alignments;
        self
    }

    pub fn columns(&self) -> usize {
        self.header.len()
    }

    /// Alignment of a column, `None` when unspecified.
    pub fn alignment(&self, column: usize) -> Alignment {
        self.alignments.get(column).copied().unwrap_or_default()
    }

    /// Header followed by body rows.
    pub fn all_rows(&self) -> impl Iterator<Item = &TableRow> {
        std::iter::once(&self.header).chain(self.rows.iter())
    }
}
