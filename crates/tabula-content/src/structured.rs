//! Structured YAML page descriptors.
//!
//! ```yaml
//! title: CommonModels
//! order: 2
//! blocks:
//!   - heading: { level: 2, text: AccountInfo }
//!   - markdown: Fields returned by `ledger_getAccountInfo`.
//!   - table:
//!       align: [center, center]
//!       rows:
//!         - [Name, Type]
//!         - [address, string]
//! ```

use serde::Deserialize;

use crate::descriptor::{Alignment, CodeBlock, Container, ContainerKind, ContentBlock, Heading, Inline, Table};
use crate::markdown::parse_markdown;

/// Top-level YAML document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPage {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default = "default_true")]
    pub nav: bool,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub blocks: Vec<RawBlock>,
}

fn default_true() -> bool {
    true
}

/// One block of a structured descriptor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawBlock {
    Heading {
        level: u8,
        text: String,
        #[serde(default)]
        id: Option<String>,
    },
    Markdown(String),
    Table {
        #[serde(default)]
        align: Vec<Alignment>,
        rows: Vec<Vec<String>>,
    },
    Container {
        kind: ContainerKind,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        blocks: Vec<RawBlock>,
    },
    Code {
        #[serde(default)]
        language: Option<String>,
        source: String,
    },
}

/// Parse a YAML document into a raw page.
pub fn parse_structured(source: &str) -> Result<RawPage, serde_yaml::Error> {
    serde_yaml::from_str(source)
}

/// Lower raw blocks to content blocks.
///
/// Tables are carried verbatim so row-length mistakes reach the compiler,
/// which reports them against the block that holds them.
pub fn lower_blocks(raw: Vec<RawBlock>) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();

    for block in raw {
        match block {
            RawBlock::Heading { level, text, id } => {
                blocks.push(ContentBlock::Heading(Heading {
                    level,
                    id: id.unwrap_or_default(),
                    content: vec![Inline::Text(text)],
                }));
            }
            RawBlock::Markdown(source) => blocks.extend(parse_markdown(&source)),
            RawBlock::Table { align, rows } => {
                let table = Table::from_rows(rows);
                let table = if align.is_empty() {
                    table
                } else {
                    table.with_alignments(align)
                };
                blocks.push(ContentBlock::Table(table));
            }
            RawBlock::Container {
                kind,
                title,
                blocks: inner,
            } => {
                blocks.push(ContentBlock::Container(Container {
                    kind,
                    title: title.unwrap_or_else(|| kind.default_title().to_string()),
                    blocks: lower_blocks(inner),
                }));
            }
            RawBlock::Code { language, source } => {
                blocks.push(ContentBlock::Code(CodeBlock { language, source }));
            }
        }
    }

    blocks
}
