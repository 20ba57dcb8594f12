//! Re-parsing rendered tables.
//!
//! Reads back the `<table>` markup produced by the renderer, for checks that
//! rendered output still carries the source cells.

use std::sync::LazyLock;

use regex::Regex;

/// Cells of one rendered table, header row first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedTable {
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }
}

static TABLE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)(table|tr|th|td)\b[^>]*>").expect("Invalid table tag regex")
});

static HIDDEN_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<span\b[^>]*\baria-hidden="true"[^>]*>[^<]*</span>"#)
        .expect("Invalid hidden span regex")
});

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

/// Extract every table in `html`, in document order.
pub fn parse_tables(html: &str) -> Vec<ParsedTable> {
    let mut tables = Vec::new();
    let mut current: Option<ParsedTable> = None;
    let mut cell_start: Option<usize> = None;

    for caps in TABLE_TAG.captures_iter(html) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());

        match (name.as_str(), closing) {
            ("table", false) => current = Some(ParsedTable::default()),
            ("table", true) => {
                if let Some(table) = current.take() {
                    tables.push(table);
                }
            }
            ("tr", false) => {
                if let Some(table) = current.as_mut() {
                    table.rows.push(Vec::new());
                }
            }
            ("th" | "td", false) => cell_start = Some(whole.end()),
            ("th" | "td", true) => {
                let (Some(start), Some(table)) = (cell_start.take(), current.as_mut()) else {
                    continue;
                };
                if let Some(row) = table.rows.last_mut() {
                    row.push(cell_text(&html[start..whole.start()]));
                }
            }
            _ => {}
        }
    }

    tables
}

fn cell_text(inner: &str) -> String {
    let visible = HIDDEN_SPAN.replace_all(inner, "");
    unescape(&ANY_TAG.replace_all(&visible, ""))
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
