//! Frontmatter extraction and parsing.

use serde::Deserialize;

/// Parsed frontmatter from a markdown page.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Page title; falls back to the first level-1 heading
    #[serde(default)]
    pub title: Option<String>,

    /// Page description for search and meta tags
    #[serde(default)]
    pub description: Option<String>,

    /// Order in navigation (lower = first)
    #[serde(default)]
    pub order: Option<i32>,

    /// Whether to show in navigation
    #[serde(default = "default_true")]
    pub nav: bool,

    /// Custom output path override
    #[serde(default)]
    pub slug: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for Frontmatter {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            order: None,
            nav: true,
            slug: None,
        }
    }
}

/// Extract frontmatter from a markdown source.
///
/// Returns the parsed frontmatter, the remaining content after the
/// frontmatter block, and the number of lines the block occupied.
pub fn extract_frontmatter(
    source: &str,
) -> Result<(Option<Frontmatter>, &str, usize), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((None, source, 0));
    }

    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let after_close = &after_open[close_pos + 4..];
    // Drop the rest of the closing fence line.
    let remaining = match after_close.find('\n') {
        Some(newline) => &after_close[newline + 1..],
        None => "",
    };

    let frontmatter: Frontmatter = if yaml_content.is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml_content)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?
    };

    let consumed = source.len() - remaining.len();
    let lines = source[..consumed].matches('\n').count();

    Ok((Some(frontmatter), remaining, lines))
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}
