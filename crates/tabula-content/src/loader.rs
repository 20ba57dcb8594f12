//! Loading page descriptors from text and from a content directory.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::container::{split_containers, Segment};
use crate::descriptor::{inline_text, Container, ContentBlock, PageDescriptor};
use crate::error::ContentError;
use crate::frontmatter::extract_frontmatter;
use crate::markdown::parse_markdown;
use crate::slug::{slugify, AnchorRegistry};
use crate::structured::{lower_blocks, parse_structured};

/// Source format of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Markdown with optional YAML frontmatter
    Markdown,
    /// Structured YAML descriptor
    Yaml,
}

impl SourceFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("mdx") | Some("markdown") => Some(Self::Markdown),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Load one page from its source text.
pub fn load_page(
    id: &str,
    source: &str,
    format: SourceFormat,
) -> Result<PageDescriptor, ContentError> {
    let page = match format {
        SourceFormat::Markdown => load_markdown(id, source)?,
        SourceFormat::Yaml => load_yaml(id, source)?,
    };

    tracing::debug!(page = id, blocks = page.blocks().len(), "Loaded page");

    Ok(page)
}

fn load_markdown(id: &str, source: &str) -> Result<PageDescriptor, ContentError> {
    let (frontmatter, content, offset) =
        extract_frontmatter(source).map_err(|e| ContentError::Frontmatter {
            page: id.to_string(),
            source: e,
        })?;

    let mut blocks = parse_content(id, content, offset)?;
    assign_anchors(&mut blocks, &mut AnchorRegistry::new());

    let page = PageDescriptor::new(id, blocks);
    let Some(fm) = frontmatter else {
        return Ok(page);
    };

    let page = match fm.title {
        Some(title) => page.with_title(title),
        None => page,
    };

    Ok(page
        .with_description(fm.description)
        .with_order(fm.order)
        .with_nav(fm.nav)
        .with_slug(fm.slug))
}

fn load_yaml(id: &str, source: &str) -> Result<PageDescriptor, ContentError> {
    let raw = parse_structured(source).map_err(|e| ContentError::Descriptor {
        page: id.to_string(),
        message: e.to_string(),
    })?;

    let mut blocks = lower_blocks(raw.blocks);
    assign_anchors(&mut blocks, &mut AnchorRegistry::new());

    let page = PageDescriptor::new(id, blocks);
    let page = match raw.title {
        Some(title) => page.with_title(title),
        None => page,
    };

    Ok(page
        .with_description(raw.description)
        .with_order(raw.order)
        .with_nav(raw.nav)
        .with_slug(raw.slug))
}

/// Parse markdown content, expanding `:::` containers recursively.
fn parse_content(
    page: &str,
    content: &str,
    line_offset: usize,
) -> Result<Vec<ContentBlock>, ContentError> {
    let mut blocks = Vec::new();

    for segment in split_containers(page, content, line_offset)? {
        match segment {
            Segment::Markdown(markdown) => blocks.extend(parse_markdown(&markdown)),
            Segment::Container {
                kind,
                title,
                body,
                line,
            } => {
                blocks.push(ContentBlock::Container(Container {
                    kind,
                    title: title.unwrap_or_else(|| kind.default_title().to_string()),
                    blocks: parse_content(page, &body, line)?,
                }));
            }
        }
    }

    Ok(blocks)
}

/// Give every heading a page-unique anchor id.
fn assign_anchors(blocks: &mut [ContentBlock], anchors: &mut AnchorRegistry) {
    for block in blocks {
        match block {
            ContentBlock::Heading(heading) => {
                let wanted = if heading.id.is_empty() {
                    slugify(&inline_text(&heading.content))
                } else {
                    heading.id.clone()
                };
                heading.id = anchors.claim(&wanted);
            }
            ContentBlock::Container(container) => assign_anchors(&mut container.blocks, anchors),
            ContentBlock::Quote(inner) => assign_anchors(inner, anchors),
            ContentBlock::List(list) => {
                for item in &mut list.items {
                    assign_anchors(item, anchors);
                }
            }
            _ => {}
        }
    }
}

/// Loads every page below a content directory.
#[derive(Debug, Clone)]
pub struct ContentLoader {
    root: PathBuf,
}

impl ContentLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load all supported files, sorted by navigation order then id.
    ///
    /// Pages without an order sort after ordered ones.
    pub fn load_all(&self) -> Result<Vec<PageDescriptor>, ContentError> {
        if !self.root.is_dir() {
            return Err(ContentError::Unreadable {
                path: self.root.display().to_string(),
                message: "content directory not found".to_string(),
            });
        }

        let mut pages = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let Some(format) = SourceFormat::from_path(path) else {
                tracing::debug!("Skipping {}", path.display());
                continue;
            };

            let source = fs::read_to_string(path).map_err(|e| ContentError::Unreadable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

            pages.push(load_page(&self.page_id(path), &source, format)?);
        }

        pages.sort_by(|a, b| {
            let order_a = a.order().unwrap_or(i32::MAX);
            let order_b = b.order().unwrap_or(i32::MAX);
            order_a.cmp(&order_b).then_with(|| a.id().cmp(b.id()))
        });

        tracing::info!("Loaded {} pages from {}", pages.len(), self.root.display());

        Ok(pages)
    }

    /// Page id for a file: its path relative to the root, without extension,
    /// joined with `/`.
    pub fn page_id(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let stem = relative.with_extension("");

        stem.components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ContainerKind, Inline, TableRow};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn loads_markdown_page() {
        let source = r#"---
title: Common Models
description: Shared structures
order: 3
---

# CommonModels

::: tip Maintainer
[vite-crzn](https://github.com/vite-crzn)
:::

## AccountInfo

| Name | Type |
|:----:|:----:|
| address | string address |
"#;

        let page = load_page("api/common-models", source, SourceFormat::Markdown).unwrap();

        assert_eq!(page.id(), "api/common-models");
        assert_eq!(page.title(), "Common Models");
        assert_eq!(page.description(), Some("Shared structures"));
        assert_eq!(page.order(), Some(3));
        assert_eq!(page.blocks().len(), 4);

        let ContentBlock::Container(container) = &page.blocks()[1] else {
            panic!("expected container");
        };
        assert_eq!(container.kind, ContainerKind::Tip);
        assert_eq!(container.title, "Maintainer");

        let ids: Vec<_> = page.headings().iter().map(|h| h.id.clone()).collect();
        assert_eq!(ids, vec!["commonmodels", "accountinfo"]);

        let ContentBlock::Table(table) = &page.blocks()[3] else {
            panic!("expected table");
        };
        assert_eq!(table.rows, vec![TableRow::new(["address", "string address"])]);
    }

    #[test]
    fn title_comes_from_heading_without_frontmatter() {
        let page = load_page("intro", "# Getting Started\n\nHi.", SourceFormat::Markdown).unwrap();

        assert_eq!(page.title(), "Getting Started");
        assert!(page.nav());
    }

    #[test]
    fn duplicate_headings_get_suffixes() {
        let source = "## Usage\n\n::: details\n## Usage\n:::\n\n## Usage\n";

        let page = load_page("p", source, SourceFormat::Markdown).unwrap();

        let ids: Vec<_> = page.headings().iter().map(|h| h.id.clone()).collect();
        assert_eq!(ids, vec!["usage", "usage-1", "usage-2"]);
    }

    #[test]
    fn nested_containers() {
        let source = "::: details More\n::: warning\nCareful\n:::\n:::\n";

        let page = load_page("p", source, SourceFormat::Markdown).unwrap();

        let ContentBlock::Container(outer) = &page.blocks()[0] else {
            panic!("expected container");
        };
        assert_eq!(outer.kind, ContainerKind::Details);
        let ContentBlock::Container(inner) = &outer.blocks[0] else {
            panic!("expected nested container");
        };
        assert_eq!(inner.title, "WARNING");
        assert_eq!(
            inner.blocks,
            vec![ContentBlock::Paragraph(vec![Inline::Text("Careful".to_string())])]
        );
    }

    #[test]
    fn unclosed_container_reports_source_line() {
        let source = "---\ntitle: T\n---\nText\n\n::: tip\nOpen\n";

        let err = load_page("p", source, SourceFormat::Markdown).unwrap_err();

        assert!(matches!(err, ContentError::UnclosedContainer { line: 6, .. }));
    }

    #[test]
    fn bad_frontmatter_names_page() {
        let err = load_page("broken", "---\ntitle: [x\n---\n", SourceFormat::Markdown).unwrap_err();

        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn loads_yaml_page() {
        let source = "title: Models\nnav: false\nblocks:\n  - heading: { level: 2, text: Token Info }\n";

        let page = load_page("models", source, SourceFormat::Yaml).unwrap();

        assert_eq!(page.title(), "Models");
        assert!(!page.nav());
        assert_eq!(page.headings()[0].id, "token-info");
    }

    #[test]
    fn invalid_yaml_is_descriptor_error() {
        let err = load_page("models", "blocks: 3\n", SourceFormat::Yaml).unwrap_err();

        assert!(matches!(err, ContentError::Descriptor { .. }));
    }

    #[test]
    fn loads_directory_in_order() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("api")).unwrap();
        fs::write(root.join("index.md"), "---\norder: 1\n---\n# Home\n").unwrap();
        fs::write(root.join("api/models.md"), "# Models\n").unwrap();
        fs::write(root.join("api/blocks.yaml"), "title: Blocks\n").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();

        let pages = ContentLoader::new(root).load_all().unwrap();

        let ids: Vec<_> = pages.iter().map(|p| p.id().to_string()).collect();
        assert_eq!(ids, vec!["index", "api/blocks", "api/models"]);
    }

    #[test]
    fn missing_directory_is_unreadable() {
        let temp = tempdir().unwrap();

        let err = ContentLoader::new(temp.path().join("nope")).load_all().unwrap_err();

        assert!(matches!(err, ContentError::Unreadable { .. }));
    }
}
