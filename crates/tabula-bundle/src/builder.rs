//! Static site builder.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use tabula_compiler::{DefaultCompiler, PageCompiler};
use tabula_content::{ContentError, ContentLoader, PageDescriptor};
use tabula_render::{escape_text, render_html};

use crate::assets::AssetPipeline;
use crate::chunk::ScriptChunk;
use crate::config::{BuildConfig, ConfigError};
use crate::templates::{NavItem, PageContext, TemplateEngine, TocEntry};

/// Characters of page text kept per search index entry.
const SEARCH_CONTENT_LIMIT: usize = 500;

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Chunk details per page id
    pub manifest: BTreeMap<String, ManifestEntry>,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// One page's entry in `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub title: String,
    pub chunk_id: u32,
    /// Chunk path relative to the output directory
    pub chunk_file: String,
    /// HTML path relative to the output directory
    pub html: String,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to render template: {0}")]
    Template(String),

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("Pages {first} and {second} both write to {path}")]
    DuplicateOutput {
        path: String,
        first: String,
        second: String,
    },

    #[error("Page {page} has an output path outside the output directory: {path}")]
    InvalidOutputPath { page: String, path: String },

    #[error("Chunk id for page {page} overflows (first chunk id {first})")]
    ChunkIdOverflow { page: String, first: u32 },
}

/// A page with its output location decided.
#[derive(Debug)]
struct PlannedPage<'a> {
    page: &'a PageDescriptor,
    chunk_id: u32,
    /// Path relative to the output directory, e.g. `guide/models.html`
    html_path: String,
    /// Absolute URL path, e.g. `/guide/models.html`
    url: String,
}

/// A page rendered in memory, not yet written.
#[derive(Debug)]
struct RenderedPage {
    html_path: String,
    html: String,
    chunk: ScriptChunk,
}

/// Static site builder.
pub struct SiteBuilder {
    config: BuildConfig,
    compiler: Box<dyn PageCompiler>,
    templates: TemplateEngine,
}

impl SiteBuilder {
    /// Create a builder using the default compiler.
    pub fn new(config: BuildConfig) -> Result<Self, BuildError> {
        let templates = TemplateEngine::new().map_err(|e| BuildError::Template(e.to_string()))?;

        Ok(Self {
            config,
            compiler: Box::new(DefaultCompiler::new()),
            templates,
        })
    }

    /// Create a builder from a `site.toml` file.
    pub fn from_config_file(path: &Path) -> Result<Self, BuildError> {
        Self::new(BuildConfig::from_file(path)?)
    }

    /// Swap in another page compiler.
    pub fn with_compiler(mut self, compiler: impl PageCompiler + 'static) -> Self {
        self.compiler = Box::new(compiler);
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the site from the configured content directory.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let pages = ContentLoader::new(&self.config.content_dir).load_all()?;
        self.build_pages(&pages)
    }

    /// Build the site from already loaded pages.
    ///
    /// Chunk ids follow page order. Every page is compiled and rendered
    /// before anything is written, so a failing page leaves no partial output.
    pub fn build_pages(&self, pages: &[PageDescriptor]) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        tracing::info!(
            compiler = self.compiler.name(),
            "Building {} pages into {}",
            pages.len(),
            self.config.output_dir.display()
        );

        let planned = self.plan_pages(pages)?;
        let nav = self.build_navigation(&planned);

        let rendered: Vec<RenderedPage> = planned
            .par_iter()
            .map(|page| self.render_page(page, &nav))
            .collect::<Result<_, _>>()?;

        for page in &rendered {
            self.write_output(&page.html_path, &page.html)?;
            self.write_output(&chunk_path(&page.chunk), &page.chunk.source)?;
        }
        self.prune_stale_chunks(&rendered)?;

        let manifest: BTreeMap<String, ManifestEntry> = planned
            .iter()
            .zip(&rendered)
            .map(|(plan, page)| {
                (
                    plan.page.id().to_string(),
                    ManifestEntry {
                        title: plan.page.title().to_string(),
                        chunk_id: plan.chunk_id,
                        chunk_file: chunk_path(&page.chunk),
                        html: plan.html_path.clone(),
                    },
                )
            })
            .collect();

        self.generate_assets()?;
        self.write_json("manifest.json", &manifest)?;
        self.generate_search_index(&planned)?;
        self.generate_sitemap(&planned)?;

        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!("Built {} pages in {}ms", rendered.len(), duration_ms);

        Ok(BuildResult {
            pages: rendered.len(),
            manifest,
            duration_ms,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Assign chunk ids and output paths.
    fn plan_pages<'a>(
        &self,
        pages: &'a [PageDescriptor],
    ) -> Result<Vec<PlannedPage<'a>>, BuildError> {
        let mut planned = Vec::with_capacity(pages.len());
        let mut claimed: HashMap<String, &str> = HashMap::new();

        for (index, page) in pages.iter().enumerate() {
            let html_path = html_path(page)?;
            let chunk_id = u32::try_from(index)
                .ok()
                .and_then(|offset| self.config.first_chunk_id.checked_add(offset))
                .ok_or_else(|| BuildError::ChunkIdOverflow {
                    page: page.id().to_string(),
                    first: self.config.first_chunk_id,
                })?;

            if let Some(first) = claimed.insert(html_path.clone(), page.id()) {
                return Err(BuildError::DuplicateOutput {
                    path: html_path,
                    first: first.to_string(),
                    second: page.id().to_string(),
                });
            }

            planned.push(PlannedPage {
                page,
                chunk_id,
                url: format!("{}{}", self.config.base_url, html_path),
                html_path,
            });
        }

        Ok(planned)
    }

    /// Build the sidebar: top-level pages first-come, nested pages grouped
    /// under their top directory.
    fn build_navigation(&self, pages: &[PlannedPage<'_>]) -> Vec<NavItem> {
        let mut nav: Vec<NavItem> = Vec::new();
        let mut sections: HashMap<String, usize> = HashMap::new();

        for planned in pages.iter().filter(|p| p.page.nav()) {
            let item = NavItem {
                title: planned.page.title().to_string(),
                path: planned.url.clone(),
                children: Vec::new(),
                active: false,
            };

            let Some((dir, _)) = planned.page.id().split_once('/') else {
                nav.push(item);
                continue;
            };

            match sections.get(dir) {
                Some(&index) => nav[index].children.push(item),
                None => {
                    sections.insert(dir.to_string(), nav.len());
                    nav.push(NavItem {
                        title: capitalize(dir),
                        path: item.path.clone(),
                        children: vec![item],
                        active: false,
                    });
                }
            }
        }

        nav
    }

    /// Compile and render one page in memory.
    fn render_page(
        &self,
        planned: &PlannedPage<'_>,
        nav: &[NavItem],
    ) -> Result<RenderedPage, BuildError> {
        let page = planned.page;

        let render = self.compiler.compile(page, &self.config.compiler)?;
        let tree = render.render();

        let content = render_html(&tree);
        let chunk = ScriptChunk::emit(planned.chunk_id, page.id(), &tree, self.config.hash_length);

        let toc = page
            .headings()
            .into_iter()
            .filter(|h| (2..=3).contains(&h.level))
            .map(|h| TocEntry {
                title: h.text(),
                id: h.id.clone(),
                level: h.level,
            })
            .collect();

        let context = PageContext {
            title: page.title().to_string(),
            site_title: self.config.title.clone(),
            description: page
                .description()
                .map(str::to_string)
                .or_else(|| self.config.description.clone()),
            content,
            nav: mark_active(nav, &planned.url),
            toc,
            base_url: self.config.base_url.clone(),
            chunk_src: format!("{}{}", self.config.base_url, chunk_path(&chunk)),
        };

        let html = self
            .templates
            .render_page(&context)
            .map_err(|e| BuildError::Template(format!("{}: {}", page.id(), e)))?;

        tracing::debug!(page = page.id(), chunk = chunk.id, "Rendered page");

        Ok(RenderedPage {
            html_path: planned.html_path.clone(),
            html,
            chunk,
        })
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            match AssetPipeline::minify_css(&css) {
                Ok(minified) => minified,
                Err(e) => {
                    tracing::warn!("Serving unminified CSS: {}", e);
                    css
                }
            }
        } else {
            css
        };

        self.write_output("assets/main.css", &css)?;
        self.write_output("assets/main.js", &AssetPipeline::generate_js())
    }

    /// Generate search index.
    fn generate_search_index(&self, pages: &[PlannedPage<'_>]) -> Result<(), BuildError> {
        let index: Vec<serde_json::Value> = pages
            .iter()
            .map(|planned| {
                let page = planned.page;
                let headings: Vec<String> = page.headings().iter().map(|h| h.text()).collect();
                let content: String = page
                    .plain_text()
                    .chars()
                    .take(SEARCH_CONTENT_LIMIT)
                    .collect();

                serde_json::json!({
                    "id": page.id(),
                    "title": page.title(),
                    "description": page.description().unwrap_or_default(),
                    "url": planned.url,
                    "headings": headings,
                    "content": content,
                })
            })
            .collect();

        self.write_json("search-index.json", &index)
    }

    /// Generate sitemap.
    fn generate_sitemap(&self, pages: &[PlannedPage<'_>]) -> Result<(), BuildError> {
        let urls: Vec<String> = pages
            .iter()
            .map(|planned| {
                format!(
                    "  <url>\n    <loc>{}</loc>\n  </url>",
                    escape_text(&format!("{}{}", self.config.site_url, planned.url))
                )
            })
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>
"#,
            urls.join("\n")
        );

        self.write_output("sitemap.xml", &sitemap)?;

        let robots = format!(
            "User-agent: *\nAllow: /\nSitemap: {}{}sitemap.xml\n",
            self.config.site_url, self.config.base_url
        );
        self.write_output("robots.txt", &robots)
    }

    /// Remove chunk files listed in the previous `manifest.json` that this
    /// build no longer produces. Runs before the new manifest is written.
    fn prune_stale_chunks(&self, rendered: &[RenderedPage]) -> Result<(), BuildError> {
        let manifest_path = self.config.output_dir.join("manifest.json");
        let previous = match fs::read_to_string(&manifest_path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                tracing::warn!(
                    "Skipping chunk cleanup, cannot read {}: {}",
                    manifest_path.display(),
                    e
                );
                return Ok(());
            }
        };
        let previous: BTreeMap<String, ManifestEntry> = match serde_json::from_str(&previous) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(
                    "Skipping chunk cleanup, invalid {}: {}",
                    manifest_path.display(),
                    e
                );
                return Ok(());
            }
        };

        let current: HashSet<String> = rendered
            .iter()
            .map(|page| chunk_path(&page.chunk))
            .collect();

        for entry in previous.values() {
            let file = entry.chunk_file.as_str();
            if current.contains(file)
                || !file.starts_with("assets/js/")
                || !is_relative_normal(file)
            {
                continue;
            }

            let path = self.config.output_dir.join(file);
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(chunk = file, "Removed stale chunk"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(BuildError::Write {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })
                }
            }
        }

        Ok(())
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        relative: &str,
        value: &T,
    ) -> Result<(), BuildError> {
        let json = serde_json::to_string_pretty(value).map_err(|e| BuildError::Write {
            path: relative.to_string(),
            message: e.to_string(),
        })?;
        self.write_output(relative, &json)
    }

    /// Write a file below the output directory, creating parent directories.
    fn write_output(&self, relative: &str, contents: &str) -> Result<(), BuildError> {
        let path = self.config.output_dir.join(relative);
        let to_error = |e: std::io::Error| BuildError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(to_error)?;
        }
        fs::write(&path, contents).map_err(to_error)
    }
}

/// Output path of a page: its slug or id, with `.html` appended.
///
/// The path must stay below the output directory.
fn html_path(page: &PageDescriptor) -> Result<String, BuildError> {
    let stem = page
        .slug()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| page.id());

    if !is_relative_normal(stem) {
        return Err(BuildError::InvalidOutputPath {
            page: page.id().to_string(),
            path: stem.to_string(),
        });
    }

    Ok(if stem.ends_with(".html") {
        stem.to_string()
    } else {
        format!("{}.html", stem)
    })
}

/// True for a non-empty relative path made only of plain file names.
fn is_relative_normal(path: &str) -> bool {
    let mut components = Path::new(path).components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

fn chunk_path(chunk: &ScriptChunk) -> String {
    format!("assets/js/{}", chunk.file_name())
}

/// Copy of the sidebar with the current page's entry marked.
fn mark_active(nav: &[NavItem], url: &str) -> Vec<NavItem> {
    nav.iter()
        .map(|item| NavItem {
            title: item.title.clone(),
            path: item.path.clone(),
            children: mark_active(&item.children, url),
            active: item.children.is_empty() && item.path == url,
        })
        .collect()
}

/// Capitalize first letter of a string.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
