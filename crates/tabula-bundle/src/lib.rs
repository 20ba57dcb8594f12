//! Static site bundler for tabula.
//!
//! Writes one HTML document and one script chunk per page, plus the shared
//! stylesheet, hydration runtime, manifest, search index and sitemap.

pub mod assets;
pub mod builder;
pub mod chunk;
pub mod config;
pub mod templates;

pub use assets::AssetPipeline;
pub use builder::{BuildError, BuildResult, ManifestEntry, SiteBuilder};
pub use chunk::{ScriptChunk, JSONP_GLOBAL};
pub use config::{normalize_base_url, BuildConfig, ConfigError};
pub use templates::{NavItem, PageContext, TemplateEngine, TocEntry};
