//! Build configuration and `site.toml` loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tabula_compiler::CompileContext;

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source content directory
    pub content_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Site title
    pub title: String,

    /// Site description for meta tags
    pub description: Option<String>,

    /// Base path the site is served under; always starts and ends with `/`
    pub base_url: String,

    /// Origin used for absolute sitemap URLs (e.g. `https://docs.example.com`)
    pub site_url: String,

    /// Minify CSS output
    pub minify: bool,

    /// Chunk id given to the first page
    pub first_chunk_id: u32,

    /// Hex characters of the content hash kept in chunk file names
    pub hash_length: usize,

    /// Options passed to the page compiler
    pub compiler: CompileContext,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("dist"),
            title: "Documentation".to_string(),
            description: None,
            base_url: "/".to_string(),
            site_url: String::new(),
            minify: true,
            first_chunk_id: 1,
            hash_length: 8,
            compiler: CompileContext::default(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration file structure (site.toml).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    site: SiteSection,
    #[serde(default)]
    content: ContentSection,
    #[serde(default)]
    build: BuildSection,
    #[serde(default)]
    compiler: Option<CompileContext>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SiteSection {
    title: Option<String>,
    description: Option<String>,
    base_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ContentSection {
    dir: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct BuildSection {
    output: Option<String>,
    minify: Option<bool>,
    first_chunk_id: Option<u32>,
    hash_length: Option<usize>,
}

impl BuildConfig {
    /// Parse a `site.toml` document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let defaults = Self::default();

        let config = Self {
            content_dir: file
                .content
                .dir
                .map(PathBuf::from)
                .unwrap_or(defaults.content_dir),
            output_dir: file
                .build
                .output
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            title: file.site.title.unwrap_or(defaults.title),
            description: file.site.description,
            base_url: normalize_base_url(&file.site.base_url.unwrap_or(defaults.base_url)),
            site_url: file
                .site
                .url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_url),
            minify: file.build.minify.unwrap_or(defaults.minify),
            first_chunk_id: file.build.first_chunk_id.unwrap_or(defaults.first_chunk_id),
            hash_length: file.build.hash_length.unwrap_or(defaults.hash_length),
            compiler: file.compiler.unwrap_or(defaults.compiler),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load a config file. Relative directories resolve against the file's
    /// own directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut config = Self::from_toml_str(&source)?;

        if let Some(dir) = path.parent() {
            if config.content_dir.is_relative() {
                config.content_dir = dir.join(&config.content_dir);
            }
            if config.output_dir.is_relative() {
                config.output_dir = dir.join(&config.output_dir);
            }
        }

        tracing::info!("Loaded config from {}", path.display());

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.hash_length == 0 || self.hash_length > 64 {
            return Err(ConfigError::Invalid(format!(
                "build.hash_length must be between 1 and 64, got {}",
                self.hash_length
            )));
        }
        Ok(())
    }
}

/// Ensure a base URL starts and ends with `/`.
pub fn normalize_base_url(base: &str) -> String {
    let trimmed = base.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_config_uses_defaults() {
        let config = BuildConfig::from_toml_str("").unwrap();

        assert_eq!(config.content_dir, PathBuf::from("docs"));
        assert_eq!(config.output_dir, PathBuf::from("dist"));
        assert_eq!(config.base_url, "/");
        assert_eq!(config.first_chunk_id, 1);
        assert_eq!(config.hash_length, 8);
        assert!(config.minify);
    }

    #[test]
    fn reads_all_sections() {
        let source = r##"
[site]
title = "Ledger API"
base_url = "docs"
url = "https://docs.example.com/"

[content]
dir = "content"

[build]
output = "public"
minify = false
first_chunk_id = 78
hash_length = 12

[compiler]
anchor_symbol = "¶"
"##;

        let config = BuildConfig::from_toml_str(source).unwrap();

        assert_eq!(config.title, "Ledger API");
        assert_eq!(config.base_url, "/docs/");
        assert_eq!(config.site_url, "https://docs.example.com");
        assert_eq!(config.content_dir, PathBuf::from("content"));
        assert_eq!(config.output_dir, PathBuf::from("public"));
        assert!(!config.minify);
        assert_eq!(config.first_chunk_id, 78);
        assert_eq!(config.hash_length, 12);
        assert_eq!(config.compiler.anchor_symbol, "¶");
        assert!(config.compiler.outbound_links);
    }

    #[test]
    fn rejects_bad_hash_length() {
        let err = BuildConfig::from_toml_str("[build]\nhash_length = 0\n").unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = BuildConfig::from_toml_str("[site]\ntheme = \"dark\"\n").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn from_file_resolves_relative_dirs() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("site.toml");
        fs::write(&path, "[content]\ndir = \"pages\"\n").unwrap();

        let config = BuildConfig::from_file(&path).unwrap();

        assert_eq!(config.content_dir, temp.path().join("pages"));
        assert_eq!(config.output_dir, temp.path().join("dist"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = BuildConfig::from_file(Path::new("/nonexistent/site.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn normalizes_base_urls() {
        assert_eq!(normalize_base_url(""), "/");
        assert_eq!(normalize_base_url("/"), "/");
        assert_eq!(normalize_base_url("docs"), "/docs/");
        assert_eq!(normalize_base_url("/a/b"), "/a/b/");
    }
}
