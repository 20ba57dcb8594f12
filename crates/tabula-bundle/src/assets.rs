//! Site-wide stylesheet and hydration runtime.

use crate::chunk::JSONP_GLOBAL;

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the runtime that mounts page chunks.
    pub fn generate_js() -> String {
        DEFAULT_JS.replace("__JSONP__", JSONP_GLOBAL)
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* Tabula default theme */

:root {
  --sidebar-width: 260px;
  --toc-width: 200px;
  --content-max-width: 860px;
  --background: #ffffff;
  --foreground: #1f2328;
  --muted: #f6f8fa;
  --muted-foreground: #59636e;
  --border: #d1d9e0;
  --primary: #0969da;
  --tip: #1a7f37;
  --warning: #9a6700;
  --danger: #d1242f;
  --radius: 6px;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

.layout {
  display: grid;
  grid-template-columns: var(--sidebar-width) 1fr;
  min-height: 100vh;
}

/* Sidebar */
.sidebar {
  background: var(--muted);
  border-right: 1px solid var(--border);
  padding: 1.5rem;
  position: sticky;
  top: 0;
  height: 100vh;
  overflow-y: auto;
}

.nav-header {
  margin-bottom: 1.5rem;
}

.nav-logo {
  font-weight: 700;
  font-size: 1.125rem;
  color: var(--foreground);
  text-decoration: none;
}

.nav-list,
.nav-children {
  list-style: none;
}

.nav-children {
  padding-left: 1rem;
}

.nav-item a {
  display: block;
  padding: 0.25rem 0;
  color: var(--muted-foreground);
  text-decoration: none;
}

.nav-item.active > a {
  color: var(--primary);
  font-weight: 600;
}

.main {
  display: grid;
  grid-template-columns: 1fr var(--toc-width);
  gap: 2rem;
  padding: 2rem 3rem;
}

/* Page content */
.content {
  max-width: var(--content-max-width);
}

.content h1 {
  font-size: 2rem;
  margin-bottom: 1rem;
}

.content h2 {
  font-size: 1.5rem;
  margin: 2rem 0 1rem;
  padding-bottom: 0.5rem;
  border-bottom: 1px solid var(--border);
}

.content h3 {
  font-size: 1.25rem;
  margin: 1.5rem 0 0.75rem;
}

.content p,
.content ul,
.content ol,
.content blockquote {
  margin-bottom: 1rem;
}

.content ul,
.content ol {
  padding-left: 1.5rem;
}

.content blockquote {
  padding-left: 1rem;
  border-left: 4px solid var(--border);
  color: var(--muted-foreground);
}

.content a {
  color: var(--primary);
  text-underline-offset: 4px;
}

.header-anchor {
  float: left;
  margin-left: -0.9em;
  padding-right: 0.2em;
  opacity: 0;
  text-decoration: none;
}

h1:hover .header-anchor,
h2:hover .header-anchor,
h3:hover .header-anchor,
h4:hover .header-anchor,
h5:hover .header-anchor,
h6:hover .header-anchor {
  opacity: 1;
}

.outbound-link {
  font-size: 0.75em;
  margin-left: 0.125em;
}

/* Tables */
.content table {
  border-collapse: collapse;
  display: block;
  overflow-x: auto;
  margin-bottom: 1rem;
}

.content th,
.content td {
  border: 1px solid var(--border);
  padding: 0.5rem 1rem;
}

.content tr:nth-child(2n) {
  background: var(--muted);
}

/* Code blocks */
.content pre {
  background: var(--muted);
  border-radius: var(--radius);
  padding: 1rem;
  overflow-x: auto;
  font-family: ui-monospace, monospace;
  font-size: 0.875rem;
  margin-bottom: 1rem;
}

.content code {
  font-family: ui-monospace, monospace;
  font-size: 0.875em;
  background: var(--muted);
  padding: 0.125rem 0.375rem;
  border-radius: 0.25rem;
}

.content pre code {
  background: none;
  padding: 0;
}

/* Custom blocks */
.custom-block {
  margin: 1rem 0;
  padding: 0.5rem 1rem;
  border-left: 4px solid var(--border);
  border-radius: var(--radius);
  background: var(--muted);
}

.custom-block.tip {
  border-color: var(--tip);
}

.custom-block.warning {
  border-color: var(--warning);
}

.custom-block.danger {
  border-color: var(--danger);
}

.custom-block-title {
  font-weight: 600;
  margin-bottom: 0.25rem;
}

.custom-block.details summary {
  cursor: pointer;
}

/* Table of contents */
.toc {
  position: sticky;
  top: 2rem;
  align-self: start;
}

.toc-title {
  font-size: 0.75rem;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--muted-foreground);
  margin-bottom: 0.75rem;
}

.toc ul {
  list-style: none;
}

.toc a {
  font-size: 0.875rem;
  color: var(--muted-foreground);
  text-decoration: none;
}

.toc-level-3 {
  padding-left: 1rem;
}

@media (max-width: 1024px) {
  .layout,
  .main {
    grid-template-columns: 1fr;
  }

  .sidebar {
    position: static;
    height: auto;
  }

  .toc {
    display: none;
  }
}
"#;

const DEFAULT_JS: &str = r#"// Tabula runtime: mounts page chunks
(function() {
  'use strict';

  function h(tag, attrs, children) {
    var el = document.createElement(tag);
    Object.keys(attrs).forEach(function(name) {
      el.setAttribute(name, attrs[name]);
    });
    children.forEach(function(child) {
      el.appendChild(typeof child === 'string' ? document.createTextNode(child) : child);
    });
    return el;
  }

  function mount(entry) {
    var modules = entry[1];
    Object.keys(modules).forEach(function(id) {
      var module = { exports: {} };
      modules[id](module, module.exports);
      var exports = module.exports;
      if (typeof exports.default !== 'function') return;

      var selector = '.content[data-page="' + String(exports.page).replace(/"/g, '\\"') + '"]';
      var target = document.querySelector(selector);
      if (target) {
        target.replaceWith(exports.default(h));
      }
    });
  }

  var queue = window.__JSONP__ = window.__JSONP__ || [];

  function flush() {
    queue.forEach(mount);
    queue.length = 0;
    queue.push = function(entry) {
      mount(entry);
      return 0;
    };
  }

  if (document.readyState === 'loading') {
    document.addEventListener('DOMContentLoaded', flush);
  } else {
    flush();
  }
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_css() {
        let css = AssetPipeline::generate_css();
        assert!(css.contains(":root"));
        assert!(css.contains(".header-anchor"));
        assert!(css.contains(".custom-block.tip"));
        assert!(css.contains(".outbound-link"));
    }

    #[test]
    fn default_css_minifies() {
        let minified = AssetPipeline::minify_css(&AssetPipeline::generate_css()).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".custom-block-title"));
    }

    #[test]
    fn generates_runtime_for_chunk_global() {
        let js = AssetPipeline::generate_js();
        assert!(js.contains("window.tabulaJsonp = window.tabulaJsonp || []"));
        assert!(js.contains("exports.default(h)"));
        assert!(!js.contains("__JSONP__"));
    }

    #[test]
    fn minifies_css() {
        let css = r#"
.button {
    background-color: blue;
    padding: 10px;
}
        "#;

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".button"));
    }
}
