//! Compiler seam and its context.

use serde::Deserialize;
use tabula_content::{ContentError, PageDescriptor};

use crate::render_fn::RenderFn;

/// Options shared by every page compiled in one build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompileContext {
    /// Text of the anchor link placed inside headings
    pub anchor_symbol: String,

    /// Open external links in a new tab and mark them with an outbound icon
    pub outbound_links: bool,

    /// Rewrite relative links to `.md` sources into `.html` pages
    pub rewrite_markdown_links: bool,
}

impl Default for CompileContext {
    fn default() -> Self {
        Self {
            anchor_symbol: "#".to_string(),
            outbound_links: true,
            rewrite_markdown_links: true,
        }
    }
}

/// Compiles page descriptors into render functions.
pub trait PageCompiler: Send + Sync {
    /// Compiler identifier (e.g., "default")
    fn name(&self) -> &'static str;

    /// Compile a page.
    ///
    /// Fails with a [`ContentError`] naming the offending block when the
    /// descriptor is malformed. Compilation has no side effects.
    fn compile(
        &self,
        page: &PageDescriptor,
        ctx: &CompileContext,
    ) -> Result<RenderFn, ContentError>;
}
