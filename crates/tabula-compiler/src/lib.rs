//! Template compiler for tabula pages.
//!
//! Turns a [`PageDescriptor`](tabula_content::PageDescriptor) into a
//! [`RenderFn`]: a pure function that builds a fresh [`ElementNode`] tree each
//! time it is invoked.

pub mod default;
pub mod links;
pub mod node;
pub mod render_fn;
pub mod traits;
pub mod validate;

pub use default::DefaultCompiler;
pub use node::{ElementNode, Node};
pub use render_fn::RenderFn;
pub use traits::{CompileContext, PageCompiler};
pub use validate::validate_page;

use tabula_content::{ContentError, PageDescriptor};

/// Compile a page with the default compiler and context.
pub fn compile(page: &PageDescriptor) -> Result<RenderFn, ContentError> {
    DefaultCompiler::new().compile(page, &CompileContext::default())
}
