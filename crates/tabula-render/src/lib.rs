//! Renderer for tabula element trees.
//!
//! Serializes [`ElementNode`](tabula_compiler::ElementNode) trees to HTML or
//! to a sequence of DOM mutation operations. Child order is preserved exactly;
//! attributes are emitted in sorted order so output is deterministic.

pub mod dom;
pub mod error;
pub mod html;
pub mod table;

pub use dom::{dom_ops, rebuild, DomOp};
pub use error::RenderError;
pub use html::{escape_attr, escape_text, render_html, write_html};
pub use table::{parse_tables, ParsedTable};
