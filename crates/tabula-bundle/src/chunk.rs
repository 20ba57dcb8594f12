//! Per-page script chunks.
//!
//! A chunk carries one page's render function as JavaScript, registered under
//! its numeric chunk id:
//!
//! ```text
//! (window.tabulaJsonp=window.tabulaJsonp||[]).push([[3],{3:function(module,exports){
//!   "use strict";exports.page="api/models";exports.default=function(h){return h("div",{...},[...])}
//! }}]);
//! ```
//!
//! The runtime in `assets/main.js` supplies `h` and swaps the rendered tree in
//! for the server-rendered page content.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tabula_compiler::{ElementNode, Node};

/// Global the chunks push themselves onto.
pub const JSONP_GLOBAL: &str = "tabulaJsonp";

/// A script chunk for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptChunk {
    /// Numeric chunk id
    pub id: u32,
    /// Truncated SHA-256 of the source, in hex
    pub hash: String,
    /// JavaScript source
    pub source: String,
}

impl ScriptChunk {
    /// Emit the chunk for a rendered page tree.
    pub fn emit(id: u32, page_id: &str, root: &ElementNode, hash_length: usize) -> Self {
        let mut expr = String::new();
        push_element_expr(root, &mut expr);

        let source = format!(
            "(window.{global}=window.{global}||[]).push([[{id}],{{{id}:function(module,exports){{\"use strict\";exports.page={page};exports.default=function(h){{return {expr}}}}}}}]);",
            global = JSONP_GLOBAL,
            id = id,
            page = js_string(page_id),
            expr = expr,
        );

        let digest = format!("{:x}", Sha256::digest(source.as_bytes()));
        let hash = digest.chars().take(hash_length).collect();

        Self { id, hash, source }
    }

    /// File name under `assets/js/`.
    pub fn file_name(&self) -> String {
        format!("{}.{}.js", self.id, self.hash)
    }
}

fn push_element_expr(element: &ElementNode, out: &mut String) {
    let attrs: Map<String, Value> = element
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    out.push_str("h(");
    out.push_str(&js_string(&element.tag));
    out.push(',');
    out.push_str(&Value::Object(attrs).to_string());
    out.push_str(",[");

    for (index, child) in element.children.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        match child {
            Node::Element(e) => push_element_expr(e, out),
            Node::Text(text) => out.push_str(&js_string(text)),
        }
    }

    out.push_str("])");
}

/// JSON string literals are valid JavaScript string literals.
fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}
