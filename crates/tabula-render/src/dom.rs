//! DOM mutation sequences.

use serde::Serialize;
use tabula_compiler::{ElementNode, Node};

/// One DOM mutation.
///
/// Operations drive a stack machine: `CreateElement` opens a new element as
/// the last child of the current one, `SetAttribute` and `AppendText` apply
/// to the current element, and `CloseElement` returns to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DomOp {
    CreateElement { tag: String },
    SetAttribute { name: String, value: String },
    AppendText { text: String },
    CloseElement,
}

/// Flatten a tree into DOM operations in document order.
pub fn dom_ops(root: &ElementNode) -> Vec<DomOp> {
    let mut ops = Vec::new();
    push_ops(root, &mut ops);
    ops
}

fn push_ops(element: &ElementNode, ops: &mut Vec<DomOp>) {
    ops.push(DomOp::CreateElement {
        tag: element.tag.clone(),
    });

    for (name, value) in &element.attributes {
        ops.push(DomOp::SetAttribute {
            name: name.clone(),
            value: value.clone(),
        });
    }

    for child in &element.children {
        match child {
            Node::Element(e) => push_ops(e, ops),
            Node::Text(text) => ops.push(DomOp::AppendText { text: text.clone() }),
        }
    }

    ops.push(DomOp::CloseElement);
}

/// Replay operations into a tree.
///
/// Returns `None` for sequences that do not describe exactly one balanced
/// root element.
pub fn rebuild(ops: &[DomOp]) -> Option<ElementNode> {
    let mut stack: Vec<ElementNode> = Vec::new();
    let mut root = None;

    for op in ops {
        if root.is_some() {
            return None;
        }

        match op {
            DomOp::CreateElement { tag } => stack.push(ElementNode::new(tag.as_str())),
            DomOp::SetAttribute { name, value } => {
                stack
                    .last_mut()?
                    .attributes
                    .insert(name.clone(), value.clone());
            }
            DomOp::AppendText { text } => {
                stack.last_mut()?.children.push(Node::Text(text.clone()));
            }
            DomOp::CloseElement => {
                let done = stack.pop()?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(done)),
                    None => root = Some(done),
                }
            }
        }
    }

    if stack.is_empty() {
        root
    } else {
        None
    }
}
