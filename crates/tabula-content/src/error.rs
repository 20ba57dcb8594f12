//! Content error taxonomy.

use std::fmt;

use crate::frontmatter::FrontmatterError;

/// Position of a block inside a page.
///
/// Indices are stored zero-based and displayed one-based, with nested blocks
/// joined by dots (`2.1` is the first block inside the second top-level block).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockPath(Vec<usize>);

impl BlockPath {
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    /// Path of a block nested under this one.
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for BlockPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| (i + 1).to_string()).collect();
        f.write_str(&parts.join("."))
    }
}

/// Errors raised for malformed content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Frontmatter error in {page}: {source}")]
    Frontmatter {
        page: String,
        #[source]
        source: FrontmatterError,
    },

    #[error("Invalid page descriptor {page}: {message}")]
    Descriptor { page: String, message: String },

    #[error("Unclosed container in {page} opened at line {line}")]
    UnclosedContainer { page: String, line: usize },

    #[error("Failed to read {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("{page}: block {block}: table row {row} has {found} cells, expected {expected}")]
    MalformedTable {
        page: String,
        block: BlockPath,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{page}: block {block}: table has no header row")]
    EmptyTable { page: String, block: BlockPath },

    #[error("{page}: block {block}: {found} column alignments for {expected} columns")]
    AlignmentMismatch {
        page: String,
        block: BlockPath,
        expected: usize,
        found: usize,
    },

    #[error("{page}: block {block}: heading level {level} is outside 1..=6")]
    InvalidHeading {
        page: String,
        block: BlockPath,
        level: u8,
    },
}

impl ContentError {
    /// The offending block, for errors tied to one.
    pub fn block(&self) -> Option<&BlockPath> {
        match self {
            Self::MalformedTable { block, .. }
            | Self::EmptyTable { block, .. }
            | Self::AlignmentMismatch { block, .. }
            | Self::InvalidHeading { block, .. } => Some(block),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_path_displays_one_based() {
        let path = BlockPath::root(1).child(0);

        assert_eq!(path.to_string(), "2.1");
        assert_eq!(path.indices(), &[1, 0]);
    }

    #[test]
    fn malformed_table_names_block() {
        let err = ContentError::MalformedTable {
            page: "api/models".to_string(),
            block: BlockPath::root(3),
            row: 2,
            expected: 3,
            found: 2,
        };

        assert_eq!(
            err.to_string(),
            "api/models: block 4: table row 2 has 2 cells, expected 3"
        );
        assert_eq!(err.block(), Some(&BlockPath::root(3)));
    }
}
