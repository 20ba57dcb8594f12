//! Descriptor validation.

use tabula_content::{BlockPath, ContentBlock, ContentError, PageDescriptor, Table};

/// Check a page for malformed blocks.
///
/// Returns the first problem found in document order.
pub fn validate_page(page: &PageDescriptor) -> Result<(), ContentError> {
    validate_blocks(page.id(), page.blocks(), None)
}

fn validate_blocks(
    page: &str,
    blocks: &[ContentBlock],
    parent: Option<&BlockPath>,
) -> Result<(), ContentError> {
    for (index, block) in blocks.iter().enumerate() {
        let path = match parent {
            Some(parent) => parent.child(index),
            None => BlockPath::root(index),
        };

        match block {
            ContentBlock::Heading(heading) if !(1..=6).contains(&heading.level) => {
                return Err(ContentError::InvalidHeading {
                    page: page.to_string(),
                    block: path,
                    level: heading.level,
                });
            }
            ContentBlock::Table(table) => validate_table(page, table, path)?,
            ContentBlock::Container(container) => {
                validate_blocks(page, &container.blocks, Some(&path))?
            }
            ContentBlock::Quote(inner) => validate_blocks(page, inner, Some(&path))?,
            ContentBlock::List(list) => {
                for (item_index, item) in list.items.iter().enumerate() {
                    validate_blocks(page, item, Some(&path.child(item_index)))?;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Body rows are numbered from 1 in errors.
fn validate_table(page: &str, table: &Table, block: BlockPath) -> Result<(), ContentError> {
    let columns = table.columns();

    if columns == 0 {
        return Err(ContentError::EmptyTable {
            page: page.to_string(),
            block,
        });
    }

    if !table.alignments.is_empty() && table.alignments.len() != columns {
        return Err(ContentError::AlignmentMismatch {
            page: page.to_string(),
            block,
            expected: columns,
            found: table.alignments.len(),
        });
    }

    if let Some((index, row)) = table
        .rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != columns)
    {
        return Err(ContentError::MalformedTable {
            page: page.to_string(),
            block,
            row: index + 1,
            expected: columns,
            found: row.len(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_content::{Alignment, Container, ContainerKind, Heading};

    fn page(blocks: Vec<ContentBlock>) -> PageDescriptor {
        PageDescriptor::new("models", blocks)
    }

    #[test]
    fn accepts_well_formed_table() {
        let table = Table::from_rows(vec![vec!["a", "b"], vec!["1", "2"]]);

        assert!(validate_page(&page(vec![ContentBlock::Table(table)])).is_ok());
    }

    #[test]
    fn rejects_ragged_row_with_block_path() {
        let ragged = Table::from_rows(vec![vec!["a", "b"], vec!["1", "2"], vec!["3"]]);
        let blocks = vec![
            ContentBlock::Rule,
            ContentBlock::Container(Container {
                kind: ContainerKind::Tip,
                title: "TIP".to_string(),
                blocks: vec![ContentBlock::Table(ragged)],
            }),
        ];

        let err = validate_page(&page(blocks)).unwrap_err();

        match err {
            ContentError::MalformedTable {
                page,
                block,
                row,
                expected,
                found,
            } => {
                assert_eq!(page, "models");
                assert_eq!(block.to_string(), "2.1");
                assert_eq!((row, expected, found), (2, 2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_empty_table() {
        let table = Table::from_rows(Vec::<Vec<String>>::new());

        let err = validate_page(&page(vec![ContentBlock::Table(table)])).unwrap_err();

        assert!(matches!(err, ContentError::EmptyTable { .. }));
    }

    #[test]
    fn rejects_alignment_mismatch() {
        let table = Table::from_rows(vec![vec!["a", "b"]]).with_alignments(vec![Alignment::Left]);

        let err = validate_page(&page(vec![ContentBlock::Table(table)])).unwrap_err();

        assert!(matches!(
            err,
            ContentError::AlignmentMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_heading_level() {
        let heading = ContentBlock::Heading(Heading {
            level: 7,
            id: "x".to_string(),
            content: vec![],
        });

        let err = validate_page(&page(vec![heading])).unwrap_err();

        assert!(matches!(err, ContentError::InvalidHeading { level: 7, .. }));
        assert_eq!(err.block().map(|b| b.to_string()), Some("1".to_string()));
    }
}
