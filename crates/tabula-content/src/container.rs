//! `:::` custom container blocks.
//!
//! Containers are cut out of the markdown source before it reaches
//! pulldown-cmark, which has no notion of them:
//!
//! ```text
//! ::: tip Maintainer
//! Body **markdown**.
//! :::
//! ```

use crate::descriptor::ContainerKind;
use crate::error::ContentError;

/// A piece of markdown source, either plain or wrapped in a container.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Markdown(String),
    Container {
        kind: ContainerKind,
        title: Option<String>,
        body: String,
        /// Line of the opening fence (1-indexed); the body starts on the next line
        line: usize,
    },
}

/// Parse a container opener such as `::: warning Careful`.
pub fn parse_opener(line: &str) -> Option<(ContainerKind, Option<String>)> {
    let rest = line.trim().strip_prefix(":::")?.trim();
    if rest.is_empty() {
        return None;
    }

    let (name, title) = match rest.split_once(char::is_whitespace) {
        Some((name, title)) => (name, Some(title.trim().to_string())),
        None => (rest, None),
    };

    let kind = ContainerKind::from_name(name)?;
    Some((kind, title.filter(|t| !t.is_empty())))
}

fn is_closer(line: &str) -> bool {
    line.trim() == ":::"
}

/// Any `:::` line with a name, known kind or not. Nesting depth counts these
/// so that the closer of an unknown container is not taken for ours.
fn is_any_opener(line: &str) -> bool {
    line.trim()
        .strip_prefix(":::")
        .is_some_and(|rest| !rest.trim().is_empty())
}

/// Leading fence run of `line`: the fence character, its length and the
/// text after it.
fn fence_run(line: &str) -> Option<(char, usize, &str)> {
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let length = trimmed.chars().take_while(|c| *c == marker).count();
    if length < 3 {
        return None;
    }
    Some((marker, length, &trimmed[length..]))
}

/// Tracks fenced code so container markers inside code are left alone.
#[derive(Default)]
struct FenceState {
    /// Fence character and run length of the open fence
    open: Option<(char, usize)>,
}

impl FenceState {
    /// Update state for `line`; returns true while inside a code fence
    /// (including the fence lines themselves).
    ///
    /// A fence closes on a run of the same character at least as long as
    /// the opening run, with nothing but whitespace after it.
    fn advance(&mut self, line: &str) -> bool {
        let run = fence_run(line);

        match (self.open, run) {
            (Some((marker, length)), Some((c, n, rest)))
                if c == marker && n >= length && rest.trim().is_empty() =>
            {
                self.open = None;
                true
            }
            (Some(_), _) => true,
            (None, Some((c, n, _))) => {
                self.open = Some((c, n));
                true
            }
            (None, None) => false,
        }
    }
}

/// Split `source` into top-level segments. Nested containers stay inside the
/// body of their parent and are split when the body is loaded.
///
/// `line_offset` is added to reported line numbers.
pub fn split_containers(
    page: &str,
    source: &str,
    line_offset: usize,
) -> Result<Vec<Segment>, ContentError> {
    let mut segments = Vec::new();
    let mut markdown = String::new();
    let mut fence = FenceState::default();

    // (kind, title, body, opener line, depth)
    let mut open: Option<(ContainerKind, Option<String>, String, usize, usize)> = None;

    for (index, line) in source.lines().enumerate() {
        let line_no = line_offset + index + 1;
        let in_code = fence.advance(line);

        match open.as_mut() {
            None => {
                if !in_code {
                    if let Some((kind, title)) = parse_opener(line) {
                        if !markdown.is_empty() {
                            segments.push(Segment::Markdown(std::mem::take(&mut markdown)));
                        }
                        open = Some((kind, title, String::new(), line_no, 1));
                        continue;
                    }
                }
                markdown.push_str(line);
                markdown.push('\n');
            }
            Some((_, _, body, _, depth)) => {
                if !in_code && is_any_opener(line) {
                    *depth += 1;
                } else if !in_code && is_closer(line) {
                    *depth -= 1;
                    if *depth == 0 {
                        if let Some((kind, title, body, line, _)) = open.take() {
                            segments.push(Segment::Container {
                                kind,
                                title,
                                body,
                                line,
                            });
                        }
                        continue;
                    }
                }
                body.push_str(line);
                body.push('\n');
            }
        }
    }

    if let Some((_, _, _, line, _)) = open {
        return Err(ContentError::UnclosedContainer {
            page: page.to_string(),
            line,
        });
    }

    if !markdown.is_empty() {
        segments.push(Segment::Markdown(markdown));
    }

    Ok(segments)
}
