//! # Block Isolation
//!
//! Rewrites the annotated source into a single-color variant for one group
//! by commenting out every statement tagged with a different color.
//!
//! ## Statement Span
//!
//! A neutralized statement starts at its `color(...)` line and is consumed
//! one physical line at a time with a brace counter:
//!
//! ```text
//! color("red") {        depth 1
//!     cube(1);          depth 1, `;` inside a block → continue
//! }                     depth 0, block closed → end
//! ```
//!
//! A line ends the statement when it contains `;` at depth <= 0, or when it
//! closes the block the statement opened. Counting is per line, not per
//! character position.

use config::constants::COMMENT_PREFIX;
use pipeline_types::ColorKey;

use crate::error::IsolationError;
use crate::invocation::color_invocation;
use crate::scanner::AnnotatedSource;

/// How color invocations owned by other groups are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ForeignGroupPolicy {
    /// Copy them verbatim; only the target group's lines are isolated.
    #[default]
    Preserve,
    /// Comment them out regardless of color.
    Neutralize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsolationOptions {
    pub foreign_groups: ForeignGroupPolicy,
}

/// One (group, color) pair, addressed by discovery indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IsolationUnit {
    pub group_index: usize,
    pub color_index: usize,
}

/// A rewritten source ready for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolatedVariant {
    pub unit: IsolationUnit,
    lines: Vec<String>,
}

impl IsolatedVariant {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Newline-terminated source text.
    pub fn to_source(&self) -> String {
        let mut text = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

impl AnnotatedSource {
    /// Every (group, color) pair, group-major, in discovery order.
    pub fn units(&self) -> impl Iterator<Item = IsolationUnit> + '_ {
        (0..self.groups().len()).flat_map(move |group_index| {
            (0..self.colors().len()).map(move |color_index| IsolationUnit {
                group_index,
                color_index,
            })
        })
    }
}

/// Neutralization state of a statement being commented out.
#[derive(Debug, Clone, Copy)]
struct Statement {
    start_line: usize,
    depth: i64,
    opened_block: bool,
}

impl Statement {
    fn new(start_line: usize) -> Self {
        Self {
            start_line,
            depth: 0,
            opened_block: false,
        }
    }

    /// Feeds one line; returns true when the statement ends on it.
    fn consume(&mut self, text: &str) -> bool {
        let opens = text.matches('{').count() as i64;
        let closes = text.matches('}').count() as i64;
        self.depth += opens - closes;
        self.opened_block |= opens > 0;

        let settled = self.depth <= 0;
        (settled && text.contains(';')) || (settled && self.opened_block && closes > 0)
    }
}

enum State {
    Scanning,
    InColorBlock(Statement),
}

/// Produces the variant of `source` for `unit`.
///
/// # Example
///
/// ```rust
/// use openscad_annotate::{isolate, scan, IsolationOptions, IsolationUnit, PropertyOverrides};
///
/// let source = "color(\"red\") cube(1);\ncolor(\"blue\") {\n  sphere(1);\n}\n";
/// let annotated = scan(source, &PropertyOverrides::new());
/// let unit = IsolationUnit { group_index: 0, color_index: 0 };
/// let variant = isolate(&annotated, unit, IsolationOptions::default()).unwrap();
///
/// assert_eq!(
///     variant.lines(),
///     ["color(\"red\") cube(1);", "//color(\"blue\") {", "//  sphere(1);", "//}"]
/// );
/// ```
pub fn isolate(
    source: &AnnotatedSource,
    unit: IsolationUnit,
    options: IsolationOptions,
) -> Result<IsolatedVariant, IsolationError> {
    let group = source
        .group(unit.group_index)
        .ok_or(IsolationError::UnknownGroup(unit.group_index))?;
    let target = source
        .color(unit.color_index)
        .ok_or(IsolationError::UnknownColor(unit.color_index))?;

    let group_of = source.group_of();
    let mut lines = Vec::with_capacity(source.line_count());
    let mut state = State::Scanning;

    for (index, line) in source.lines().iter().enumerate() {
        let text = line.text.as_str();
        state = match state {
            State::Scanning => {
                let in_group = group_of[index] == unit.group_index;
                if neutralizes(text, in_group, target, options) {
                    lines.push(format!("{COMMENT_PREFIX}{text}"));
                    let mut statement = Statement::new(index);
                    if statement.consume(text) {
                        State::Scanning
                    } else {
                        State::InColorBlock(statement)
                    }
                } else {
                    lines.push(text.to_string());
                    State::Scanning
                }
            }
            State::InColorBlock(mut statement) => {
                lines.push(format!("{COMMENT_PREFIX}{text}"));
                if statement.consume(text) {
                    State::Scanning
                } else {
                    State::InColorBlock(statement)
                }
            }
        };
    }

    if let State::InColorBlock(statement) = state {
        return Err(IsolationError::UnterminatedStatement {
            start_line: statement.start_line,
            group: group.name.clone(),
            color: target.to_string(),
        });
    }

    tracing::debug!(
        group = %group.name,
        color = %target,
        lines = lines.len(),
        "isolated variant"
    );

    Ok(IsolatedVariant { unit, lines })
}

/// Decides whether the statement starting on `text` is commented out.
fn neutralizes(text: &str, in_group: bool, target: &ColorKey, options: IsolationOptions) -> bool {
    let Some(Ok(color)) = color_invocation(text) else {
        return false;
    };
    if in_group {
        color != *target
    } else {
        options.foreign_groups == ForeignGroupPolicy::Neutralize
    }
}
