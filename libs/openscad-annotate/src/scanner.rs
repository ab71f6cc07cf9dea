//! # Annotation Scanner
//!
//! One pass over the source that discovers groups, colors, and extern
//! properties, and produces the property-substituted line stream every
//! isolation pass starts from.

use std::collections::HashSet;

use config::constants::MAIN_GROUP;
use pipeline_types::ColorKey;

use crate::diagnostic::Diagnostic;
use crate::group::Group;
use crate::invocation::{color_invocation, extern_declaration, group_marker, GroupMarker};
use crate::properties::PropertyOverrides;

/// A physical source line with its zero-based number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

/// Scanner output. Immutable once built and shared by every isolation pass.
#[derive(Debug, Clone)]
pub struct AnnotatedSource {
    lines: Vec<SourceLine>,
    groups: Vec<Group>,
    group_of: Vec<usize>,
    colors: Vec<ColorKey>,
    diagnostics: Vec<Diagnostic>,
}

impl AnnotatedSource {
    /// Property-substituted lines.
    pub fn lines(&self) -> &[SourceLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// All groups; index 0 is always the synthetic `main` group.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }

    /// Index of the group that owns each line.
    pub fn group_of(&self) -> &[usize] {
        &self.group_of
    }

    /// Distinct colors in first-seen order. The position is `{number}`.
    pub fn colors(&self) -> &[ColorKey] {
        &self.colors
    }

    pub fn color(&self, index: usize) -> Option<&ColorKey> {
        self.colors.get(index)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Scans `source`, applying `overrides` to extern declarations.
///
/// # Example
///
/// ```rust
/// use openscad_annotate::{scan, PropertyOverrides};
///
/// let source = "color(\"red\") cube(1);\ncolor([0,0,1]) sphere(1);\ncolor(\"Red\") cube(2);\n";
/// let annotated = scan(source, &PropertyOverrides::new());
///
/// let colors: Vec<&str> = annotated.colors().iter().map(|c| c.as_str()).collect();
/// assert_eq!(colors, ["red", "rgb(0,0,1)"]);
/// assert_eq!(annotated.groups()[0].name, "main");
/// ```
pub fn scan(source: &str, overrides: &PropertyOverrides) -> AnnotatedSource {
    let mut scanner = Scanner::new(overrides);
    for (number, text) in source.lines().enumerate() {
        scanner.line(number, text);
    }
    scanner.finish()
}

struct Scanner<'a> {
    overrides: &'a PropertyOverrides,
    applied: HashSet<String>,
    lines: Vec<SourceLine>,
    declared: Vec<Group>,
    colors: Vec<ColorKey>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Scanner<'a> {
    fn new(overrides: &'a PropertyOverrides) -> Self {
        Self {
            overrides,
            applied: HashSet::new(),
            lines: Vec::new(),
            declared: Vec::new(),
            colors: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn line(&mut self, number: usize, text: &str) {
        if let Some(decl) = extern_declaration(text) {
            let substituted = match self.overrides.get(&decl.key) {
                Some(value) => {
                    tracing::info!(property = %decl.key, %value, "set property");
                    self.applied.insert(decl.key.clone());
                    decl.render(value)
                }
                None => {
                    self.diagnostics.push(Diagnostic::note(
                        format!("no override for property `{}`, keeping source value", decl.key),
                        Some(number),
                    ));
                    text.to_string()
                }
            };
            self.lines.push(SourceLine {
                number,
                text: substituted,
            });
            return;
        }

        self.lines.push(SourceLine {
            number,
            text: text.to_string(),
        });

        if let Some(marker) = group_marker(text) {
            match marker {
                Ok(GroupMarker::Start(name)) => self.open_group(name, number),
                Ok(GroupMarker::End(name)) => self.close_group(&name, number),
                Err(err) => self
                    .diagnostics
                    .push(Diagnostic::warning(format!("ignoring group marker: {err}"), Some(number))),
            }
            return;
        }

        match color_invocation(text) {
            Some(Ok(color)) => {
                if !self.colors.contains(&color) {
                    tracing::info!(%color, "found new color");
                    self.colors.push(color);
                }
            }
            Some(Err(err)) => self.diagnostics.push(
                Diagnostic::warning(format!("ignoring color invocation: {err}"), Some(number))
                    .with_hint("the statement is copied unchanged into every variant".to_string()),
            ),
            None => {}
        }
    }

    fn open_group(&mut self, name: String, number: usize) {
        if name == MAIN_GROUP || self.declared.iter().any(|g| g.name == name) {
            self.diagnostics.push(Diagnostic::warning(
                format!("group `{name}` is already defined, ignoring start marker"),
                Some(number),
            ));
            return;
        }
        tracing::info!(group = %name, "found new group");
        self.declared.push(Group::open(name, number));
    }

    fn close_group(&mut self, name: &str, number: usize) {
        let open = self
            .declared
            .iter_mut()
            .rev()
            .find(|g| g.name == name && !g.is_closed());
        match open {
            Some(group) => group.line_end = Some(number),
            None => self.diagnostics.push(Diagnostic::warning(
                format!("end marker for group `{name}` has no open start marker"),
                Some(number),
            )),
        }
    }

    fn finish(mut self) -> AnnotatedSource {
        let last_line = self.lines.len().saturating_sub(1);

        for group in self.declared.iter_mut().filter(|g| !g.is_closed()) {
            self.diagnostics.push(Diagnostic::warning(
                format!("group `{}` is never closed, extending it to end of file", group.name),
                Some(group.line_start),
            ));
            group.line_end = Some(last_line);
        }

        for key in self.overrides.keys() {
            if !self.applied.contains(key) {
                self.diagnostics.push(Diagnostic::warning(
                    format!("property override `{key}` matches no extern declaration"),
                    None,
                ));
            }
        }

        let mut groups = Vec::with_capacity(self.declared.len() + 1);
        groups.push(Group::closed(MAIN_GROUP, 0, last_line));
        groups.append(&mut self.declared);

        let group_of = assign_lines(&groups, self.lines.len());

        AnnotatedSource {
            lines: self.lines,
            groups,
            group_of,
            colors: self.colors,
            diagnostics: self.diagnostics,
        }
    }
}

/// Fills each group's inclusive span in declaration order; later groups
/// overwrite earlier ones.
fn assign_lines(groups: &[Group], line_count: usize) -> Vec<usize> {
    let mut group_of = vec![0; line_count];
    if line_count == 0 {
        return group_of;
    }
    for (index, group) in groups.iter().enumerate() {
        let end = group.line_end.unwrap_or(line_count - 1).min(line_count - 1);
        if group.line_start > end {
            continue;
        }
        group_of[group.line_start..=end].fill(index);
    }
    group_of
}
