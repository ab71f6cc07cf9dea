//! # Line Recognition
//!
//! Prefix-based recognition of the annotations the scanner cares about.
//! Every recognizer looks at a single physical line, after trimming
//! leading whitespace:
//!
//! ```text
//! color("Red") cube(1);            → named color `red`
//! color([1, 0.5, 0]) sphere(2);    → vector color `rgb(1,0.5,0)`
//! /*start_group("Lid")*/           → group start `lid`
//! /*end_group("Lid")*/             → group end `lid`
//! /*extern*/ width = 10;           → overridable property `width`
//! ```

use config::constants::{
    EXTERN_MARKER, GROUP_END_MARKER, GROUP_START_MARKER, NAMED_COLOR_PREFIX, PROPERTY_MARKER,
    VECTOR_COLOR_PREFIXES,
};
use pipeline_types::ColorKey;

use crate::error::SyntaxError;

/// A group boundary marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupMarker {
    Start(String),
    End(String),
}

/// A `/*extern*/ key = expr;` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternDeclaration {
    pub key: String,
}

impl ExternDeclaration {
    /// Renders the declaration with `value` as a string literal.
    ///
    /// # Example
    ///
    /// ```rust
    /// use openscad_annotate::invocation::ExternDeclaration;
    ///
    /// let decl = ExternDeclaration { key: "label".to_string() };
    /// assert_eq!(decl.render("Hi"), "/* prop */label = \"Hi\";");
    /// ```
    pub fn render(&self, value: &str) -> String {
        format!("{PROPERTY_MARKER}{} = \"{}\";", self.key, escape_string(value))
    }
}

/// Recognizes a color invocation and resolves its key.
///
/// Returns `None` when the line is not a color invocation at all.
pub fn color_invocation(line: &str) -> Option<Result<ColorKey, SyntaxError>> {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix(NAMED_COLOR_PREFIX) {
        return Some(
            rest.split_once('"')
                .map(|(name, _)| ColorKey::named(name))
                .ok_or(SyntaxError::UnclosedQuote),
        );
    }
    if VECTOR_COLOR_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
        return Some(parse_vector(trimmed).map(ColorKey::rgb));
    }
    None
}

/// Recognizes a group start or end marker. Names are lowercased.
pub fn group_marker(line: &str) -> Option<Result<GroupMarker, SyntaxError>> {
    let trimmed = line.trim_start();
    let (rest, start) = if let Some(rest) = strip_prefix_ignore_case(trimmed, GROUP_START_MARKER) {
        (rest, true)
    } else if let Some(rest) = strip_prefix_ignore_case(trimmed, GROUP_END_MARKER) {
        (rest, false)
    } else {
        return None;
    };

    Some(match rest.split_once('"') {
        Some((name, _)) if start => Ok(GroupMarker::Start(name.to_lowercase())),
        Some((name, _)) => Ok(GroupMarker::End(name.to_lowercase())),
        None => Err(SyntaxError::UnclosedQuote),
    })
}

/// Recognizes an overridable property declaration.
pub fn extern_declaration(line: &str) -> Option<ExternDeclaration> {
    let rest = strip_prefix_ignore_case(line.trim_start(), EXTERN_MARKER)?;
    let key = rest.split('=').next().unwrap_or_default().trim();
    Some(ExternDeclaration {
        key: key.to_string(),
    })
}

/// Reads the first three numbers between `[` and the next `]`.
fn parse_vector(line: &str) -> Result<[f64; 3], SyntaxError> {
    let open = line.find('[').ok_or(SyntaxError::UnclosedBracket)? + 1;
    let close = line[open..]
        .find(']')
        .ok_or(SyntaxError::UnclosedBracket)?
        + open;

    let parts: Vec<&str> = line[open..close].split(',').collect();
    if parts.len() < 3 {
        return Err(SyntaxError::MissingComponents { found: parts.len() });
    }

    let mut components = [0.0; 3];
    for (slot, part) in components.iter_mut().zip(&parts) {
        let text = part.trim();
        *slot = text.parse().map_err(|_| SyntaxError::InvalidNumber {
            text: text.to_string(),
        })?;
    }
    Ok(components)
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_color_is_lowercased() {
        let key = color_invocation("    color(\"DarkRed\") cube(1);").unwrap().unwrap();
        assert_eq!(key, ColorKey::named("darkred"));
    }

    #[test]
    fn vector_color_takes_first_three_components() {
        let key = color_invocation("color([0.2, 0.4, 0.6, 0.5]) cube(1);")
            .unwrap()
            .unwrap();
        assert_eq!(key.as_str(), "rgb(0.2,0.4,0.6)");
    }

    #[test]
    fn vector_color_allows_space_before_bracket() {
        let key = color_invocation("color( [1,0,0]) cube(1);").unwrap().unwrap();
        assert_eq!(key.as_str(), "rgb(1,0,0)");
    }

    #[test]
    fn other_statements_are_not_invocations() {
        assert!(color_invocation("cube(1);").is_none());
        assert!(color_invocation("color(c) cube(1);").is_none());
        assert!(color_invocation("// color(\"red\") cube(1);").is_none());
    }

    #[test]
    fn malformed_vector_is_reported() {
        assert_eq!(
            color_invocation("color([1, 0]) cube(1);").unwrap(),
            Err(SyntaxError::MissingComponents { found: 2 })
        );
        assert_eq!(
            color_invocation("color([1, x, 0]) cube(1);").unwrap(),
            Err(SyntaxError::InvalidNumber {
                text: "x".to_string()
            })
        );
        assert_eq!(
            color_invocation("color([1, 0, 0) cube(1);").unwrap(),
            Err(SyntaxError::UnclosedBracket)
        );
    }

    #[test]
    fn group_markers_are_case_insensitive() {
        assert_eq!(
            group_marker("/*START_GROUP(\"Lid\")*/"),
            Some(Ok(GroupMarker::Start("lid".to_string())))
        );
        assert_eq!(
            group_marker("  /*end_group(\"lid\")*/"),
            Some(Ok(GroupMarker::End("lid".to_string())))
        );
        assert_eq!(group_marker("/*start_group(\"lid)*/"), Some(Err(SyntaxError::UnclosedQuote)));
        assert_eq!(group_marker("/* start_group(\"lid\") */"), None);
    }

    #[test]
    fn extern_key_is_text_before_equals() {
        let decl = extern_declaration("/*EXTERN*/ wall_thickness = 2; // mm").unwrap();
        assert_eq!(decl.key, "wall_thickness");
        assert!(extern_declaration("wall = 2;").is_none());
    }

    #[test]
    fn rendered_override_escapes_quotes() {
        let decl = ExternDeclaration {
            key: "label".to_string(),
        };
        assert_eq!(decl.render("say \"hi\""), "/* prop */label = \"say \\\"hi\\\"\";");
    }
}
