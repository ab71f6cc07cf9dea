//! # Naming Patterns
//!
//! Output names are built from patterns such as
//! `{number}_{input}_{group}_{color}.stl`. Substitution is a single pass
//! over the pattern, so a substituted value that itself contains a
//! placeholder (a color named `{group}`, say) is never expanded again.
//! Unknown `{...}` sequences are copied as written.

use config::constants::{PLACEHOLDER_COLOR, PLACEHOLDER_GROUP, PLACEHOLDER_INPUT, PLACEHOLDER_NUMBER};

/// Values for the known placeholders. Unset values leave their placeholder
/// in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct Placeholders<'a> {
    pub number: Option<usize>,
    pub color: Option<&'a str>,
    pub group: Option<&'a str>,
    pub input: Option<&'a str>,
}

impl<'a> Placeholders<'a> {
    /// Only `{input}` set.
    pub fn input(input: &'a str) -> Self {
        Self {
            input: Some(input),
            ..Self::default()
        }
    }

    /// All placeholders of one (group, color) unit.
    pub fn unit(input: &'a str, group: &'a str, number: usize, color: &'a str) -> Self {
        Self {
            number: Some(number),
            color: Some(color),
            group: Some(group),
            input: Some(input),
        }
    }

    /// Expands `pattern`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use openscad_colorsplit::Placeholders;
    ///
    /// let names = Placeholders::unit("box", "main", 0, "red");
    /// assert_eq!(names.expand("{number}_{input}_{group}_{color}.stl"), "0_box_main_red.stl");
    /// ```
    pub fn expand(&self, pattern: &str) -> String {
        let number = self.number.map(|n| n.to_string());
        let table = [
            (PLACEHOLDER_NUMBER, number.as_deref()),
            (PLACEHOLDER_COLOR, self.color),
            (PLACEHOLDER_GROUP, self.group),
            (PLACEHOLDER_INPUT, self.input),
        ];

        let mut out = String::with_capacity(pattern.len() + 32);
        let mut rest = pattern;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            rest = &rest[open..];
            let hit = table.iter().find_map(|&(key, value)| {
                let value = value?;
                rest.starts_with(key).then_some((key, value))
            });
            match hit {
                Some((key, value)) => {
                    out.push_str(value);
                    rest = &rest[key.len()..];
                }
                None => {
                    out.push('{');
                    rest = &rest[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}
