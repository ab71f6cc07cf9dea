//! # Color Keys
//!
//! Identity of a render color. Two keys are equal when their canonical
//! strings are equal, so `rgb(1,0,0)` and `rgb(1.0,0,0)` would be distinct
//! if they were ever produced by different formatting.

use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A color as written in a `color(...)` invocation.
///
/// # Example
///
/// ```rust
/// use pipeline_types::ColorKey;
///
/// let named = ColorKey::named("Red");
/// assert_eq!(named.as_str(), "red");
///
/// let vector = ColorKey::rgb([0.2, 0.4, 0.6]);
/// assert_eq!(vector.as_str(), "rgb(0.2,0.4,0.6)");
/// ```
#[derive(Debug, Clone)]
pub enum ColorKey {
    /// Symbolic name, lowercased, resolved through the palette.
    Named(String),
    /// Inline vector color; components are unit-range as written.
    Rgb {
        canonical: String,
        components: [f64; 3],
    },
}

impl ColorKey {
    pub fn named(name: &str) -> Self {
        ColorKey::Named(name.to_lowercase())
    }

    /// Builds the canonical `rgb(r,g,b)` key using default float formatting.
    pub fn rgb(components: [f64; 3]) -> Self {
        let [r, g, b] = components;
        ColorKey::Rgb {
            canonical: format!("rgb({r},{g},{b})"),
            components,
        }
    }

    /// Canonical string form, used for equality and `{color}` substitution.
    pub fn as_str(&self) -> &str {
        match self {
            ColorKey::Named(name) => name,
            ColorKey::Rgb { canonical, .. } => canonical,
        }
    }
}

impl PartialEq for ColorKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for ColorKey {}

impl Hash for ColorKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ColorKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_is_lowercased() {
        assert_eq!(ColorKey::named("DarkGreen"), ColorKey::named("darkgreen"));
    }

    #[test]
    fn test_rgb_uses_shortest_float_form() {
        assert_eq!(ColorKey::rgb([1.0, 0.0, 0.5]).as_str(), "rgb(1,0,0.5)");
    }

    #[test]
    fn test_equality_is_canonical_string() {
        let a = ColorKey::rgb([0.1, 0.2, 0.3]);
        let b = ColorKey::Named("rgb(0.1,0.2,0.3)".to_string());
        assert_eq!(a, b);
        assert_ne!(a, ColorKey::rgb([0.1, 0.2, 0.30000000000000004]));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&ColorKey::named("Blue")).unwrap();
        assert_eq!(json, "\"blue\"");
    }
}
