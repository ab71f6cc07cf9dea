//! Number formatting for OBJ and MTL output.
//!
//! Components are written with the shortest decimal expansion that reads
//! back to the same `f64`, never in exponent form and never truncated:
//! `1.0` → `1`, `1e-7` → `0.0000001`.

use glam::DVec3;
use std::fmt::{self, Display};

/// Full-precision decimal for one component.
pub fn decimal(value: f64) -> String {
    Decimal(value).to_string()
}

/// Display adapter for a full-precision decimal.
#[derive(Debug, Clone, Copy)]
pub struct Decimal(pub f64);

impl Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // f64's Display never switches to exponent notation
        write!(f, "{}", self.0)
    }
}

/// Display adapter writing `x y z`.
#[derive(Debug, Clone, Copy)]
pub struct Triple(pub DVec3);

impl Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", Decimal(self.0.x), Decimal(self.0.y), Decimal(self.0.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_have_no_fraction() {
        assert_eq!(decimal(1.0), "1");
        assert_eq!(decimal(0.0), "0");
        assert_eq!(decimal(-12.0), "-12");
    }

    #[test]
    fn small_and_large_values_are_expanded() {
        assert_eq!(decimal(1e-7), "0.0000001");
        assert_eq!(decimal(1e21), "1000000000000000000000");
    }

    #[test]
    fn precision_is_not_truncated() {
        assert_eq!(decimal(128.0 / 255.0), "0.5019607843137255");
        assert_eq!(decimal(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn triple_is_space_separated() {
        assert_eq!(Triple(DVec3::new(1.5, -2.0, 0.25)).to_string(), "1.5 -2 0.25");
    }
}
