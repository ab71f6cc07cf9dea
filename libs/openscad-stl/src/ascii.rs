//! ASCII STL import.
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//! endsolid name
//! ```
//!
//! Parsing is prefix based and order dependent. A facet whose numbers do not
//! parse, or whose lines arrive out of order, is dropped; everything else
//! is kept in emission order.

use glam::DVec3;
use pipeline_types::{Mesh, Triangle};

/// Facet reader state.
enum Facet {
    Outside,
    Normal(DVec3),
    Loop { normal: DVec3, corners: Vec<DVec3> },
}

/// Parses an ASCII STL document.
///
/// # Example
///
/// ```rust
/// use openscad_stl::parse_ascii;
///
/// let text = "solid part\n  facet normal 0 0 1\n    outer loop\n      vertex 0 0 0\n      vertex 1 0 0\n      vertex 0 1 0\n    endloop\n  endfacet\nendsolid part\n";
/// let mesh = parse_ascii(text);
/// assert_eq!(mesh.name(), "part");
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
pub fn parse_ascii(text: &str) -> Mesh {
    let mut mesh = Mesh::new("");
    let mut named = false;
    let mut state = Facet::Outside;
    let mut skipped = 0usize;

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();

        if let Some(rest) = keyword(line, "solid") {
            if !named {
                mesh.set_name(rest.trim());
                named = true;
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("facet normal") {
            if !matches!(state, Facet::Outside) {
                skipped += 1;
            }
            state = match parse_vector(rest) {
                Some(normal) => Facet::Normal(normal),
                None => {
                    tracing::warn!(line = number + 1, "unreadable facet normal");
                    skipped += 1;
                    Facet::Outside
                }
            };
            continue;
        }

        if line == "outer loop" {
            state = match state {
                Facet::Normal(normal) => Facet::Loop {
                    normal,
                    corners: Vec::with_capacity(3),
                },
                other => other,
            };
            continue;
        }

        if let Some(rest) = line.strip_prefix("vertex") {
            state = match state {
                Facet::Loop { normal, mut corners } => match parse_vector(rest) {
                    Some(corner) => {
                        corners.push(corner);
                        if corners.len() == 3 {
                            mesh.push(Triangle::new(corners[0], corners[1], corners[2], normal));
                            Facet::Outside
                        } else {
                            Facet::Loop { normal, corners }
                        }
                    }
                    None => {
                        tracing::warn!(line = number + 1, "unreadable vertex");
                        skipped += 1;
                        Facet::Outside
                    }
                },
                other => other,
            };
        }
    }

    if !matches!(state, Facet::Outside) {
        skipped += 1;
    }
    if skipped > 0 {
        tracing::warn!(skipped, kept = mesh.triangle_count(), "dropped malformed facets");
    }
    mesh
}

/// Matches `word` followed by whitespace or end of line.
fn keyword<'a>(line: &'a str, word: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(word)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

fn parse_vector(text: &str) -> Option<DVec3> {
    let mut parts = text.split_whitespace().map(|p| p.parse::<f64>());
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let z = parts.next()?.ok()?;
    Some(DVec3::new(x, y, z))
}
