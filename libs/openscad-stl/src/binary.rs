//! Binary STL import.
//!
//! ```text
//! UINT8[80]    – Header
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count
//! end
//! ```
//!
//! Records are decoded by `stl_io`'s binary triangle iterator, which yields
//! them in file order without merging vertices.

use std::io::Cursor;

use glam::DVec3;
use pipeline_types::{Mesh, Triangle};

use crate::error::{StlError, StlResult};

/// STL binary header size in bytes.
pub(crate) const HEADER_SIZE: usize = 80;

/// Size of one triangle record (normal + 3 vertices + attribute).
pub(crate) const TRIANGLE_SIZE: usize = 50;

/// True when `bytes` look like a binary STL rather than ASCII.
///
/// An exact size match for the declared triangle count is decisive, since
/// some binary headers also start with `solid`.
pub fn is_binary(bytes: &[u8]) -> bool {
    let expected_len = declared_count(bytes)
        .and_then(|count| count.checked_mul(TRIANGLE_SIZE))
        .and_then(|body| body.checked_add(HEADER_SIZE + 4));
    if expected_len == Some(bytes.len()) {
        return true;
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(HEADER_SIZE)]);
    !head.trim_start().starts_with("solid") && bytes.len() >= HEADER_SIZE + 4
}

/// Parses a binary STL. A truncated body keeps the complete records.
pub fn parse_binary(bytes: &[u8]) -> StlResult<Mesh> {
    let count = declared_count(bytes).ok_or(StlError::TooShort {
        len: bytes.len(),
        min: HEADER_SIZE + 4,
    })?;

    let name = String::from_utf8_lossy(&bytes[..HEADER_SIZE])
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string();

    let available = (bytes.len() - HEADER_SIZE - 4) / TRIANGLE_SIZE;
    let mut cursor = Cursor::new(bytes);
    let records = stl_io::BinaryStlReader::create_triangle_iterator(&mut cursor)
        .map_err(StlError::Decode)?;

    let mut mesh = Mesh::with_capacity(name, count.min(available));
    for record in records {
        match record {
            Ok(triangle) => mesh.push(Triangle::new(
                widen(&triangle.vertices[0]),
                widen(&triangle.vertices[1]),
                widen(&triangle.vertices[2]),
                widen(&triangle.normal),
            )),
            Err(err) => {
                tracing::warn!(
                    declared = count,
                    available = mesh.triangle_count(),
                    "binary STL is truncated: {err}"
                );
                break;
            }
        }
    }
    Ok(mesh)
}

fn declared_count(bytes: &[u8]) -> Option<usize> {
    let raw = bytes.get(HEADER_SIZE..HEADER_SIZE + 4)?;
    Some(u32::from_le_bytes(raw.try_into().ok()?) as usize)
}

fn widen(vector: &stl_io::Vector<f32>) -> DVec3 {
    let [x, y, z] = <[f32; 3]>::from(*vector);
    DVec3::new(f64::from(x), f64::from(y), f64::from(z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(header: &[u8], facets: &[[f32; 12]]) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[..header.len()].copy_from_slice(header);
        bytes.extend_from_slice(&(facets.len() as u32).to_le_bytes());
        for facet in facets {
            for value in facet {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
            bytes.extend_from_slice(&0u16.to_le_bytes());
        }
        bytes
    }

    const FACET: [f32; 12] = [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    #[test]
    fn parses_records() {
        let bytes = encode(b"model", &[FACET, FACET]);
        assert!(is_binary(&bytes));

        let mesh = parse_binary(&bytes).unwrap();
        assert_eq!(mesh.name(), "model");
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles()[0].normal, DVec3::Z);
        assert_eq!(mesh.triangles()[0].vertices[1], DVec3::X);
    }

    #[test]
    fn records_keep_file_order_and_shared_corners() {
        let second = [0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let mesh = parse_binary(&encode(b"", &[FACET, second])).unwrap();
        assert_eq!(mesh.triangles()[1].vertices[0], DVec3::X);
        assert_eq!(mesh.triangles()[1].vertices[2], DVec3::Y);
        assert_eq!(mesh.triangles()[0].vertices[2], DVec3::Y);
    }

    #[test]
    fn solid_header_with_matching_size_is_binary() {
        let bytes = encode(b"solid but binary", &[FACET]);
        assert!(is_binary(&bytes));
    }

    #[test]
    fn ascii_is_not_binary() {
        let text = "solid x\n".repeat(20);
        assert!(!is_binary(text.as_bytes()));
    }

    #[test]
    fn truncated_body_keeps_whole_records() {
        let mut bytes = encode(b"", &[FACET, FACET]);
        bytes.truncate(bytes.len() - 10);
        let mesh = parse_binary(&bytes).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn short_input_is_an_error() {
        assert!(matches!(parse_binary(&[0u8; 20]), Err(StlError::TooShort { len: 20, .. })));
    }
}
