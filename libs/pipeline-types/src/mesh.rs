//! # Mesh Data Structure
//!
//! Triangle soup as produced by the renderer. No vertex sharing: every
//! triangle owns its three corners, and order is significant because output
//! indices are derived from position.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Double-precision vector used for both positions and normals.
pub type Vector3 = DVec3;

/// One facet: three corners plus the facet normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [Vector3; 3],
    pub normal: Vector3,
}

impl Triangle {
    pub fn new(a: Vector3, b: Vector3, c: Vector3, normal: Vector3) -> Self {
        Self {
            vertices: [a, b, c],
            normal,
        }
    }
}

/// An ordered triangle list with the solid name reported by the renderer.
///
/// # Example
///
/// ```rust
/// use pipeline_types::{Mesh, Triangle, Vector3};
///
/// let mut mesh = Mesh::new("part");
/// mesh.push(Triangle::new(Vector3::X, Vector3::Y, Vector3::Z, Vector3::ONE));
/// assert_eq!(mesh.triangle_count(), 1);
/// assert_eq!(mesh.vertex_count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    name: String,
    triangles: Vec<Triangle>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triangles: Vec::new(),
        }
    }

    /// Creates an empty mesh with pre-allocated capacity.
    pub fn with_capacity(name: impl Into<String>, triangle_count: usize) -> Self {
        Self {
            name: name.into(),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Solid name, used as the OBJ object name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Appends a triangle, keeping emission order.
    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of emitted vertices (three per triangle, never shared).
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Iterates over all corners in triangle order.
    pub fn positions(&self) -> impl Iterator<Item = Vector3> + '_ {
        self.triangles.iter().flat_map(|t| t.vertices)
    }

    /// Iterates over the facet normals in triangle order.
    pub fn normals(&self) -> impl Iterator<Item = Vector3> + '_ {
        self.triangles.iter().map(|t| t.normal)
    }
}
