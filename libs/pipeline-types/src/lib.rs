//! # Pipeline Types
//!
//! Types shared by every stage of the color-splitting pipeline:
//!
//! ```text
//! openscad-annotate (ColorKey) → openscad-stl (Mesh) → openscad-obj (Mesh, ColorKey)
//! ```

mod color;
mod mesh;

pub use color::ColorKey;
pub use mesh::{Mesh, Triangle, Vector3};
