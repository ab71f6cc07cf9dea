//! # OpenSCAD STL
//!
//! Reads the renderer's mesh artifact into an ordered triangle list.
//!
//! ## Architecture
//!
//! ```text
//! renderer (.stl) → load → Mesh (pipeline-types)
//! ```
//!
//! Only an unreadable file is an error. Malformed content degrades to a
//! partial or empty mesh, which is logged.
//!
//! ## Usage
//!
//! ```rust,no_run
//! let mesh = openscad_stl::load("0_box_main_red.stl")?;
//! println!("{} triangles", mesh.triangle_count());
//! # Ok::<(), openscad_stl::StlError>(())
//! ```

pub mod ascii;
pub mod binary;
pub mod error;

use std::io::Write;
use std::path::Path;

use config::constants::EMPTY_SOLID_NAME;
use pipeline_types::Mesh;

pub use ascii::parse_ascii;
pub use binary::{is_binary, parse_binary};
pub use error::{StlError, StlResult};

/// Loads an ASCII or binary STL artifact.
pub fn load(path: impl AsRef<Path>) -> StlResult<Mesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| StlError::io(path, e))?;
    parse(&bytes)
}

/// Parses artifact bytes, detecting the encoding.
pub fn parse(bytes: &[u8]) -> StlResult<Mesh> {
    if is_binary(bytes) {
        parse_binary(bytes)
    } else {
        Ok(parse_ascii(&String::from_utf8_lossy(bytes)))
    }
}

/// Writes the zero-triangle artifact substituted for a failed render.
pub fn write_placeholder<W: Write>(writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "solid {EMPTY_SOLID_NAME}")?;
    writeln!(writer, "endsolid {EMPTY_SOLID_NAME}")
}

/// Writes the placeholder artifact to `path`.
pub fn save_placeholder(path: impl AsRef<Path>) -> StlResult<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path).map_err(|e| StlError::io(path, e))?;
    write_placeholder(&mut file).map_err(|e| StlError::io(path, e))
}
