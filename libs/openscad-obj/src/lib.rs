//! # OpenSCAD OBJ
//!
//! Assembles Wavefront OBJ/MTL output from per-color meshes.
//!
//! ## Output
//!
//! - one fragment OBJ per rendered color (`write_fragment`)
//! - one merged OBJ per group, indices renumbered globally (`write_merged`)
//! - one shared MTL library, deduplicated by material name
//!
//! The `save_*` helpers wrap the writers with buffered file output and
//! attach the path to any IO error.

pub mod error;
pub mod format;
pub mod material;
pub mod writer;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use config::constants::EMPTY_SOLID_NAME;
use pipeline_types::Mesh;

pub use error::{AssembleError, AssembleResult};
pub use format::{decimal, Decimal, Triple};
pub use material::{diffuse_for, Material, MaterialLibrary};
pub use writer::{write_fragment, write_merged, FaceCounter, MeshPart};

fn save_with<F>(path: &Path, write: F) -> AssembleResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).map_err(|e| AssembleError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)
        .and_then(|()| writer.flush())
        .map_err(|e| AssembleError::io(path, e))
}

/// Writes a fragment OBJ to `path`.
pub fn save_fragment(
    path: impl AsRef<Path>,
    mtllib: &str,
    material: &str,
    mesh: &Mesh,
) -> AssembleResult<()> {
    let path = path.as_ref();
    save_with(path, |w| write_fragment(w, mtllib, material, mesh))?;
    tracing::debug!(path = %path.display(), triangles = mesh.triangle_count(), "wrote fragment");
    Ok(())
}

/// Writes the fragment substituted for a failed render: header lines and
/// an `o empty` object with no geometry.
pub fn save_placeholder_fragment(
    path: impl AsRef<Path>,
    mtllib: &str,
    material: &str,
) -> AssembleResult<()> {
    save_fragment(path, mtllib, material, &Mesh::new(EMPTY_SOLID_NAME))
}

/// Writes a merged OBJ to `path`.
pub fn save_merged(
    path: impl AsRef<Path>,
    mtllib: &str,
    parts: &[MeshPart<'_>],
) -> AssembleResult<()> {
    let path = path.as_ref();
    save_with(path, |w| write_merged(w, mtllib, parts).map(|_| ()))?;
    tracing::debug!(path = %path.display(), parts = parts.len(), "wrote merged object");
    Ok(())
}

impl MaterialLibrary {
    /// Writes the library to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> AssembleResult<()> {
        let path = path.as_ref();
        save_with(path, |w| self.write(w))?;
        tracing::debug!(path = %path.display(), materials = self.len(), "wrote material library");
        Ok(())
    }
}

/// The `mtllib` reference for an OBJ at `obj` using the library at `mtl`.
///
/// The bare file name when both share a directory, otherwise the library
/// path as given.
///
/// ```rust
/// use std::path::Path;
/// use openscad_obj::mtllib_reference;
///
/// assert_eq!(mtllib_reference(Path::new("out/a.obj"), Path::new("out/lib.mtl")), "lib.mtl");
/// assert_eq!(mtllib_reference(Path::new("out/a.obj"), Path::new("/m/lib.mtl")), "/m/lib.mtl");
/// ```
pub fn mtllib_reference(obj: &Path, mtl: &Path) -> String {
    match (obj.parent(), mtl.parent(), mtl.file_name()) {
        (Some(a), Some(b), Some(name)) if a == b => name.to_string_lossy().into_owned(),
        _ => mtl.display().to_string(),
    }
}
