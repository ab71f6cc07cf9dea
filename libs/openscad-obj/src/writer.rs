//! # OBJ Writer
//!
//! Writes per-color fragments and per-group merged files. Vertices are
//! never shared: triangle `t` of a mesh owns vertices `3t+1..=3t+3` and
//! normal `t+1` (1-based, relative to where the mesh starts).
//!
//! ## Merged Layout
//!
//! ```text
//! mtllib lib.mtl
//! v ...   ┐ color 0: 3 per triangle
//! vn ...  ┘ color 0: 1 per triangle
//! v ...   ┐ color 1
//! vn ...  ┘
//! usemtl color0
//! f 1//1 2//1 3//1
//! usemtl color1
//! f 7//3 8//3 9//3    ← counters continue across colors
//! ```

use std::io::Write;

use pipeline_types::Mesh;

use crate::format::Triple;

/// A mesh drawn with one material inside a merged file.
#[derive(Debug, Clone, Copy)]
pub struct MeshPart<'a> {
    pub material: &'a str,
    pub mesh: &'a Mesh,
}

/// Running 1-based vertex and normal indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCounter {
    pub vertex: usize,
    pub normal: usize,
}

impl Default for FaceCounter {
    fn default() -> Self {
        Self {
            vertex: 1,
            normal: 1,
        }
    }
}

impl FaceCounter {
    /// Writes one face per triangle of `mesh` and advances the counters.
    fn write_faces<W: Write>(&mut self, writer: &mut W, mesh: &Mesh) -> std::io::Result<()> {
        for _ in 0..mesh.triangle_count() {
            let (v, n) = (self.vertex, self.normal);
            writeln!(writer, "f {v}//{n} {}//{n} {}//{n}", v + 1, v + 2)?;
            self.vertex += 3;
            self.normal += 1;
        }
        Ok(())
    }
}

fn write_geometry<W: Write>(writer: &mut W, mesh: &Mesh) -> std::io::Result<()> {
    for position in mesh.positions() {
        writeln!(writer, "v {}", Triple(position))?;
    }
    for normal in mesh.normals() {
        writeln!(writer, "vn {}", Triple(normal))?;
    }
    Ok(())
}

/// Writes a single-material OBJ fragment.
///
/// # Example
///
/// ```rust
/// use openscad_obj::write_fragment;
/// use pipeline_types::Mesh;
///
/// let mut out = Vec::new();
/// write_fragment(&mut out, "box.mtl", "red", &Mesh::new("empty")).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "mtllib box.mtl\nusemtl red\no empty\n");
/// ```
pub fn write_fragment<W: Write>(
    writer: &mut W,
    mtllib: &str,
    material: &str,
    mesh: &Mesh,
) -> std::io::Result<()> {
    writeln!(writer, "mtllib {mtllib}")?;
    writeln!(writer, "usemtl {material}")?;
    writeln!(writer, "o {}", mesh.name())?;
    write_geometry(writer, mesh)?;
    FaceCounter::default().write_faces(writer, mesh)
}

/// Writes all parts into one OBJ with globally renumbered indices.
///
/// Returns the counters after the last face, i.e. one past the last used
/// vertex and normal index.
pub fn write_merged<W: Write>(
    writer: &mut W,
    mtllib: &str,
    parts: &[MeshPart<'_>],
) -> std::io::Result<FaceCounter> {
    writeln!(writer, "mtllib {mtllib}")?;
    for part in parts {
        write_geometry(writer, part.mesh)?;
    }

    let mut counter = FaceCounter::default();
    for part in parts {
        writeln!(writer, "usemtl {}", part.material)?;
        counter.write_faces(writer, part.mesh)?;
    }
    Ok(counter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use pipeline_types::Triangle;

    fn mesh(name: &str, triangles: usize) -> Mesh {
        let mut mesh = Mesh::new(name);
        for i in 0..triangles {
            let offset = i as f64;
            mesh.push(Triangle::new(
                DVec3::new(offset, 0.0, 0.0),
                DVec3::new(offset, 1.0, 0.0),
                DVec3::new(offset, 0.0, 1.0),
                DVec3::X,
            ));
        }
        mesh
    }

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn fragment_layout() {
        let mut out = Vec::new();
        write_fragment(&mut out, "m.mtl", "red", &mesh("part", 2)).unwrap();
        assert_eq!(
            text(out),
            "\
mtllib m.mtl
usemtl red
o part
v 0 0 0
v 0 1 0
v 0 0 1
v 1 0 0
v 1 1 0
v 1 0 1
vn 1 0 0
vn 1 0 0
f 1//1 2//1 3//1
f 4//2 5//2 6//2
"
        );
    }

    #[test]
    fn merged_indices_continue_across_colors() {
        let first = mesh("a", 2);
        let second = mesh("b", 3);
        let parts = [
            MeshPart {
                material: "c1",
                mesh: &first,
            },
            MeshPart {
                material: "c2",
                mesh: &second,
            },
        ];

        let mut out = Vec::new();
        let end = write_merged(&mut out, "m.mtl", &parts).unwrap();
        let out = text(out);

        assert_eq!(end, FaceCounter { vertex: 16, normal: 6 });
        assert_eq!(out.lines().filter(|l| l.starts_with("v ")).count(), 15);
        assert_eq!(out.lines().filter(|l| l.starts_with("vn ")).count(), 5);

        let tail: Vec<&str> = out.lines().skip_while(|l| !l.starts_with("usemtl")).collect();
        assert_eq!(
            tail,
            [
                "usemtl c1",
                "f 1//1 2//1 3//1",
                "f 4//2 5//2 6//2",
                "usemtl c2",
                "f 7//3 8//3 9//3",
                "f 10//4 11//4 12//4",
                "f 13//5 14//5 15//5",
            ]
        );
    }

    #[test]
    fn merged_geometry_is_grouped_per_color() {
        let first = mesh("a", 1);
        let second = mesh("b", 1);
        let parts = [
            MeshPart {
                material: "c1",
                mesh: &first,
            },
            MeshPart {
                material: "c2",
                mesh: &second,
            },
        ];
        let mut out = Vec::new();
        write_merged(&mut out, "m.mtl", &parts).unwrap();
        let out = text(out);
        let kinds: Vec<&str> = out
            .lines()
            .take(9)
            .map(|l| l.split(' ').next().unwrap_or_default())
            .collect();
        assert_eq!(kinds, ["mtllib", "v", "v", "v", "vn", "v", "v", "v", "vn"]);
    }

    #[test]
    fn empty_color_keeps_numbering_of_followers() {
        let empty = Mesh::new("empty");
        let after = mesh("b", 1);
        let parts = [
            MeshPart {
                material: "failed",
                mesh: &empty,
            },
            MeshPart {
                material: "ok",
                mesh: &after,
            },
        ];
        let mut out = Vec::new();
        write_merged(&mut out, "m.mtl", &parts).unwrap();
        let out = text(out);
        assert!(out.contains("usemtl failed\nusemtl ok\nf 1//1 2//1 3//1\n"));
    }
}
