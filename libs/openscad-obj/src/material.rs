//! # Materials
//!
//! Diffuse colors per material and the shared `.mtl` library.
//!
//! Named colors come from the palette, and `#RGB`/`#RRGGBB` names are
//! decoded directly. Both are byte range and are divided by 255. Inline
//! vector colors are already unit range and are used as
//! written.

use std::collections::HashSet;
use std::io::Write;

use openscad_palette::{Palette, Rgb8};
use pipeline_types::ColorKey;

use crate::error::AssembleError;
use crate::format::Decimal;

/// One `newmtl` / `Kd` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: [f64; 3],
}

impl Material {
    pub fn new(name: impl Into<String>, diffuse: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            diffuse,
        }
    }

    /// Writes the material block.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let [r, g, b] = self.diffuse;
        writeln!(writer, "newmtl {}", self.name)?;
        writeln!(writer, "Kd {} {} {}", Decimal(r), Decimal(g), Decimal(b))
    }
}

/// Resolves the diffuse coefficient triple for a color.
///
/// # Example
///
/// ```rust
/// use openscad_obj::diffuse_for;
/// use openscad_palette::{Palette, Rgb8};
/// use pipeline_types::ColorKey;
///
/// let palette = Palette::parse("red = #FF0000");
/// assert_eq!(diffuse_for(&ColorKey::named("red"), &palette).unwrap(), [1.0, 0.0, 0.0]);
/// assert_eq!(diffuse_for(&ColorKey::named("#00F"), &palette).unwrap(), [0.0, 0.0, 1.0]);
/// assert_eq!(diffuse_for(&ColorKey::rgb([0.2, 0.4, 0.6]), &palette).unwrap(), [0.2, 0.4, 0.6]);
/// ```
pub fn diffuse_for(color: &ColorKey, palette: &Palette) -> Result<[f64; 3], AssembleError> {
    match color {
        ColorKey::Named(name) => palette
            .get(name)
            .or_else(|| name.strip_prefix('#').and_then(Rgb8::from_hex))
            .map(|rgb| rgb.to_unit())
            .ok_or_else(|| AssembleError::UnknownColor(name.clone())),
        ColorKey::Rgb { components, .. } => Ok(*components),
    }
}

/// Material library with entries unique by name, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
    names: HashSet<String>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a material unless one with the same name exists. Returns true
    /// when it was added.
    pub fn add(&mut self, material: Material) -> bool {
        if !self.names.insert(material.name.clone()) {
            return false;
        }
        self.materials.push(material);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Writes every entry in insertion order.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for material in &self.materials {
            material.write(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(material: &Material) -> String {
        let mut buffer = Vec::new();
        material.write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn named_color_is_normalized() {
        let palette = Palette::parse("red = #FF0000");
        let diffuse = diffuse_for(&ColorKey::named("Red"), &palette).unwrap();
        assert_eq!(written(&Material::new("red", diffuse)), "newmtl red\nKd 1 0 0\n");
    }

    #[test]
    fn vector_color_is_used_as_written() {
        let palette = Palette::new();
        let diffuse = diffuse_for(&ColorKey::rgb([0.2, 0.4, 0.6]), &palette).unwrap();
        assert_eq!(
            written(&Material::new("rgb(0.2,0.4,0.6)", diffuse)),
            "newmtl rgb(0.2,0.4,0.6)\nKd 0.2 0.4 0.6\n"
        );
    }

    #[test]
    fn hex_name_is_decoded_without_palette_entry() {
        let diffuse = diffuse_for(&ColorKey::named("#FF0000"), &Palette::new()).unwrap();
        assert_eq!(diffuse, [1.0, 0.0, 0.0]);

        let short = diffuse_for(&ColorKey::named("#0f0"), &Palette::new()).unwrap();
        assert_eq!(short, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn malformed_hex_name_is_unknown() {
        let err = diffuse_for(&ColorKey::named("#ff00"), &Palette::new()).unwrap_err();
        assert!(matches!(err, AssembleError::UnknownColor(name) if name == "#ff00"));
    }

    #[test]
    fn unknown_named_color_is_an_error() {
        let err = diffuse_for(&ColorKey::named("chartreuse"), &Palette::new()).unwrap_err();
        assert!(matches!(err, AssembleError::UnknownColor(name) if name == "chartreuse"));
    }

    #[test]
    fn library_deduplicates_by_name() {
        let mut library = MaterialLibrary::new();
        assert!(library.add(Material::new("red", [1.0, 0.0, 0.0])));
        assert!(!library.add(Material::new("red", [0.0, 1.0, 0.0])));
        assert!(library.add(Material::new("blue", [0.0, 0.0, 1.0])));

        let mut buffer = Vec::new();
        library.write(&mut buffer).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "newmtl red\nKd 1 0 0\nnewmtl blue\nKd 0 0 1\n"
        );
    }
}
