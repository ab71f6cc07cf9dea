//! # OpenSCAD Palette
//!
//! Name → RGB lookup for named-color invocations. A palette is built once
//! and then only read, so it can be shared by reference across render
//! workers.
//!
//! ## File Format
//!
//! ```text
//! // comment
//! red   = #FF0000
//! teal  = #088
//! olive = rgb(128, 128, 0)
//! navy  = 128
//! ```
//!
//! Names are case-insensitive. The first definition of a name wins.
//!
//! ## Usage
//!
//! ```rust
//! use openscad_palette::{Palette, Rgb8};
//!
//! let palette = Palette::parse("red = #FF0000\nRed = #00FF00");
//! assert_eq!(palette.get("RED"), Some(Rgb8::new(255, 0, 0)));
//! ```

pub mod error;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

pub use error::{PaletteError, PaletteResult};

/// Palette bundled with the crate: the CSS color names OpenSCAD accepts.
const BUILTIN_PALETTE: &str = include_str!("../assets/colors.map");

/// Byte-range RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpacks a `0xRRGGBB` integer; bits above 24 are ignored.
    pub const fn from_packed(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    /// Decodes `#RGB` or `#RRGGBB`; the leading `#` is optional.
    pub fn from_hex(text: &str) -> Option<Self> {
        parse_hex(text.strip_prefix('#').unwrap_or(text))
    }

    /// Converts to unit-range components by dividing by 255.
    pub fn to_unit(self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Immutable name → color map.
#[derive(Debug, Default)]
pub struct Palette {
    colors: HashMap<String, Rgb8>,
    rejected: Vec<PaletteError>,
}

impl Palette {
    /// Creates an empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled CSS palette.
    pub fn builtin() -> Self {
        Self::parse(BUILTIN_PALETTE)
    }

    /// Reads and parses a palette file.
    ///
    /// Only an unreadable file is an error; malformed definitions are
    /// skipped and available through [`Palette::rejected`].
    pub fn load(path: impl AsRef<Path>) -> PaletteResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| PaletteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&source))
    }

    /// Parses palette text, skipping malformed definitions with a warning.
    pub fn parse(source: &str) -> Self {
        let mut palette = Self::new();
        for (index, line) in source.lines().enumerate() {
            match parse_definition(line, index + 1) {
                Ok(Some((name, color))) => {
                    if palette.insert(&name, color) {
                        tracing::debug!(%name, %color, "defined color");
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("skipping palette entry: {err}");
                    palette.rejected.push(err);
                }
            }
        }
        palette
    }

    /// Adds a color unless the name is already defined. Returns true when
    /// the color was added.
    pub fn insert(&mut self, name: &str, color: Rgb8) -> bool {
        let key = name.to_lowercase();
        if self.colors.contains_key(&key) {
            return false;
        }
        self.colors.insert(key, color);
        true
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<Rgb8> {
        self.colors.get(&name.to_lowercase()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Definitions skipped while parsing.
    pub fn rejected(&self) -> &[PaletteError] {
        &self.rejected
    }
}

/// Parses one palette line. Blank and `//` lines yield `Ok(None)`.
///
/// `line` is the 1-based line number used in errors.
pub fn parse_definition(text: &str, line: usize) -> PaletteResult<Option<(String, Rgb8)>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") {
        return Ok(None);
    }

    let (name, definition) = trimmed
        .split_once('=')
        .ok_or(PaletteError::MissingSeparator { line })?;
    let name = name.trim().to_lowercase();
    let definition = definition.trim();

    let color = if definition.starts_with('#') {
        Rgb8::from_hex(definition).ok_or_else(|| PaletteError::InvalidHex {
            line,
            value: definition.to_string(),
        })?
    } else if definition.starts_with("rgb(") {
        parse_rgb(definition).ok_or_else(|| PaletteError::InvalidRgb {
            line,
            value: definition.to_string(),
        })?
    } else {
        definition
            .parse::<u32>()
            .map(Rgb8::from_packed)
            .map_err(|_| PaletteError::InvalidPacked {
                line,
                value: definition.to_string(),
            })?
    };

    Ok(Some((name, color)))
}

fn parse_hex(hex: &str) -> Option<Rgb8> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    match hex.len() {
        3 => {
            let doubled: Vec<String> = hex.chars().map(|c| format!("{c}{c}")).collect();
            Some(Rgb8::new(
                channel(&doubled[0])?,
                channel(&doubled[1])?,
                channel(&doubled[2])?,
            ))
        }
        6 => Some(Rgb8::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

fn parse_rgb(definition: &str) -> Option<Rgb8> {
    let inner = &definition[4..definition.rfind(')')?];
    let parts: Vec<u8> = inner
        .split(',')
        .map(|part| part.trim().parse::<u8>().ok())
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [r, g, b] => Some(Rgb8::new(*r, *g, *b)),
        _ => None,
    }
}
