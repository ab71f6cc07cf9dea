//! # Configuration Constants
//!
//! Centralized constants for the color-splitting pipeline. Annotation
//! markers, naming patterns, renderer defaults, and exit statuses are
//! defined here.
//!
//! ## Categories
//!
//! - **Markers**: Source annotations recognized by the scanner
//! - **Patterns**: Default output naming patterns and their placeholders
//! - **Renderer**: External renderer defaults
//! - **Exit**: Process exit statuses of the binary

use std::time::Duration;

// =============================================================================
// MARKER CONSTANTS
// =============================================================================

/// Prefix of a named-color invocation, e.g. `color("red") cube(1);`.
///
/// Matched against the line after trimming leading whitespace.
///
/// # Example
///
/// ```rust
/// use config::constants::NAMED_COLOR_PREFIX;
///
/// assert!("  color(\"red\") cube(1);".trim_start().starts_with(NAMED_COLOR_PREFIX));
/// ```
pub const NAMED_COLOR_PREFIX: &str = "color(\"";

/// Prefixes of a vector-color invocation, e.g. `color([1, 0, 0]) cube(1);`.
///
/// # Example
///
/// ```rust
/// use config::constants::VECTOR_COLOR_PREFIXES;
///
/// let line = "color( [0.2, 0.4, 0.6]) sphere(2);";
/// assert!(VECTOR_COLOR_PREFIXES.iter().any(|p| line.starts_with(p)));
/// ```
pub const VECTOR_COLOR_PREFIXES: [&str; 2] = ["color([", "color( ["];

/// Group-start marker. Compared case-insensitively.
pub const GROUP_START_MARKER: &str = "/*start_group(\"";

/// Group-end marker. Compared case-insensitively.
pub const GROUP_END_MARKER: &str = "/*end_group(\"";

/// Marker for a declaration whose right-hand side may be overridden.
///
/// # Example
///
/// ```rust
/// use config::constants::EXTERN_MARKER;
///
/// let line = "/*extern*/ width = 10;";
/// assert_eq!(&line[EXTERN_MARKER.len()..], " width = 10;");
/// ```
pub const EXTERN_MARKER: &str = "/*extern*/";

/// Prefix written in front of a declaration whose value was overridden.
pub const PROPERTY_MARKER: &str = "/* prop */";

/// Line-comment prefix used to neutralize statements.
pub const COMMENT_PREFIX: &str = "//";

/// Name of the synthetic group spanning the whole source.
pub const MAIN_GROUP: &str = "main";

// =============================================================================
// PATTERN CONSTANTS
// =============================================================================

/// Placeholder for the discovery index of the active color.
pub const PLACEHOLDER_NUMBER: &str = "{number}";

/// Placeholder for the name of the active color.
pub const PLACEHOLDER_COLOR: &str = "{color}";

/// Placeholder for the name of the active group.
pub const PLACEHOLDER_GROUP: &str = "{group}";

/// Placeholder for the input file name without extension.
pub const PLACEHOLDER_INPUT: &str = "{input}";

/// Default pattern for isolated source variants.
pub const DEFAULT_SCAD_PATTERN: &str = "{number}_{input}_{group}_{color}.scad";

/// Default pattern for renderer mesh artifacts.
pub const DEFAULT_STL_PATTERN: &str = "{number}_{input}_{group}_{color}.stl";

/// Default pattern for per-color OBJ fragments.
pub const DEFAULT_OBJ_PATTERN: &str = "{number}_{input}_{group}_{color}.obj";

/// Default pattern for merged per-group OBJ files.
pub const DEFAULT_MERGE_PATTERN: &str = "{input}_{group}.obj";

/// Default pattern for material names.
///
/// # Example
///
/// ```rust
/// use config::constants::{DEFAULT_MATERIAL_PATTERN, PLACEHOLDER_COLOR};
///
/// assert_eq!(DEFAULT_MATERIAL_PATTERN, PLACEHOLDER_COLOR);
/// ```
pub const DEFAULT_MATERIAL_PATTERN: &str = "{color}";

/// Default pattern for the output directory, resolved next to the input.
pub const DEFAULT_OUTPUT_DIR_PATTERN: &str = "ColorHelper_{input}";

/// Default pattern for the material library, resolved inside the output
/// directory.
pub const DEFAULT_MTL_PATTERN: &str = "{input}.mtl";

// =============================================================================
// RENDERER CONSTANTS
// =============================================================================

/// Default OpenSCAD executable.
#[cfg(windows)]
pub const DEFAULT_OPENSCAD: &str = "C:\\Program Files\\OpenSCAD\\openscad.exe";

/// Fallback OpenSCAD executable when the default is absent.
#[cfg(windows)]
pub const FALLBACK_OPENSCAD: &str = "C:\\Program Files (x86)\\OpenSCAD\\openscad.exe";

/// Default OpenSCAD executable.
#[cfg(not(windows))]
pub const DEFAULT_OPENSCAD: &str = "openscad";

/// Fallback OpenSCAD executable when the default is absent.
#[cfg(not(windows))]
pub const FALLBACK_OPENSCAD: &str = "/usr/bin/openscad";

/// Seconds a single render may run before it is killed.
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 600;

/// Interval at which a running renderer is polled for completion.
///
/// # Example
///
/// ```rust
/// use config::constants::{render_timeout, RENDER_POLL_INTERVAL};
///
/// assert!(RENDER_POLL_INTERVAL < render_timeout());
/// ```
pub const RENDER_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Name of the solid written into placeholder mesh artifacts.
pub const EMPTY_SOLID_NAME: &str = "empty";

/// Diffuse color used for named colors missing from the palette.
pub const FALLBACK_DIFFUSE: [f64; 3] = [1.0, 1.0, 1.0];

/// Returns the default render timeout.
pub fn render_timeout() -> Duration {
    Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS)
}

// =============================================================================
// EXIT STATUS CONSTANTS
// =============================================================================

/// Exit status for a completed run. Recoverable unit failures still exit 0.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status for unexpected failures after startup.
pub const EXIT_FAILURE: u8 = 1;

/// Exit status for a missing or unreadable input, palette, or settings file.
pub const EXIT_BAD_INPUT: u8 = 2;
