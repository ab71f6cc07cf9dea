//! # OpenSCAD Colorsplit
//!
//! Turns one annotated OpenSCAD source into per-color OBJ models, one
//! merged OBJ per group, and a shared MTL library.
//!
//! ## Architecture
//!
//! ```text
//! Settings (flags → TOML → defaults)
//!     ↓
//! openscad-annotate (scan, isolate) → Renderer → openscad-stl → openscad-obj
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use openscad_colorsplit::{load_palette, OpenScadRenderer, Pipeline, Settings};
//!
//! let settings = Settings::resolve("model.scad", &[])?;
//! let palette = load_palette(settings.color_map.as_deref())?;
//! let renderer = OpenScadRenderer::new(&settings.executable, settings.timeout);
//! let summary = Pipeline::new(&settings, &palette, &renderer).run()?;
//! println!("{} units failed", summary.failed_units());
//! # Ok::<(), openscad_colorsplit::PipelineError>(())
//! ```

pub mod error;
pub mod pattern;
pub mod pipeline;
pub mod renderer;
pub mod settings;

pub use error::{PipelineError, PipelineResult};
pub use pattern::Placeholders;
pub use pipeline::{load_palette, GroupSummary, Pipeline, RunSummary, UnitStatus, UnitSummary};
pub use renderer::{default_executable, OpenScadRenderer, RenderError, Renderer};
pub use settings::{parse_assignment, Settings, SettingsLayer};
