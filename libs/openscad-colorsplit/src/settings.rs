//! # Settings
//!
//! Run settings are layered: command-line flags, then the optional TOML
//! file, then the defaults in `config::constants`. Each layer is a
//! [`SettingsLayer`] of optional values; [`Settings::resolve`] takes the
//! first value set in any layer.
//!
//! ```toml
//! output_dir = "build/colors"
//! obj_pattern = "{group}/{color}.obj"
//! jobs = 4
//! timeout_secs = 120
//!
//! [properties]
//! label = "v2"
//! ```

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::constants::{
    DEFAULT_MATERIAL_PATTERN, DEFAULT_MERGE_PATTERN, DEFAULT_MTL_PATTERN,
    DEFAULT_OBJ_PATTERN, DEFAULT_OUTPUT_DIR_PATTERN, DEFAULT_RENDER_TIMEOUT_SECS,
    DEFAULT_SCAD_PATTERN, DEFAULT_STL_PATTERN,
};
use openscad_annotate::{ForeignGroupPolicy, IsolationOptions, PropertyOverrides};
use serde::{Deserialize, Deserializer};

use crate::error::{PipelineError, PipelineResult};
use crate::pattern::Placeholders;
use crate::renderer::default_executable;

/// One layer of optional settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
    pub output_dir: Option<PathBuf>,
    pub merge_output: Option<String>,
    pub mtl_output: Option<PathBuf>,
    pub scad_pattern: Option<String>,
    pub stl_pattern: Option<String>,
    pub obj_pattern: Option<String>,
    pub material_pattern: Option<String>,
    pub executable: Option<PathBuf>,
    pub color_map: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub exclude_foreign_groups: Option<bool>,
    /// Property overrides in priority order.
    #[serde(default, deserialize_with = "table_entries")]
    pub properties: Vec<(String, String)>,
}

fn table_entries<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<(String, String)>, D::Error> {
    BTreeMap::<String, String>::deserialize(deserializer).map(|table| table.into_iter().collect())
}

impl SettingsLayer {
    /// Reads a TOML settings file.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| PipelineError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Parses a `key=value` property assignment.
///
/// ```rust
/// use openscad_colorsplit::parse_assignment;
///
/// assert_eq!(parse_assignment("label = v2").unwrap(), ("label".into(), "v2".into()));
/// assert!(parse_assignment("label").is_err());
/// ```
pub fn parse_assignment(text: &str) -> Result<(String, String), String> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{text}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty property name in `{text}`"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub input: PathBuf,
    /// Input file name without its extension.
    pub input_name: String,
    pub output_dir: PathBuf,
    pub mtl_output: PathBuf,
    pub merge_pattern: String,
    pub scad_pattern: String,
    pub stl_pattern: String,
    pub obj_pattern: String,
    pub material_pattern: String,
    pub executable: PathBuf,
    pub color_map: Option<PathBuf>,
    pub jobs: NonZeroUsize,
    /// `None` disables the render timeout.
    pub timeout: Option<Duration>,
    pub isolation: IsolationOptions,
    pub properties: PropertyOverrides,
}

macro_rules! pick {
    ($layers:expr, $field:ident) => {
        $layers.iter().find_map(|layer| layer.$field.clone())
    };
}

impl Settings {
    /// Resolves settings for `input`; `layers` are ordered highest priority
    /// first.
    ///
    /// Relative output paths are anchored at the working directory. The
    /// default output directory sits next to the input.
    pub fn resolve(input: impl Into<PathBuf>, layers: &[SettingsLayer]) -> PipelineResult<Self> {
        let input = absolute(input.into())?;
        let input_name = input_name(&input)?;
        let names = Placeholders::input(&input_name);

        let output_dir = match pick!(layers, output_dir) {
            Some(dir) => absolute(dir)?,
            None => input
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(names.expand(DEFAULT_OUTPUT_DIR_PATTERN)),
        };
        let mtl_output = match pick!(layers, mtl_output) {
            Some(path) => absolute(path)?,
            None => output_dir.join(names.expand(DEFAULT_MTL_PATTERN)),
        };

        let jobs = match pick!(layers, jobs) {
            Some(jobs) => NonZeroUsize::new(jobs).ok_or(PipelineError::InvalidValue {
                key: "jobs",
                message: "must be at least 1".to_string(),
            })?,
            None => std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
        };
        let timeout = match pick!(layers, timeout_secs).unwrap_or(DEFAULT_RENDER_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let foreign_groups = if pick!(layers, exclude_foreign_groups).unwrap_or(false) {
            ForeignGroupPolicy::Neutralize
        } else {
            ForeignGroupPolicy::Preserve
        };

        let mut properties = PropertyOverrides::new();
        for (key, value) in layers.iter().flat_map(|layer| layer.properties.iter()) {
            properties.insert(key.clone(), value.clone());
        }

        // {input} is fixed for the whole run
        let pattern = |value: Option<String>, default: &str| {
            names.expand(value.as_deref().unwrap_or(default))
        };

        Ok(Self {
            merge_pattern: pattern(pick!(layers, merge_output), DEFAULT_MERGE_PATTERN),
            scad_pattern: pattern(pick!(layers, scad_pattern), DEFAULT_SCAD_PATTERN),
            stl_pattern: pattern(pick!(layers, stl_pattern), DEFAULT_STL_PATTERN),
            obj_pattern: pattern(pick!(layers, obj_pattern), DEFAULT_OBJ_PATTERN),
            material_pattern: pattern(pick!(layers, material_pattern), DEFAULT_MATERIAL_PATTERN),
            executable: pick!(layers, executable).unwrap_or_else(default_executable),
            color_map: pick!(layers, color_map),
            input,
            input_name,
            output_dir,
            mtl_output,
            jobs,
            timeout,
            isolation: IsolationOptions { foreign_groups },
            properties,
        })
    }
}

fn absolute(path: PathBuf) -> PipelineResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&path))
        .map_err(|e| PipelineError::InvalidValue {
            key: "path",
            message: format!("cannot resolve {}: {e}", path.display()),
        })
}

fn input_name(input: &Path) -> PipelineResult<String> {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| PipelineError::InvalidValue {
            key: "input",
            message: format!("{} has no file name", input.display()),
        })
}
