//! # Pipeline Errors
//!
//! Only run-level failures live here. Per-unit problems (isolation, render,
//! import) are logged and recorded in the run summary instead.

use std::path::PathBuf;

use config::constants::{EXIT_BAD_INPUT, EXIT_FAILURE};
use openscad_obj::AssembleError;
use openscad_palette::PaletteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input source is missing or unreadable.
    #[error("cannot read input {}: {source}", .path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The palette file is missing or unreadable.
    #[error(transparent)]
    Palette(#[from] PaletteError),

    /// The settings file is unreadable or malformed.
    #[error("invalid settings {}: {message}", .path.display())]
    Settings { path: PathBuf, message: String },

    /// A setting value that cannot be used.
    #[error("invalid setting `{key}`: {message}")]
    InvalidValue { key: &'static str, message: String },

    /// The output directory cannot be created.
    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A merged model or the material library could not be written.
    #[error(transparent)]
    Assemble(#[from] AssembleError),

    /// The render worker pool could not be started.
    #[error("cannot start render workers: {0}")]
    Workers(#[from] rayon::ThreadPoolBuildError),
}

impl PipelineError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Source { .. }
            | Self::Palette(_)
            | Self::Settings { .. }
            | Self::InvalidValue { .. } => EXIT_BAD_INPUT,
            Self::OutputDir { .. } | Self::Assemble(_) | Self::Workers(_) => EXIT_FAILURE,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
