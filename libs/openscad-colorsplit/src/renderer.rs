//! # Renderer
//!
//! The external renderer is a black box: exit status 0 means the artifact
//! exists, anything else means there is no usable artifact. Renders run as
//! child processes polled against a deadline, and a render still running at
//! the deadline is killed and reported as a timeout.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use config::constants::{DEFAULT_OPENSCAD, FALLBACK_OPENSCAD, RENDER_POLL_INTERVAL};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot start {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("renderer exited with {}{}", status_text(.code), stderr_tail(.stderr))]
    Failed { code: Option<i32>, stderr: String },

    #[error("renderer still running after {}s, killed", .after.as_secs())]
    Timeout { after: Duration },

    #[error("lost track of renderer process: {0}")]
    Wait(#[source] std::io::Error),
}

fn status_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

fn stderr_tail(stderr: &str) -> String {
    match stderr.lines().rev().find(|line| !line.trim().is_empty()) {
        Some(line) => format!(": {}", line.trim()),
        None => String::new(),
    }
}

/// Turns a source variant into a mesh artifact.
///
/// Implementations are shared across render workers.
pub trait Renderer: Sync {
    fn render(&self, source: &Path, artifact: &Path) -> Result<(), RenderError>;
}

/// Runs `openscad -o <artifact> <source>`.
#[derive(Debug, Clone)]
pub struct OpenScadRenderer {
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl OpenScadRenderer {
    /// `timeout` of `None` waits indefinitely.
    pub fn new(executable: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn wait(&self, child: &mut Child) -> Result<std::process::ExitStatus, RenderError> {
        let started = Instant::now();
        loop {
            match child.try_wait().map_err(RenderError::Wait)? {
                Some(status) => return Ok(status),
                None => {
                    if let Some(limit) = self.timeout {
                        if started.elapsed() > limit {
                            tracing::warn!(pid = child.id(), "render timed out, killing");
                            let _ = child.kill();
                            let _ = child.wait();
                            return Err(RenderError::Timeout { after: limit });
                        }
                    }
                    std::thread::sleep(RENDER_POLL_INTERVAL);
                }
            }
        }
    }
}

impl Default for OpenScadRenderer {
    fn default() -> Self {
        Self::new(default_executable(), Some(config::constants::render_timeout()))
    }
}

impl Renderer for OpenScadRenderer {
    fn render(&self, source: &Path, artifact: &Path) -> Result<(), RenderError> {
        let mut child = Command::new(&self.executable)
            .arg("-o")
            .arg(artifact)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: self.executable.clone(),
                source,
            })?;

        // drained on a side thread, a full pipe would stall the child
        let reader = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });

        let status = self.wait(&mut child);
        let stderr = reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        let status = status?;
        if status.success() {
            tracing::debug!(artifact = %artifact.display(), "render finished");
            Ok(())
        } else {
            Err(RenderError::Failed {
                code: status.code(),
                stderr,
            })
        }
    }
}

/// The default executable, or the fallback install location when the
/// default is an absolute path that does not exist.
pub fn default_executable() -> PathBuf {
    let default = Path::new(DEFAULT_OPENSCAD);
    let fallback = Path::new(FALLBACK_OPENSCAD);
    if default.is_absolute() && !default.exists() && fallback.exists() {
        fallback.to_path_buf()
    } else {
        default.to_path_buf()
    }
}
