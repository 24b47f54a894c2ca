//! Inkscape command-line renderer.

use super::{ExportMode, Renderer};
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Renders pages by running the `inkscape` executable.
#[derive(Debug, Clone)]
pub struct InkscapeRenderer {
    program: PathBuf,
    legacy: bool,
    dpi: u32,
}

impl Default for InkscapeRenderer {
    fn default() -> Self {
        Self {
            program: PathBuf::from("inkscape"),
            legacy: false,
            dpi: 180,
        }
    }
}

impl InkscapeRenderer {
    /// Create a renderer using `inkscape` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific Inkscape executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Use the Inkscape 0.x command line (`-A`, `-e`).
    pub fn with_legacy_cli(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    /// Resolution of PNG exports.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Arguments passed to Inkscape for one page.
    pub fn args(&self, source: &Path, output: &Path, mode: ExportMode) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if self.legacy {
            match mode {
                ExportMode::Pdf => args.push("-A".into()),
                ExportMode::Png => {
                    args.push("-d".into());
                    args.push(self.dpi.to_string().into());
                    args.push("-e".into());
                }
            }
            args.push(output.into());
        } else {
            args.push(format!("--export-type={}", mode.extension()).into());
            if mode == ExportMode::Png {
                args.push(format!("--export-dpi={}", self.dpi).into());
            }
            args.push("--export-filename".into());
            args.push(output.into());
        }
        args.push(source.into());
        args
    }
}

impl Renderer for InkscapeRenderer {
    fn render(&self, source: &Path, output: &Path, mode: ExportMode) -> Result<()> {
        let args = self.args(source, output, mode);
        tracing::debug!(program = %self.program.display(), ?args, "running inkscape");

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                Error::render(
                    0,
                    format!(
                        "failed to run '{}' (is Inkscape installed and on PATH?): {}",
                        self.program.display(),
                        e
                    ),
                )
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::render(
                0,
                format!("inkscape exited with {}: {}", result.status, stderr.trim()),
            ));
        }

        if !output.exists() {
            return Err(Error::render(
                0,
                format!("inkscape did not produce '{}'", output.display()),
            ));
        }

        Ok(())
    }
}
