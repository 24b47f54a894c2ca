//! Joiners backed by external command-line tools.

use super::Joiner;
use crate::error::{Error, Result};
use crate::render::ExportMode;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Locate an executable on `PATH`.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        let path = dir.join(program);
        if is_executable(&path) {
            return Some(path);
        }
        if cfg!(windows) {
            let exe = path.with_extension("exe");
            if is_executable(&exe) {
                return Some(exe);
            }
        }
        None
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Run a joining tool, reporting its stderr on failure.
fn run_tool(joiner: &str, program: &str, args: Vec<OsString>) -> Result<()> {
    tracing::debug!(program, ?args, "running join tool");

    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| Error::join(joiner, format!("failed to run '{}': {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::join(
            joiner,
            format!("{} exited with {}: {}", program, output.status, stderr.trim()),
        ));
    }

    Ok(())
}

/// Combines PNG pages into a PDF with ImageMagick.
#[derive(Debug, Clone)]
pub struct ImageMagickJoiner {
    program: String,
    dpi: u32,
}

impl Default for ImageMagickJoiner {
    fn default() -> Self {
        Self {
            program: "convert".to_string(),
            dpi: 180,
        }
    }
}

impl ImageMagickJoiner {
    /// Create a joiner using `convert` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another ImageMagick entry point (e.g. `magick`).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Resample resolution of the output.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Arguments for joining `pages` into `output`.
    pub fn args(&self, pages: &[PathBuf], output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = pages.iter().map(OsString::from).collect();
        args.push("-resample".into());
        args.push(self.dpi.to_string().into());
        args.push(output.into());
        args
    }
}

impl Joiner for ImageMagickJoiner {
    fn name(&self) -> &'static str {
        "convert"
    }

    fn supports(&self, mode: ExportMode) -> bool {
        mode == ExportMode::Png
    }

    fn is_available(&self) -> bool {
        find_on_path(&self.program).is_some()
    }

    fn join(&self, pages: &[PathBuf], output: &Path) -> Result<()> {
        run_tool(self.name(), &self.program, self.args(pages, output))
    }
}

/// Joins PDF pages with `pdfjoin` from pdfjam.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfJoinJoiner;

impl PdfJoinJoiner {
    /// Arguments for joining `pages` into `output`.
    pub fn args(&self, pages: &[PathBuf], output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--outfile".into(), output.into()];
        args.extend(pages.iter().map(OsString::from));
        args
    }
}

impl Joiner for PdfJoinJoiner {
    fn name(&self) -> &'static str {
        "pdfjoin"
    }

    fn supports(&self, mode: ExportMode) -> bool {
        mode == ExportMode::Pdf
    }

    fn is_available(&self) -> bool {
        find_on_path("pdfjoin").is_some()
    }

    fn join(&self, pages: &[PathBuf], output: &Path) -> Result<()> {
        run_tool(self.name(), "pdfjoin", self.args(pages, output))
    }
}

/// Joins PDF pages with `pdftk`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdftkJoiner;

impl PdftkJoiner {
    /// Arguments for joining `pages` into `output`.
    pub fn args(&self, pages: &[PathBuf], output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = pages.iter().map(OsString::from).collect();
        args.push("cat".into());
        args.push("output".into());
        args.push(output.into());
        args
    }
}

impl Joiner for PdftkJoiner {
    fn name(&self) -> &'static str {
        "pdftk"
    }

    fn supports(&self, mode: ExportMode) -> bool {
        mode == ExportMode::Pdf
    }

    fn is_available(&self) -> bool {
        find_on_path("pdftk").is_some()
    }

    fn join(&self, pages: &[PathBuf], output: &Path) -> Result<()> {
        run_tool(self.name(), "pdftk", self.args(pages, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> Vec<PathBuf> {
        vec![PathBuf::from("a.p00000.pdf"), PathBuf::from("a.p00001.pdf")]
    }

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_imagemagick_args() {
        let args = ImageMagickJoiner::new()
            .with_dpi(90)
            .args(&pages(), Path::new("a.pdf"));
        assert_eq!(
            strings(args),
            vec!["a.p00000.pdf", "a.p00001.pdf", "-resample", "90", "a.pdf"]
        );
    }

    #[test]
    fn test_pdfjoin_args() {
        let args = PdfJoinJoiner.args(&pages(), Path::new("a.pdf"));
        assert_eq!(
            strings(args),
            vec!["--outfile", "a.pdf", "a.p00000.pdf", "a.p00001.pdf"]
        );
    }

    #[test]
    fn test_pdftk_args() {
        let args = PdftkJoiner.args(&pages(), Path::new("a.pdf"));
        assert_eq!(
            strings(args),
            vec!["a.p00000.pdf", "a.p00001.pdf", "cat", "output", "a.pdf"]
        );
    }

    #[test]
    fn test_modes() {
        assert!(ImageMagickJoiner::new().supports(ExportMode::Png));
        assert!(!ImageMagickJoiner::new().supports(ExportMode::Pdf));
        assert!(PdfJoinJoiner.supports(ExportMode::Pdf));
        assert!(!PdftkJoiner.supports(ExportMode::Png));
    }

    #[test]
    fn test_find_on_path_missing() {
        assert!(find_on_path("surely-not-an-installed-tool-4711").is_none());
        assert!(find_on_path("/nonexistent/dir/tool").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_on_path_requires_execute_bit() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("pdfjoin");
        fs::write(&tool, "#!/bin/sh\n").unwrap();
        let program = tool.to_str().unwrap();

        fs::set_permissions(&tool, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(find_on_path(program).is_none());

        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(find_on_path(program), Some(tool.clone()));

        assert!(find_on_path(dir.path().to_str().unwrap()).is_none());
    }

    #[test]
    fn test_missing_tool_is_a_join_error() {
        let err = ImageMagickJoiner::new()
            .with_program("surely-not-an-installed-tool-4711")
            .join(&pages(), Path::new("a.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::Join { .. }));
    }
}
