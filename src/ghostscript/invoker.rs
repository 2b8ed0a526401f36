//! Child-process invocation of Ghostscript.
//!
//! Every compression attempt is one `gs` run writing to an explicit output
//! path, followed by reading that file back into memory. The command name is
//! resolved once at startup and held by [`GhostscriptCompressor`].

use std::ffi::OsString;
use std::path::Path;
use std::process::{Output, Stdio};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::process::Command;
use tracing::debug;

use crate::error::ToolError;

use super::preset::Preset;

/// Ghostscript command used when no override is configured.
#[cfg(windows)]
pub const DEFAULT_GS_COMMAND: &str = "gswin64c";

/// Ghostscript command used when no override is configured.
#[cfg(not(windows))]
pub const DEFAULT_GS_COMMAND: &str = "gs";

/// PDF version emitted by the `pdfwrite` device.
const COMPATIBILITY_LEVEL: &str = "1.4";

// =============================================================================
// Compressor Trait
// =============================================================================

/// Trait for running the external compression tool.
///
/// This abstraction lets the compression plan and HTTP handlers run against
/// a test double instead of a real Ghostscript installation.
#[async_trait]
pub trait Compressor: Send + Sync + 'static {
    /// Check that the tool can be executed, returning its version line.
    async fn version(&self) -> Result<String, ToolError>;

    /// Compress `input` into `output` using `preset`, returning the bytes
    /// written to `output`.
    async fn compress(&self, input: &Path, output: &Path, preset: Preset)
        -> Result<Bytes, ToolError>;

    /// The command this compressor runs (for logging).
    fn command(&self) -> &str;
}

// =============================================================================
// Command Resolution
// =============================================================================

/// Resolve the Ghostscript command from an optional override.
///
/// Blank overrides are ignored.
pub fn resolve_command(override_bin: Option<&str>) -> String {
    match override_bin.map(str::trim) {
        Some(bin) if !bin.is_empty() => bin.to_string(),
        _ => DEFAULT_GS_COMMAND.to_string(),
    }
}

/// Build the Ghostscript argument list for one compression run.
///
/// The input path is always the final positional argument.
pub fn build_args(input: &Path, output: &Path, preset: Preset) -> Vec<OsString> {
    let mut output_arg = OsString::from("-sOutputFile=");
    output_arg.push(output);

    vec![
        OsString::from("-sDEVICE=pdfwrite"),
        OsString::from(format!("-dCompatibilityLevel={}", COMPATIBILITY_LEVEL)),
        OsString::from(format!("-dPDFSETTINGS={}", preset.as_setting())),
        OsString::from("-dNOPAUSE"),
        OsString::from("-dQUIET"),
        OsString::from("-dBATCH"),
        output_arg,
        input.as_os_str().to_os_string(),
    ]
}

// =============================================================================
// Ghostscript Compressor
// =============================================================================

/// [`Compressor`] backed by a Ghostscript binary.
#[derive(Debug, Clone)]
pub struct GhostscriptCompressor {
    command: String,
}

impl GhostscriptCompressor {
    /// Create a compressor that runs exactly `command`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Create a compressor from an optional `GS_BIN`-style override.
    pub fn from_override(override_bin: Option<&str>) -> Self {
        Self::new(resolve_command(override_bin))
    }

    async fn run(&self, args: &[OsString]) -> Result<Output, ToolError> {
        let output = Command::new(&self.command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ToolError::Spawn {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                command: self.command.clone(),
                status: output.status.to_string(),
                stderr: diagnostic(&output),
            });
        }

        Ok(output)
    }
}

impl Default for GhostscriptCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_GS_COMMAND)
    }
}

#[async_trait]
impl Compressor for GhostscriptCompressor {
    async fn version(&self) -> Result<String, ToolError> {
        let output = self.run(&[OsString::from("-v")]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string())
    }

    async fn compress(
        &self,
        input: &Path,
        output: &Path,
        preset: Preset,
    ) -> Result<Bytes, ToolError> {
        let args = build_args(input, output, preset);
        debug!(
            command = %self.command,
            preset = %preset,
            output = %output.display(),
            "Running Ghostscript"
        );

        self.run(&args).await?;

        let data = tokio::fs::read(output)
            .await
            .map_err(|e| ToolError::ReadOutput {
                path: output.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(Bytes::from(data))
    }

    fn command(&self) -> &str {
        &self.command
    }
}

/// Pick the most useful diagnostic from a failed run.
///
/// Ghostscript reports many errors on stdout, so fall back to it when
/// stderr is empty.
fn diagnostic(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

// =============================================================================
// Tests
// =============================================================================
