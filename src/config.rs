//! Configuration management for PDF Shrink.
//!
//! This module provides the command-line interface and configuration types:
//! - Command-line arguments via clap
//! - Environment variables for every server setting
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use pdf_shrink::config::{Cli, Command};
//!
//! match Cli::parse().into_command() {
//!     Command::Serve(config) => println!("Listening on {}", config.bind_address()),
//!     Command::Check(_) | Command::Compress(_) => {}
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `HOST` - Server bind address (default: 0.0.0.0)
//! - `PORT` - Server port (default: 4000)
//! - `GS_BIN` - Ghostscript binary (default: `gs`, `gswin64c` on Windows)
//! - `ALLOWED_ORIGINS` - Comma-separated CORS allow-list (default: any origin)
//! - `MAX_UPLOAD_BYTES` - Upload size ceiling (default: 25 MiB)
//! - `OUTPUT_BRAND` - Brand in the download file name (default: myworkspace)
//! - `PDF_SHRINK_TEMP_DIR` - Parent directory for request workspaces

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::ghostscript::{resolve_command, CompressionMode};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 4000;

/// Default upload ceiling (25 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// Default brand used in output file names.
pub const DEFAULT_BRAND: &str = "myworkspace";

// =============================================================================
// CLI Arguments
// =============================================================================

/// PDF Shrink - Compress PDF documents with Ghostscript.
///
/// Runs the HTTP compression service by default. Use the `check` and
/// `compress` subcommands to test a Ghostscript installation locally.
#[derive(Parser, Debug, Clone)]
#[command(name = "pdf-shrink")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeConfig,
}

impl Cli {
    /// The command to run, defaulting to `serve`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP compression service (default).
    Serve(ServeConfig),

    /// Check that Ghostscript can be executed.
    Check(CheckConfig),

    /// Compress a single local PDF file.
    Compress(CompressConfig),
}

// =============================================================================
// Serve Configuration
// =============================================================================

/// Settings for the HTTP service.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PORT")]
    pub port: u16,

    // =========================================================================
    // Ghostscript Configuration
    // =========================================================================
    /// Ghostscript binary name or path.
    ///
    /// If not specified, uses `gs` (`gswin64c` on Windows).
    #[arg(long, env = "GS_BIN")]
    pub gs_bin: Option<String>,

    // =========================================================================
    // Upload Configuration
    // =========================================================================
    /// Maximum accepted upload size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: u64,

    /// Brand appended to output file names (`<name>_compressed_by_<brand>.pdf`).
    #[arg(long, default_value = DEFAULT_BRAND, env = "OUTPUT_BRAND")]
    pub brand: String,

    /// Directory under which per-request temporary workspaces are created.
    ///
    /// Defaults to the system temporary directory.
    #[arg(long, env = "PDF_SHRINK_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }

        validate_brand(&self.brand)?;

        if let Some(ref dir) = self.temp_dir {
            if !dir.is_dir() {
                return Err(format!(
                    "temp_dir '{}' is not an existing directory",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The Ghostscript command to run.
    pub fn gs_command(&self) -> String {
        resolve_command(self.gs_bin.as_deref())
    }

    /// Allowed CORS origins, trimmed, with blank entries removed.
    ///
    /// Returns `None` (any origin) when unset or when no entry remains.
    pub fn cors_origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .allowed_origins
            .as_ref()?
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        (!origins.is_empty()).then_some(origins)
    }
}

/// The brand is placed inside a quoted header value and a file name.
fn validate_brand(brand: &str) -> Result<(), String> {
    if brand.is_empty() {
        return Err("brand must not be empty".to_string());
    }
    if !brand
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(format!(
            "brand '{}' may only contain ASCII letters, digits, '-', '_' and '.'",
            brand
        ));
    }
    Ok(())
}

// =============================================================================
// Check Configuration
// =============================================================================

/// Settings for the `check` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    /// Ghostscript binary name or path.
    #[arg(long, env = "GS_BIN")]
    pub gs_bin: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl CheckConfig {
    /// The Ghostscript command to run.
    pub fn gs_command(&self) -> String {
        resolve_command(self.gs_bin.as_deref())
    }
}

// =============================================================================
// Compress Configuration
// =============================================================================

/// Settings for the `compress` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CompressConfig {
    /// PDF file to compress.
    pub input: PathBuf,

    /// Output path (default: `<name>_compressed.pdf` next to the input).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compression mode: quality-screen, quality-ebook, quality-printer or max-1mb.
    #[arg(short, long, default_value = "quality-ebook")]
    pub mode: String,

    /// Ghostscript binary name or path.
    #[arg(long, env = "GS_BIN")]
    pub gs_bin: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl CompressConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.input.is_file() {
            return Err(format!("input '{}' is not a file", self.input.display()));
        }
        self.compression_mode()?;
        if self.output_path() == self.input {
            return Err("output must differ from input".to_string());
        }
        Ok(())
    }

    /// The requested mode. Unlike the HTTP field, unknown names are rejected.
    pub fn compression_mode(&self) -> Result<CompressionMode, String> {
        CompressionMode::from_name(&self.mode).ok_or_else(|| {
            let names: Vec<&str> = CompressionMode::ALL.iter().map(|m| m.as_str()).collect();
            format!(
                "unknown mode '{}' (expected one of: {})",
                self.mode,
                names.join(", ")
            )
        })
    }

    /// The Ghostscript command to run.
    pub fn gs_command(&self) -> String {
        resolve_command(self.gs_bin.as_deref())
    }

    /// Where the compressed file is written.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input))
    }
}

/// `<dir>/<stem>_compressed.pdf` for an input at `<dir>/<stem>.pdf`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());

    input.with_file_name(format!("{}_compressed.pdf", stem))
}

// =============================================================================
// Tests
// =============================================================================
