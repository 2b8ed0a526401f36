//! # PDF Shrink
//!
//! An HTTP service that shrinks uploaded PDF documents by running Ghostscript
//! with one of several quality presets.
//!
//! ## Features
//!
//! - **Quality presets**: `quality-screen`, `quality-ebook`, `quality-printer`
//! - **Size target**: `max-1mb` tries `ebook`, then `screen`, and never returns
//!   the larger of the two
//! - **Bounded uploads**: the size ceiling is enforced while the upload streams
//!   to disk
//! - **No leftovers**: every request works in its own temporary directory,
//!   removed when the request finishes
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`ghostscript`] - Presets, compression plans and the Ghostscript invoker
//! - [`workspace`] - Request-scoped temporary storage
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use pdf_shrink::{create_router, GhostscriptCompressor, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let compressor = GhostscriptCompressor::from_override(None);
//!     let router = create_router(compressor, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:4000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod ghostscript;
pub mod server;
pub mod workspace;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, CompressConfig, ServeConfig};
pub use error::{CompressError, ToolError};
pub use ghostscript::{
    build_args, probe, resolve_command, CompressionMode, CompressionOutcome, CompressionPlan,
    Compressor, GhostscriptCompressor, Preset, ToolStatus, DEFAULT_GS_COMMAND, MAX_TARGET_BYTES,
    TARGET_MISSED_NOTE,
};
pub use server::{
    compress_handler, create_router, health_handler, output_file_name, AppState, ErrorResponse,
    HealthResponse, RouterConfig, UploadedDocument,
};
pub use workspace::RequestWorkspace;
