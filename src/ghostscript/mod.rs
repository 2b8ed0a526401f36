//! Ghostscript integration layer.
//!
//! This module wraps the external Ghostscript binary and the policy that
//! decides which quality presets to run for a requested compression mode.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │ CompressionMode
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            CompressionPlan              │
//! │  (primary preset, optional fallback,    │
//! │   optional target size)                 │
//! └────────────────────┬────────────────────┘
//!                      │ Preset
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           Compressor Trait              │
//! │  (version probe, one compression run)   │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │         GhostscriptCompressor           │
//! │  (child process: gs -sDEVICE=pdfwrite)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`CompressionMode`]: Client-facing mode names (`quality-ebook`, `max-1mb`, ...)
//! - [`Preset`]: Ghostscript `-dPDFSETTINGS` values
//! - [`CompressionPlan`]: Attempts to run for a mode and how to pick the result
//! - [`Compressor`]: Seam between the plan and the external tool
//! - [`GhostscriptCompressor`]: The real child-process implementation
//! - [`probe`]: Availability check used by health endpoints

mod invoker;
mod plan;
mod preset;
mod probe;

pub use invoker::{
    build_args, resolve_command, Compressor, GhostscriptCompressor, DEFAULT_GS_COMMAND,
};
pub use plan::{
    CompressionOutcome, CompressionPlan, FALLBACK_OUTPUT_NAME, MAX_TARGET_BYTES,
    PRIMARY_OUTPUT_NAME, TARGET_MISSED_NOTE,
};
pub use preset::{CompressionMode, Preset};
pub use probe::{probe, ToolStatus};
