//! Compression plans: which presets to run for a mode, and which result wins.
//!
//! Discrete quality modes run a single preset. `max-1mb` runs `ebook` first
//! and only falls back to `screen` when the first result is above the target:
//!
//! ```text
//!   ebook ──► size <= 1 MiB ? ──yes──► done (1 invocation)
//!                 │ no
//!                 ▼
//!   screen ─► size <= 1 MiB or smaller than ebook ? ──yes──► screen
//!                 │ no
//!                 ▼
//!               ebook (never regress to a larger file)
//! ```

use std::path::Path;

use bytes::Bytes;
use tracing::{debug, info};

use crate::error::ToolError;
use crate::workspace::RequestWorkspace;

use super::invoker::Compressor;
use super::preset::{CompressionMode, Preset};

/// Target size for `max-1mb` (1 MiB).
pub const MAX_TARGET_BYTES: u64 = 1024 * 1024;

/// Advisory note attached when the target size could not be met.
pub const TARGET_MISSED_NOTE: &str =
    "Final size is still above 1 MB even after maximum compression.";

/// Workspace file name for the primary attempt.
pub const PRIMARY_OUTPUT_NAME: &str = "primary.pdf";

/// Workspace file name for the fallback attempt.
pub const FALLBACK_OUTPUT_NAME: &str = "fallback.pdf";

// =============================================================================
// Compression Plan
// =============================================================================

/// The attempts to run for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionPlan {
    /// Preset for the first (and usually only) attempt
    pub primary: Preset,

    /// Preset to try when the primary result misses the target
    pub fallback: Option<Preset>,

    /// Size the result should not exceed, in bytes
    pub target_bytes: Option<u64>,
}

impl CompressionPlan {
    /// Resolve the plan for a compression mode.
    pub fn for_mode(mode: CompressionMode) -> Self {
        match mode {
            CompressionMode::QualityScreen => Self::single(Preset::Screen),
            CompressionMode::QualityEbook => Self::single(Preset::Ebook),
            CompressionMode::QualityPrinter => Self::single(Preset::Printer),
            CompressionMode::Max1Mb => Self {
                primary: Preset::Ebook,
                fallback: Some(Preset::Screen),
                target_bytes: Some(MAX_TARGET_BYTES),
            },
        }
    }

    fn single(preset: Preset) -> Self {
        Self {
            primary: preset,
            fallback: None,
            target_bytes: None,
        }
    }

    /// Maximum number of tool invocations this plan can make.
    pub fn max_attempts(&self) -> usize {
        1 + usize::from(self.fallback.is_some())
    }

    /// Run the plan against `input`, writing attempt outputs into `workspace`.
    ///
    /// Tool failures are returned as-is; the fallback attempt is a policy
    /// branch, not a retry.
    pub async fn execute<C>(
        &self,
        compressor: &C,
        input: &Path,
        workspace: &RequestWorkspace,
    ) -> Result<CompressionOutcome, ToolError>
    where
        C: Compressor + ?Sized,
    {
        let primary = attempt(
            compressor,
            input,
            &workspace.file(PRIMARY_OUTPUT_NAME),
            self.primary,
        )
        .await?;

        let (target, fallback) = match (self.target_bytes, self.fallback) {
            (Some(target), Some(fallback)) if byte_len(&primary) > target => (target, fallback),
            _ => {
                let outcome = CompressionOutcome::new(primary, self.primary, 1, self.target_bytes);
                log_outcome(&outcome);
                return Ok(outcome);
            }
        };

        debug!(
            size = primary.len(),
            target_bytes = target,
            "Primary result above target, trying {}",
            fallback
        );

        let secondary = attempt(
            compressor,
            input,
            &workspace.file(FALLBACK_OUTPUT_NAME),
            fallback,
        )
        .await?;

        let outcome = if prefer_fallback(byte_len(&primary), byte_len(&secondary), target) {
            CompressionOutcome::new(secondary, fallback, 2, Some(target))
        } else {
            CompressionOutcome::new(primary, self.primary, 2, Some(target))
        };

        log_outcome(&outcome);
        Ok(outcome)
    }
}

/// Whether the fallback result replaces the primary one.
///
/// The fallback wins when it meets the target or is strictly smaller.
fn prefer_fallback(primary_len: u64, fallback_len: u64, target: u64) -> bool {
    fallback_len <= target || fallback_len < primary_len
}

async fn attempt<C>(
    compressor: &C,
    input: &Path,
    output: &Path,
    preset: Preset,
) -> Result<Bytes, ToolError>
where
    C: Compressor + ?Sized,
{
    let data = compressor.compress(input, output, preset).await?;
    debug!(preset = %preset, size = data.len(), "Compression attempt finished");
    Ok(data)
}

fn byte_len(data: &Bytes) -> u64 {
    data.len() as u64
}

fn log_outcome(outcome: &CompressionOutcome) {
    info!(
        preset = %outcome.preset,
        attempts = outcome.attempts,
        size = outcome.data.len(),
        target_missed = outcome.note.is_some(),
        "Compression finished"
    );
}

// =============================================================================
// Compression Outcome
// =============================================================================

/// The result selected as the response payload.
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    /// Compressed PDF bytes
    pub data: Bytes,

    /// Preset that produced `data`
    pub preset: Preset,

    /// Number of tool invocations made
    pub attempts: usize,

    /// Set when the target size could not be met
    pub note: Option<&'static str>,
}

impl CompressionOutcome {
    fn new(data: Bytes, preset: Preset, attempts: usize, target: Option<u64>) -> Self {
        let note = match target {
            Some(target) if byte_len(&data) > target => Some(TARGET_MISSED_NOTE),
            _ => None,
        };

        Self {
            data,
            preset,
            attempts,
            note,
        }
    }

    /// Size of the compressed document in bytes.
    pub fn compressed_size(&self) -> u64 {
        byte_len(&self.data)
    }
}

// =============================================================================
// Tests
// =============================================================================
