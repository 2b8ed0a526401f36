//! Availability probe for the external tool.

use serde::Serialize;
use tracing::{debug, warn};

use super::invoker::Compressor;

/// Result of probing the compression tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    /// Whether the tool could be executed
    pub available: bool,

    /// Version line on success, diagnostic on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Run the tool's version check and report whether it is reachable.
///
/// Independent of any in-flight compression request.
pub async fn probe<C: Compressor + ?Sized>(compressor: &C) -> ToolStatus {
    match compressor.version().await {
        Ok(version) => {
            debug!(
                command = compressor.command(),
                version = %version,
                "Compression tool available"
            );
            ToolStatus {
                available: true,
                detail: (!version.is_empty()).then_some(version),
            }
        }
        Err(e) => {
            warn!(command = compressor.command(), "Compression tool unavailable: {}", e);
            ToolStatus {
                available: false,
                detail: Some(e.to_string()),
            }
        }
    }
}
