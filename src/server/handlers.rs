//! HTTP request handlers for the PDF Shrink API.
//!
//! # Endpoints
//!
//! - `POST /compress` - Compress an uploaded PDF
//! - `GET /healthz` - Ghostscript availability check

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::CompressError;
use crate::ghostscript::{probe, CompressionMode, CompressionOutcome, CompressionPlan, Compressor};
use crate::workspace::RequestWorkspace;

use super::upload::{output_file_name, receive_upload, PDF_MEDIA_TYPE};

/// Response header carrying the upload size in bytes.
pub const ORIGINAL_SIZE_HEADER: &str = "x-original-size";

/// Response header carrying the compressed size in bytes.
pub const COMPRESSED_SIZE_HEADER: &str = "x-compressed-size";

/// Response header carrying the advisory note, when present.
pub const NOTE_HEADER: &str = "x-note";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the compressor and upload settings.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<C: Compressor> {
    /// The compressor, configured once at startup
    pub compressor: Arc<C>,

    /// Upload size ceiling in bytes
    pub max_upload_bytes: u64,

    /// Brand used in output file names
    pub brand: Arc<str>,

    /// Parent directory for request workspaces (None = system temp dir)
    pub temp_dir: Option<Arc<PathBuf>>,
}

impl<C: Compressor> AppState<C> {
    /// Create a new application state with default upload settings.
    pub fn new(compressor: C) -> Self {
        Self {
            compressor: Arc::new(compressor),
            max_upload_bytes: crate::config::DEFAULT_MAX_UPLOAD_BYTES,
            brand: Arc::from(crate::config::DEFAULT_BRAND),
            temp_dir: None,
        }
    }

    /// Set the upload size ceiling.
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Set the brand used in output file names.
    pub fn with_brand(mut self, brand: impl AsRef<str>) -> Self {
        self.brand = Arc::from(brand.as_ref());
        self
    }

    /// Create request workspaces under `dir`.
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir.map(Arc::new);
        self
    }
}

impl<C: Compressor> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            compressor: Arc::clone(&self.compressor),
            max_upload_bytes: self.max_upload_bytes,
            brand: Arc::clone(&self.brand),
            temp_dir: self.temp_dir.clone(),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: String,

    /// Diagnostic from the external tool, when relevant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health
    pub ok: bool,

    /// Whether Ghostscript could be executed
    pub gs: bool,

    /// Probe diagnostic when unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert CompressError to HTTP response.
///
/// 4xx errors are logged at WARN level, 5xx errors at ERROR level.
impl IntoResponse for CompressError {
    fn into_response(self) -> Response {
        let status = match &self {
            CompressError::MissingFile
            | CompressError::DuplicateFile
            | CompressError::InvalidFileType { .. }
            | CompressError::MalformedUpload(_) => StatusCode::BAD_REQUEST,
            CompressError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CompressError::ToolUnavailable(_)
            | CompressError::Tool(_)
            | CompressError::Workspace(_)
            | CompressError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.to_string();
        let detail = self.detail();

        if status.is_server_error() {
            error!(
                status = status.as_u16(),
                detail = ?detail,
                "Server error: {}",
                message
            );
        } else {
            warn!(status = status.as_u16(), "Client error: {}", message);
        }

        (status, Json(ErrorResponse { message, detail })).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle compression requests.
///
/// # Endpoint
///
/// `POST /compress`
///
/// # Form Fields
///
/// - `pdf`: The document (`Content-Type: application/pdf`), required
/// - `mode`: `quality-screen`, `quality-ebook` (default), `quality-printer` or `max-1mb`
///
/// # Response
///
/// - `200 OK`: Compressed PDF
/// - `400 Bad Request`: Missing file, wrong media type, malformed upload
/// - `413 Payload Too Large`: Upload above the configured ceiling
/// - `500 Internal Server Error`: Ghostscript unavailable or failed
///
/// # Headers
///
/// - `Content-Type: application/pdf`
/// - `Content-Disposition: attachment; filename="<name>_compressed_by_<brand>.pdf"`
/// - `X-Original-Size`, `X-Compressed-Size`
/// - `X-Note` when `max-1mb` could not reach 1 MiB
pub async fn compress_handler<C: Compressor>(
    State(state): State<AppState<C>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, CompressError> {
    let multipart = multipart.map_err(|rejection| {
        debug!("Request is not a multipart upload: {}", rejection);
        CompressError::MissingFile
    })?;

    let workspace = RequestWorkspace::create(state.temp_dir.as_deref().map(|p| p.as_path()))?;
    let upload = receive_upload(multipart, &workspace, state.max_upload_bytes).await?;

    let document = upload.document.ok_or(CompressError::MissingFile)?;
    let mode = CompressionMode::resolve(upload.mode.as_deref());
    debug!(
        mode = %mode,
        requested = ?upload.mode,
        size = document.size,
        "Compressing upload"
    );

    // The workspace moves into the task so a client disconnect cannot cut
    // the external call short; it is removed once the task finishes.
    let compressor = Arc::clone(&state.compressor);
    let input = document.path.clone();
    let task = tokio::spawn(async move {
        let result = run_compression(compressor.as_ref(), mode, &input, &workspace).await;
        workspace.remove().await;
        result
    });

    let outcome = task
        .await
        .map_err(|e| CompressError::Internal(format!("compression task failed: {}", e)))??;

    build_pdf_response(&state, document.file_name.as_deref(), document.size, outcome)
}

async fn run_compression<C: Compressor>(
    compressor: &C,
    mode: CompressionMode,
    input: &Path,
    workspace: &RequestWorkspace,
) -> Result<CompressionOutcome, CompressError> {
    compressor
        .version()
        .await
        .map_err(CompressError::ToolUnavailable)?;

    CompressionPlan::for_mode(mode)
        .execute(compressor, input, workspace)
        .await
        .map_err(CompressError::Tool)
}

fn build_pdf_response<C: Compressor>(
    state: &AppState<C>,
    file_name: Option<&str>,
    original_size: u64,
    outcome: CompressionOutcome,
) -> Result<Response, CompressError> {
    let file_name = output_file_name(file_name, &state.brand);

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PDF_MEDIA_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .header(ORIGINAL_SIZE_HEADER, original_size.to_string())
        .header(COMPRESSED_SIZE_HEADER, outcome.compressed_size().to_string());

    if let Some(note) = outcome.note {
        builder = builder.header(NOTE_HEADER, note);
    }

    builder
        .body(Body::from(outcome.data))
        .map_err(|e| CompressError::Internal(format!("failed to build response: {}", e)))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /healthz`
///
/// # Response
///
/// `200 OK` with `{"ok": true, "gs": true}` when Ghostscript runs,
/// otherwise `500` with `{"ok": false, "gs": false, "error": "..."}`.
pub async fn health_handler<C: Compressor>(State(state): State<AppState<C>>) -> Response {
    let status = probe(state.compressor.as_ref()).await;

    if status.available {
        (
            StatusCode::OK,
            Json(HealthResponse {
                ok: true,
                gs: true,
                error: None,
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse {
                ok: false,
                gs: false,
                error: status.detail,
            }),
        )
            .into_response()
    }
}

// =============================================================================
// Tests
// =============================================================================
