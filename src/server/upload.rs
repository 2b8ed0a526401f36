//! Multipart upload reception.
//!
//! The `pdf` field is streamed straight into the request workspace. The byte
//! ceiling is checked on every chunk, so an oversized upload is rejected
//! before its temp file reaches full size.

use std::path::PathBuf;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use http::StatusCode;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::CompressError;
use crate::workspace::RequestWorkspace;

/// Multipart field carrying the PDF.
pub const PDF_FIELD: &str = "pdf";

/// Multipart field carrying the compression mode.
pub const MODE_FIELD: &str = "mode";

/// The only accepted media type for the `pdf` field.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Base name used when the upload has no usable file name.
pub const DEFAULT_DOCUMENT_NAME: &str = "document";

/// An uploaded PDF stored in a request workspace.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Location of the stored bytes
    pub path: PathBuf,

    /// File name declared by the client
    pub file_name: Option<String>,

    /// Media type declared by the client
    pub content_type: String,

    /// Number of bytes received
    pub size: u64,
}

/// Everything read from a compression request body.
#[derive(Debug, Default)]
pub struct ReceivedUpload {
    /// The `pdf` field, if present
    pub document: Option<UploadedDocument>,

    /// The raw `mode` field, if present
    pub mode: Option<String>,
}

/// Read the multipart body, storing the `pdf` field in `workspace`.
///
/// Fields other than `pdf` and `mode` are skipped.
pub async fn receive_upload(
    mut multipart: Multipart,
    workspace: &RequestWorkspace,
    max_bytes: u64,
) -> Result<ReceivedUpload, CompressError> {
    let mut upload = ReceivedUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let name = field.name().map(str::to_string);

        match name.as_deref() {
            Some(PDF_FIELD) => {
                if upload.document.is_some() {
                    return Err(CompressError::DuplicateFile);
                }
                upload.document = Some(store_document(field, workspace, max_bytes).await?);
            }
            Some(MODE_FIELD) => {
                let mode = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, max_bytes))?;
                upload.mode = Some(mode);
            }
            other => debug!(field = ?other, "Ignoring multipart field"),
        }
    }

    Ok(upload)
}

async fn store_document(
    mut field: Field<'_>,
    workspace: &RequestWorkspace,
    max_bytes: u64,
) -> Result<UploadedDocument, CompressError> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    if content_type != PDF_MEDIA_TYPE {
        return Err(CompressError::InvalidFileType { content_type });
    }

    let file_name = field.file_name().map(str::to_string);
    let path = workspace.upload_path();
    let mut file = File::create(&path).await?;
    let mut size: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        size += chunk.len() as u64;
        if size > max_bytes {
            return Err(CompressError::UploadTooLarge { limit: max_bytes });
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    debug!(
        file_name = ?file_name,
        size,
        path = %path.display(),
        "Stored upload"
    );

    Ok(UploadedDocument {
        path,
        file_name,
        content_type,
        size,
    })
}

fn multipart_error(err: MultipartError, max_bytes: u64) -> CompressError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        CompressError::UploadTooLarge { limit: max_bytes }
    } else {
        CompressError::MalformedUpload(err.body_text())
    }
}

/// Download name for a compressed document: `<name>_compressed_by_<brand>.pdf`.
///
/// Directory components and one trailing `.pdf` (any case) are removed from
/// the declared name. Characters that cannot appear inside a quoted header
/// value are replaced with `_`.
pub fn output_file_name(original: Option<&str>, brand: &str) -> String {
    let base = original
        .map(|name| name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(name))
        .unwrap_or_default();

    let stem: String = strip_pdf_suffix(base)
        .chars()
        .map(|c| {
            if c == '"' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let stem = if stem.is_empty() {
        DEFAULT_DOCUMENT_NAME
    } else {
        stem.as_str()
    };

    format!("{}_compressed_by_{}.pdf", stem, brand)
}

fn strip_pdf_suffix(name: &str) -> &str {
    const SUFFIX: &str = ".pdf";
    let Some(split) = name.len().checked_sub(SUFFIX.len()) else {
        return name;
    };
    match (name.get(..split), name.get(split..)) {
        (Some(stem), Some(suffix)) if suffix.eq_ignore_ascii_case(SUFFIX) => stem,
        _ => name,
    }
}
