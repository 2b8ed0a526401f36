use thiserror::Error;

/// Errors from invoking the external compression tool.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// The binary could not be started (missing, not executable, ...)
    #[error("failed to run {command}: {message}")]
    Spawn { command: String, message: String },

    /// The tool ran but exited unsuccessfully
    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The tool reported success but its output could not be read back
    #[error("failed to read output {path}: {message}")]
    ReadOutput { path: String, message: String },
}

/// Errors that terminate a compression request.
///
/// Each variant maps to exactly one HTTP status in the server layer.
#[derive(Debug, Error)]
pub enum CompressError {
    /// No `pdf` field in the upload (400)
    #[error("A PDF file must be uploaded in the `pdf` field")]
    MissingFile,

    /// More than one `pdf` field in the upload (400)
    #[error("Only one PDF file may be uploaded per request")]
    DuplicateFile,

    /// Declared media type is not `application/pdf` (400)
    #[error("The uploaded file must be a PDF (got {content_type})")]
    InvalidFileType { content_type: String },

    /// Upload exceeded the configured byte ceiling (413)
    #[error("The uploaded file exceeds the {limit} byte limit")]
    UploadTooLarge { limit: u64 },

    /// Multipart framing could not be parsed (400)
    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    /// The availability probe failed (500)
    #[error("Ghostscript is not available on the server")]
    ToolUnavailable(#[source] ToolError),

    /// A compression attempt failed (500)
    #[error("PDF compression failed")]
    Tool(#[source] ToolError),

    /// Request-scoped temporary storage failed (500)
    #[error("Temporary storage error: {0}")]
    Workspace(String),

    /// Unexpected server-side failure (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CompressError {
    /// Diagnostic text for the `detail` field of the error body, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            CompressError::ToolUnavailable(err) | CompressError::Tool(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CompressError {
    fn from(err: std::io::Error) -> Self {
        CompressError::Workspace(err.to_string())
    }
}
