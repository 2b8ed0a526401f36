//! HTTP server layer for PDF Shrink.
//!
//! This module provides the HTTP API for compressing uploaded PDFs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │            POST /compress            GET /healthz               │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │   upload    │  │        routes           │  │
//! │  │ (requests)  │  │ (multipart) │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;
pub mod upload;

pub use handlers::{
    compress_handler, health_handler, AppState, ErrorResponse, HealthResponse,
    COMPRESSED_SIZE_HEADER, NOTE_HEADER, ORIGINAL_SIZE_HEADER,
};
pub use routes::{create_router, RouterConfig, MULTIPART_OVERHEAD_BYTES};
pub use upload::{
    output_file_name, receive_upload, ReceivedUpload, UploadedDocument, MODE_FIELD, PDF_FIELD,
    PDF_MEDIA_TYPE,
};
