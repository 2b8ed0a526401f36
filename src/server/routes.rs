//! Router configuration for PDF Shrink.
//!
//! This module defines the HTTP routes and applies middleware for CORS,
//! body limits, and request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /healthz    - Ghostscript availability (GET)
//! /compress   - PDF compression (POST, multipart)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pdf_shrink::ghostscript::GhostscriptCompressor;
//! use pdf_shrink::server::routes::{create_router, RouterConfig};
//!
//! let compressor = GhostscriptCompressor::from_override(std::env::var("GS_BIN").ok().as_deref());
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(compressor, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:4000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use http::{HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    compress_handler, health_handler, AppState, COMPRESSED_SIZE_HEADER, NOTE_HEADER,
    ORIGINAL_SIZE_HEADER,
};
use crate::config::{DEFAULT_BRAND, DEFAULT_MAX_UPLOAD_BYTES};
use crate::ghostscript::Compressor;

/// Allowance on top of the upload ceiling for multipart framing and the
/// `mode` field.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Upload size ceiling in bytes
    pub max_upload_bytes: u64,

    /// Brand used in output file names
    pub brand: String,

    /// Parent directory for request workspaces (None = system temp dir)
    pub temp_dir: Option<PathBuf>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Uploads are limited to 25 MiB
    /// - Workspaces go to the system temp dir
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            brand: DEFAULT_BRAND.to_string(),
            temp_dir: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Set the upload size ceiling in bytes.
    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Set the brand used in output file names.
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    /// Create request workspaces under `dir`.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Body limit for the compression route.
    fn body_limit(&self) -> usize {
        let limit = self.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
        usize::try_from(limit).unwrap_or(usize::MAX)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// This function builds the complete Axum router with:
/// - The health and compression routes
/// - A body limit on the compression route
/// - CORS configuration
/// - Request tracing (optional)
///
/// # Arguments
///
/// * `compressor` - The compressor, configured once at startup
/// * `config` - Router configuration
pub fn create_router<C: Compressor>(compressor: C, config: RouterConfig) -> Router {
    let app_state = AppState::new(compressor)
        .with_max_upload_bytes(config.max_upload_bytes)
        .with_brand(&config.brand)
        .with_temp_dir(config.temp_dir.clone());

    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/healthz", get(health_handler::<C>))
        .route(
            "/compress",
            post(compress_handler::<C>).layer(DefaultBodyLimit::max(config.body_limit())),
        )
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([
            CONTENT_DISPOSITION,
            HeaderName::from_static(ORIGINAL_SIZE_HEADER),
            HeaderName::from_static(COMPRESSED_SIZE_HEADER),
            HeaderName::from_static(NOTE_HEADER),
        ])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => {
            // No origins allowed - this effectively disables CORS
            cors
        }
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
