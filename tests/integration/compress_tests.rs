//! Integration tests for `POST /compress`.
//!
//! Tests verify:
//! - Mode to preset resolution, including the `max-1mb` fallback
//! - Response headers and download names
//! - Upload validation (missing file, media type, size ceiling)
//! - Tool failures and their JSON bodies
//! - Removal of request workspaces on every path

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use pdf_shrink::ghostscript::{Preset, TARGET_MISSED_NOTE};
use pdf_shrink::{create_router, RouterConfig};

use super::test_utils::{
    body_bytes, body_json, compress_request, header, leftover_entries, sample_pdf, temp_root,
    MockCompressor, MultipartBody,
};

const ONE_MIB: usize = 1024 * 1024;

// =============================================================================
// Successful Compression
// =============================================================================

#[tokio::test]
async fn test_compress_printer_success() {
    let root = temp_root();
    let compressor = MockCompressor::new().with_size(Preset::Printer, 3 * ONE_MIB);
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new().with_temp_dir(root.path()));

    let upload = sample_pdf(5 * ONE_MIB);
    let body = MultipartBody::new()
        .pdf("report.pdf", &upload)
        .text("mode", "quality-printer")
        .build();

    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), Some("application/pdf"));
    assert_eq!(
        header(&response, "content-disposition"),
        Some("attachment; filename=\"report_compressed_by_myworkspace.pdf\"")
    );
    assert_eq!(
        header(&response, "x-original-size"),
        Some((5 * ONE_MIB).to_string().as_str())
    );
    assert_eq!(
        header(&response, "x-compressed-size"),
        Some((3 * ONE_MIB).to_string().as_str())
    );
    assert!(header(&response, "x-note").is_none());

    let body = body_bytes(response).await;
    assert_eq!(body.len(), 3 * ONE_MIB);
    assert!(body.starts_with(b"%PDF"));

    assert_eq!(log.presets(), vec![Preset::Printer]);
    assert_eq!(log.version_calls(), 1);
    assert!(leftover_entries(root.path()).is_empty());
}

#[tokio::test]
async fn test_quality_modes_map_to_presets() {
    let cases = [
        ("quality-screen", Preset::Screen),
        ("quality-ebook", Preset::Ebook),
        ("quality-printer", Preset::Printer),
    ];

    for (mode, expected) in cases {
        let root = temp_root();
        let compressor = MockCompressor::new();
        let log = compressor.log();
        let router = create_router(compressor, RouterConfig::new().with_temp_dir(root.path()));

        let body = MultipartBody::new()
            .pdf("a.pdf", &sample_pdf(2048))
            .text("mode", mode)
            .build();
        let response = router.oneshot(compress_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK, "mode {}", mode);
        assert_eq!(log.presets(), vec![expected], "mode {}", mode);
        assert!(leftover_entries(root.path()).is_empty());
    }
}

#[tokio::test]
async fn test_missing_or_unknown_mode_uses_ebook() {
    let bodies = [
        MultipartBody::new().pdf("a.pdf", &sample_pdf(2048)).build(),
        MultipartBody::new()
            .pdf("a.pdf", &sample_pdf(2048))
            .text("mode", "turbo")
            .build(),
        MultipartBody::new()
            .pdf("a.pdf", &sample_pdf(2048))
            .text("mode", "")
            .build(),
        // Mode names are case-sensitive
        MultipartBody::new()
            .pdf("a.pdf", &sample_pdf(2048))
            .text("mode", "QUALITY-SCREEN")
            .build(),
    ];

    for body in bodies {
        let compressor = MockCompressor::new();
        let log = compressor.log();
        let router = create_router(compressor, RouterConfig::new());

        let response = router.oneshot(compress_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(log.presets(), vec![Preset::Ebook]);
    }
}

#[tokio::test]
async fn test_mode_field_before_file() {
    let compressor = MockCompressor::new();
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new());

    let body = MultipartBody::new()
        .text("mode", "quality-screen")
        .pdf("a.pdf", &sample_pdf(2048))
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(log.presets(), vec![Preset::Screen]);
}

#[tokio::test]
async fn test_upload_bytes_reach_compressor_intact() {
    let compressor = MockCompressor::new();
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new());

    let mut upload = sample_pdf(70_000);
    for (i, byte) in upload.iter_mut().enumerate().skip(16) {
        *byte = (i % 251) as u8;
    }

    let body = MultipartBody::new().pdf("a.pdf", &upload).build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "x-original-size"),
        Some(upload.len().to_string().as_str())
    );
    assert_eq!(log.inputs(), vec![upload]);
}

#[tokio::test]
async fn test_unrelated_fields_are_ignored() {
    let compressor = MockCompressor::new();
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new());

    let body = MultipartBody::new()
        .text("comment", "please be quick")
        .pdf("a.pdf", &sample_pdf(2048))
        .text("mode", "quality-printer")
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(log.presets(), vec![Preset::Printer]);
}

// =============================================================================
// max-1mb Mode
// =============================================================================

#[tokio::test]
async fn test_max_1mb_within_target_after_ebook() {
    let compressor = MockCompressor::new().with_size(Preset::Ebook, 800_000);
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new());

    let body = MultipartBody::new()
        .pdf("big.pdf", &sample_pdf(3 * ONE_MIB))
        .text("mode", "max-1mb")
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-compressed-size"), Some("800000"));
    assert!(header(&response, "x-note").is_none());
    assert_eq!(log.presets(), vec![Preset::Ebook]);
}

#[tokio::test]
async fn test_max_1mb_exactly_at_target_needs_no_fallback() {
    let compressor = MockCompressor::new().with_size(Preset::Ebook, ONE_MIB);
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new());

    let body = MultipartBody::new()
        .pdf("big.pdf", &sample_pdf(4096))
        .text("mode", "max-1mb")
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header(&response, "x-note").is_none());
    assert_eq!(log.presets(), vec![Preset::Ebook]);
}

#[tokio::test]
async fn test_max_1mb_falls_back_to_screen() {
    let root = temp_root();
    let compressor = MockCompressor::new()
        .with_size(Preset::Ebook, 1_400_000)
        .with_size(Preset::Screen, 900_000);
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new().with_temp_dir(root.path()));

    let body = MultipartBody::new()
        .pdf("big.pdf", &sample_pdf(3 * ONE_MIB))
        .text("mode", "max-1mb")
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-compressed-size"), Some("900000"));
    assert!(header(&response, "x-note").is_none());
    assert_eq!(log.presets(), vec![Preset::Ebook, Preset::Screen]);
    assert_eq!(body_bytes(response).await.len(), 900_000);
    assert!(leftover_entries(root.path()).is_empty());
}

#[tokio::test]
async fn test_max_1mb_target_missed_adds_note() {
    let compressor = MockCompressor::new()
        .with_size(Preset::Ebook, 1_400_000)
        .with_size(Preset::Screen, 1_100_000);
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new());

    let body = MultipartBody::new()
        .pdf("big.pdf", &sample_pdf(3 * ONE_MIB))
        .text("mode", "max-1mb")
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-compressed-size"), Some("1100000"));
    assert_eq!(header(&response, "x-note"), Some(TARGET_MISSED_NOTE));
    assert_eq!(log.presets(), vec![Preset::Ebook, Preset::Screen]);
}

#[tokio::test]
async fn test_max_1mb_keeps_ebook_when_screen_is_larger() {
    let compressor = MockCompressor::new()
        .with_size(Preset::Ebook, 1_200_000)
        .with_size(Preset::Screen, 1_300_000);
    let router = create_router(compressor, RouterConfig::new());

    let body = MultipartBody::new()
        .pdf("big.pdf", &sample_pdf(3 * ONE_MIB))
        .text("mode", "max-1mb")
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-compressed-size"), Some("1200000"));
    assert_eq!(header(&response, "x-note"), Some(TARGET_MISSED_NOTE));
}

// =============================================================================
// Client Disconnect
// =============================================================================

#[tokio::test]
async fn test_abandoned_request_still_compresses_and_cleans_up() {
    let root = temp_root();
    let compressor = MockCompressor::new().with_delay(Duration::from_millis(300));
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new().with_temp_dir(root.path()));

    let body = MultipartBody::new().pdf("slow.pdf", &sample_pdf(2048)).build();

    // The client gives up long before compression finishes
    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        router.oneshot(compress_request(body)),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(leftover_entries(root.path()).len(), 1);
    assert_eq!(log.completed(), 0);

    let mut waited = Duration::ZERO;
    while !leftover_entries(root.path()).is_empty() && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(25)).await;
        waited += Duration::from_millis(25);
    }

    assert_eq!(log.completed(), 1);
    assert_eq!(log.presets(), vec![Preset::Ebook]);
    assert!(leftover_entries(root.path()).is_empty());
}

// =============================================================================
// Download Names
// =============================================================================

#[tokio::test]
async fn test_download_name_uses_brand_and_strips_suffix() {
    let router = create_router(
        MockCompressor::new(),
        RouterConfig::new().with_brand("acme"),
    );

    let body = MultipartBody::new()
        .pdf("Quarterly Report.PDF", &sample_pdf(2048))
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "content-disposition"),
        Some("attachment; filename=\"Quarterly Report_compressed_by_acme.pdf\"")
    );
}

#[tokio::test]
async fn test_download_name_defaults_without_file_name() {
    let router = create_router(
        MockCompressor::new(),
        RouterConfig::new().with_brand("acme"),
    );

    let body = MultipartBody::new()
        .file("pdf", None, Some("application/pdf"), &sample_pdf(2048))
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "content-disposition"),
        Some("attachment; filename=\"document_compressed_by_acme.pdf\"")
    );
}

// =============================================================================
// Upload Validation
// =============================================================================

#[tokio::test]
async fn test_missing_file_returns_400() {
    let root = temp_root();
    let compressor = MockCompressor::new();
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new().with_temp_dir(root.path()));

    let body = MultipartBody::new().text("mode", "max-1mb").build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("PDF file must be uploaded"));
    assert!(json.get("detail").is_none());

    assert!(log.presets().is_empty());
    assert_eq!(log.version_calls(), 0);
    assert!(leftover_entries(root.path()).is_empty());
}

#[tokio::test]
async fn test_non_multipart_request_returns_400() {
    let compressor = MockCompressor::new();
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new());

    let request = Request::builder()
        .method("POST")
        .uri("/compress")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"pdf":"nope"}"#))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].is_string());
    assert!(log.presets().is_empty());
}

#[tokio::test]
async fn test_wrong_media_type_returns_400() {
    let root = temp_root();
    let compressor = MockCompressor::new();
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new().with_temp_dir(root.path()));

    let body = MultipartBody::new()
        .file("pdf", Some("photo.pdf"), Some("image/png"), b"\x89PNG\r\n")
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("must be a PDF"));
    assert!(json["message"].as_str().unwrap().contains("image/png"));

    assert!(log.presets().is_empty());
    assert_eq!(log.version_calls(), 0);
    assert!(leftover_entries(root.path()).is_empty());
}

#[tokio::test]
async fn test_missing_media_type_returns_400() {
    let compressor = MockCompressor::new();
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new());

    let body = MultipartBody::new()
        .file("pdf", Some("a.pdf"), None, &sample_pdf(2048))
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(log.presets().is_empty());
}

#[tokio::test]
async fn test_duplicate_file_returns_400() {
    let root = temp_root();
    let compressor = MockCompressor::new();
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new().with_temp_dir(root.path()));

    let body = MultipartBody::new()
        .pdf("a.pdf", &sample_pdf(2048))
        .pdf("b.pdf", &sample_pdf(2048))
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("Only one PDF"));
    assert!(log.presets().is_empty());
    assert!(leftover_entries(root.path()).is_empty());
}

#[tokio::test]
async fn test_upload_too_large_returns_413() {
    let root = temp_root();
    let compressor = MockCompressor::new();
    let log = compressor.log();
    let router = create_router(
        compressor,
        RouterConfig::new()
            .with_max_upload_bytes(1024)
            .with_temp_dir(root.path()),
    );

    let body = MultipartBody::new()
        .pdf("big.pdf", &sample_pdf(4096))
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("1024"));

    assert!(log.presets().is_empty());
    assert!(leftover_entries(root.path()).is_empty());
}

#[tokio::test]
async fn test_upload_at_limit_is_accepted() {
    let compressor = MockCompressor::new();
    let router = create_router(compressor, RouterConfig::new().with_max_upload_bytes(1024));

    let body = MultipartBody::new()
        .pdf("edge.pdf", &sample_pdf(1024))
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-original-size"), Some("1024"));
}

// =============================================================================
// Tool Failures
// =============================================================================

#[tokio::test]
async fn test_tool_unavailable_returns_500_with_detail() {
    let root = temp_root();
    let compressor = MockCompressor::new().unavailable();
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new().with_temp_dir(root.path()));

    let body = MultipartBody::new().pdf("a.pdf", &sample_pdf(2048)).build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Ghostscript is not available on the server");
    assert!(json["detail"].as_str().unwrap().contains("mock-gs"));

    assert!(log.presets().is_empty());
    assert!(leftover_entries(root.path()).is_empty());
}

#[tokio::test]
async fn test_compression_failure_returns_500_with_detail() {
    let root = temp_root();
    let compressor = MockCompressor::new().failing_on(Preset::Ebook);
    let router = create_router(compressor, RouterConfig::new().with_temp_dir(root.path()));

    let body = MultipartBody::new().pdf("a.pdf", &sample_pdf(2048)).build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["message"], "PDF compression failed");
    assert!(json["detail"]
        .as_str()
        .unwrap()
        .contains("Unrecoverable error"));

    assert!(leftover_entries(root.path()).is_empty());
}

#[tokio::test]
async fn test_fallback_failure_fails_the_request() {
    let compressor = MockCompressor::new()
        .with_size(Preset::Ebook, 2 * ONE_MIB)
        .failing_on(Preset::Screen);
    let log = compressor.log();
    let router = create_router(compressor, RouterConfig::new());

    let body = MultipartBody::new()
        .pdf("a.pdf", &sample_pdf(2048))
        .text("mode", "max-1mb")
        .build();
    let response = router.oneshot(compress_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(log.presets(), vec![Preset::Ebook, Preset::Screen]);
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn test_cors_preflight_any_origin() {
    let router = create_router(MockCompressor::new(), RouterConfig::new());

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/compress")
        .header("origin", "https://app.example.com")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "access-control-allow-origin"),
        Some("*")
    );
}

#[tokio::test]
async fn test_cors_restricted_origins() {
    let config = RouterConfig::new()
        .with_cors_origins(vec!["https://app.example.com".to_string()]);
    let router = create_router(MockCompressor::new(), config);

    let allowed = Request::builder()
        .method("OPTIONS")
        .uri("/compress")
        .header("origin", "https://app.example.com")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        header(&response, "access-control-allow-origin"),
        Some("https://app.example.com")
    );

    let denied = Request::builder()
        .method("OPTIONS")
        .uri("/compress")
        .header("origin", "https://evil.example.com")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(denied).await.unwrap();
    assert!(header(&response, "access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_cors_exposes_size_headers() {
    let router = create_router(MockCompressor::new(), RouterConfig::new());

    let body = MultipartBody::new().pdf("a.pdf", &sample_pdf(2048)).build();
    let mut request = compress_request(body);
    request
        .headers_mut()
        .insert("origin", "https://app.example.com".parse().unwrap());
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let exposed = header(&response, "access-control-expose-headers")
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("x-original-size"));
    assert!(exposed.contains("x-compressed-size"));
    assert!(exposed.contains("x-note"));
    assert!(exposed.contains("content-disposition"));
}
