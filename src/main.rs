//! PDF Shrink - An HTTP service that compresses PDFs with Ghostscript.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_shrink::{
    config::{CheckConfig, Cli, Command, CompressConfig, ServeConfig},
    create_router, probe, CompressionPlan, GhostscriptCompressor, RequestWorkspace, RouterConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Check(config) => run_check(config).await,
        Command::Compress(config) => run_compress(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    // Print startup banner and info
    print_banner();

    // Resolved once; every request reuses this compressor
    let compressor = GhostscriptCompressor::new(config.gs_command());

    info!("Configuration:");
    info!("  Ghostscript command: {}", config.gs_command());
    info!(
        "  Upload limit: {}MB",
        config.max_upload_bytes / (1024 * 1024)
    );
    info!("  Output brand: {}", config.brand);
    match config.temp_dir {
        Some(ref dir) => info!("  Temp dir: {}", dir.display()),
        None => info!("  Temp dir: {}", std::env::temp_dir().display()),
    }
    match config.cors_origins() {
        Some(ref origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => info!("  CORS origins: any"),
    }

    // Ghostscript is probed per request too, so a missing binary is not fatal here
    info!("");
    let status = probe(&compressor).await;
    if status.available {
        info!(
            "  Ghostscript: {}",
            status.detail.as_deref().unwrap_or("available")
        );
    } else {
        warn!(
            "  Ghostscript: NOT AVAILABLE - {}",
            status.detail.as_deref().unwrap_or("unknown error")
        );
        warn!("        Compression requests will fail until it is installed or GS_BIN is set");
    }

    let router = create_router(compressor, build_router_config(&config));

    // Bind and serve
    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  PDF backend listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/healthz", addr);
    info!(
        "    curl -F pdf=@file.pdf -F mode=max-1mb http://{}/compress -OJ",
        addr
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Print the startup banner.
fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    info!("");
    info!("┌─┐┌┬┐┌─┐  ┌─┐┬ ┬┬─┐┬┌┐┌┬┌─");
    info!("├─┘ ││├┤   └─┐├─┤├┬┘││││├┴┐");
    info!("┴  ─┴┘└    └─┘┴ ┴┴└─┴┘└┘┴ ┴");
    info!("");
    info!("  v{}", version);
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "pdf_shrink=debug,tower_http=debug"
    } else {
        "pdf_shrink=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_max_upload_bytes(config.max_upload_bytes)
        .with_brand(config.brand.clone());

    // Apply CORS origins
    if let Some(origins) = config.cors_origins() {
        router_config = router_config.with_cors_origins(origins);
    }

    if let Some(ref dir) = config.temp_dir {
        router_config = router_config.with_temp_dir(dir.clone());
    }

    // Apply tracing setting
    router_config = router_config.with_tracing(!config.no_tracing);

    router_config
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    // Initialize minimal logging for check command
    if config.verbose {
        init_logging(true);
    }

    println!("PDF Shrink Configuration Check");
    println!("══════════════════════════════");
    println!();

    let command = config.gs_command();
    println!("✓ Ghostscript command: {}", command);

    print!("Running '{} -v'... ", command);
    let status = probe(&GhostscriptCompressor::new(command.clone())).await;

    if !status.available {
        println!("✗ failed");
        println!();
        println!(
            "Error: {}",
            status.detail.as_deref().unwrap_or("unknown error")
        );
        println!();
        println!("Please check:");
        println!("  - Ghostscript is installed");
        println!("  - '{}' is on PATH, or GS_BIN points to it", command);
        return ExitCode::FAILURE;
    }

    println!("✓ success");
    if let Some(ref version) = status.detail {
        println!("  Version: {}", version);
    }

    println!();
    println!("══════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}

// =============================================================================
// Compress Command
// =============================================================================

async fn run_compress(config: CompressConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let mode = match config.compression_mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let original_size = match tokio::fs::metadata(&config.input).await {
        Ok(meta) => meta.len(),
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", config.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let workspace = match RequestWorkspace::create(None) {
        Ok(workspace) => workspace,
        Err(e) => {
            eprintln!("Error: cannot create temporary directory: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let compressor = GhostscriptCompressor::new(config.gs_command());
    let outcome = match CompressionPlan::for_mode(mode)
        .execute(&compressor, &config.input, &workspace)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let output = config.output_path();
    if let Err(e) = tokio::fs::write(&output, &outcome.data).await {
        eprintln!("Error: cannot write {}: {}", output.display(), e);
        return ExitCode::FAILURE;
    }

    println!("Mode:       {}", mode);
    println!(
        "Preset:     {} ({} attempt(s))",
        outcome.preset, outcome.attempts
    );
    println!("Original:   {} bytes", original_size);
    println!("Compressed: {} bytes", outcome.compressed_size());
    println!("Output:     {}", output.display());
    if let Some(note) = outcome.note {
        println!();
        println!("Note: {}", note);
    }

    ExitCode::SUCCESS
}
