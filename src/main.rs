//! Image Splitter - split images into grid tiles and extract text with OCR.
//!
//! This binary starts the HTTP server and configures all components.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_splitter::{
    config::Config,
    ocr::{LocalEngine, OcrBackend, OcrEngine, OcrService, RemoteApi},
    scratch::ScratchDir,
    server::{create_router, AppState, RouterConfig},
    tile::SplitService,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    run_serve(config).await
}

async fn run_serve(config: Config) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let upload_policy = config.upload_policy();

    info!("Image Splitter v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Allowed extensions: {}", upload_policy.allowed_list());
    info!(
        "  Upload limit: {}MB",
        config.max_upload_bytes / (1024 * 1024)
    );
    info!("  Scratch dir: {}", config.scratch_dir.display());
    info!(
        "  Split: remainder={}, max {} tiles",
        config.remainder, config.max_tiles
    );
    info!(
        "  OCR: backend={}, language={}, timeout={}s",
        config.ocr_backend, config.ocr_language, config.ocr_timeout_secs
    );

    // Scratch storage must exist before the first OCR request
    let scratch = ScratchDir::new(&config.scratch_dir);
    if let Err(e) = scratch.ensure() {
        error!(
            "Failed to create scratch directory {}: {}",
            config.scratch_dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let engine = match build_ocr_engine(&config, scratch) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to initialize OCR backend: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let ocr = OcrService::new(engine).with_timeout(config.ocr_timeout());
    let split_service = SplitService::new()
        .with_policy(config.remainder)
        .with_max_tiles(config.max_tiles);

    let state = AppState::new(split_service, ocr).with_upload_policy(upload_policy);
    let router = create_router(state, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    open http://{}/", addr);
    info!(
        "    curl -F file=@image.png -F rows=2 -F cols=2 -o split_images.zip http://{}/split",
        addr
    );
    info!("    curl http://{}/health", addr);
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

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "image_splitter=debug,tower_http=debug"
    } else {
        "image_splitter=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the configured OCR engine. The API key is never logged.
fn build_ocr_engine(
    config: &Config,
    scratch: ScratchDir,
) -> Result<Arc<dyn OcrEngine>, image_splitter::OcrError> {
    match config.ocr_backend {
        OcrBackend::Local => {
            info!("  Tesseract: {}", config.tesseract_bin.display());
            let engine = LocalEngine::new(scratch)
                .with_binary(&config.tesseract_bin)
                .with_language(&config.ocr_language);
            Ok(Arc::new(engine))
        }
        OcrBackend::Remote => {
            info!("  OCR endpoint: {}", config.ocr_api_url);
            let engine = RemoteApi::with_timeout(
                &config.ocr_api_url,
                config.ocr_api_key_or_empty(),
                config.ocr_timeout(),
            )?
            .with_language(&config.ocr_language);
            Ok(Arc::new(engine))
        }
    }
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new();

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    } else {
        warn!("  CORS: any origin allowed (set --cors-origins to restrict)");
    }

    router_config.with_tracing(!config.no_tracing)
}
