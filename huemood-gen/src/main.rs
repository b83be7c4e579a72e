//! huemood-gen - Mood-driven color palette generation service
//!
//! Serves `POST /api/generatePalettes` and `GET /health`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use huemood_common::config::load_toml_config;
use huemood_gen::config::{resolve_gemini_api_key, resolve_redis_url};
use huemood_gen::services::{
    connect_store, GeminiClient, OrchestratorSettings, PaletteOrchestrator, ResponseCache,
};
use huemood_gen::{build_router, AppState};

/// Command-line arguments for huemood-gen
#[derive(Parser, Debug)]
#[command(name = "huemood-gen")]
#[command(about = "Mood-driven color palette generation service")]
#[command(version)]
struct Args {
    /// TOML configuration file (default: ~/.config/huemood/config.toml)
    #[arg(short, long, env = "HUEMOOD_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "HUEMOOD_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "HUEMOOD_BIND_ADDRESS")]
    bind: Option<String>,

    /// Gemini API key (overrides GEMINI_API_KEY and the TOML config)
    #[arg(long)]
    api_key: Option<String>,

    /// Redis URL (overrides REDIS_URL and the TOML config)
    #[arg(long)]
    redis_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "huemood_gen={0},huemood_common={0},tower_http=info",
                    config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Huemood palette generator (huemood-gen) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    config.cache.redis_url = resolve_redis_url(args.redis_url.as_deref(), &config);

    // Cache backend (Redis when reachable, in-process otherwise)
    let store = connect_store(&config.cache).await;
    let cache = ResponseCache::from_config(store, &config.cache);
    info!(
        backend = cache.backend_name(),
        ttl_seconds = cache.ttl().as_secs(),
        "Response cache ready"
    );

    // Generation clients
    let generators = match resolve_gemini_api_key(args.api_key.as_deref(), &config) {
        Some(key) => {
            let call_timeout = Duration::from_millis(config.generation.call_timeout_ms);
            let client = GeminiClient::new(&key, call_timeout)
                .context("Failed to initialize Gemini client")?;
            info!(
                prompt_model = %config.generation.prompt_model,
                image_model = %config.generation.image_model,
                "Gemini client initialized"
            );
            Some(client.generator_set(
                &config.generation.prompt_model,
                &config.generation.image_model,
            ))
        }
        None => {
            if config.generation.allow_fallback_without_credentials {
                warn!("Running without credentials: responses will use fallback palettes");
            } else {
                warn!("Running without credentials: generation requests will fail with 500");
            }
            None
        }
    };

    let orchestrator = Arc::new(PaletteOrchestrator::new(
        cache.clone(),
        OrchestratorSettings::from_config(&config.generation),
    ));

    let state = AppState::new(orchestrator, generators)
        .with_fallback_without_credentials(config.generation.allow_fallback_without_credentials);
    let app = build_router(state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("huemood-gen listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    cache.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
