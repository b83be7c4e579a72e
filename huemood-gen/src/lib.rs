//! huemood-gen library interface
//!
//! Mood-driven color palette generation. Exposes public APIs for the binary
//! and for integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{GeneratorSet, PaletteOrchestrator};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Generation engine (owns the cache handle)
    pub orchestrator: Arc<PaletteOrchestrator>,
    /// Model clients per mode; `None` when no API key is configured
    pub generators: Option<GeneratorSet>,
    /// Serve fallback-only palettes instead of 500 when `generators` is `None`
    pub allow_fallback_without_credentials: bool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(orchestrator: Arc<PaletteOrchestrator>, generators: Option<GeneratorSet>) -> Self {
        Self {
            orchestrator,
            generators,
            allow_fallback_without_credentials: false,
            startup_time: Utc::now(),
        }
    }

    pub fn with_fallback_without_credentials(mut self, allow: bool) -> Self {
        self.allow_fallback_without_credentials = allow;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::generate_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
