//! Palette generation endpoint
//!
//! POST /api/generatePalettes
//!
//! Validation failures are 400. A missing API key is a 500 unless the
//! service is configured to serve fallback palettes without credentials, in
//! which case the response carries a `warning`. Everything past validation
//! succeeds: external failures degrade individual values, not the response.
//! Only an aborted generation task is reported as a 500.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::models::{GenerationRequest, PalettesResponse};
use crate::services::{TextGenerator, UnavailableGenerator};
use crate::AppState;

/// Warning attached to responses built without credentials
pub const NO_CREDENTIALS_WARNING: &str =
    "Text generation is not configured; palettes were built from fallback data.";

/// POST /api/generatePalettes
pub async fn generate_palettes(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> ApiResult<Json<PalettesResponse>> {
    let Json(request) = payload?;
    let prepared = state.orchestrator.prepare(&request)?;

    let (generator, warning): (Arc<dyn TextGenerator>, Option<String>) = match &state.generators {
        Some(generators) => (generators.for_mode(prepared.mode), None),
        None if state.allow_fallback_without_credentials => {
            tracing::warn!("No API key configured, serving fallback palettes");
            (
                Arc::new(UnavailableGenerator),
                Some(NO_CREDENTIALS_WARNING.to_string()),
            )
        }
        None => {
            return Err(ApiError::Configuration(
                "Gemini API key not configured".to_string(),
            ))
        }
    };

    // A panic while generating surfaces here as a JoinError.
    let orchestrator = Arc::clone(&state.orchestrator);
    let palettes = tokio::spawn(async move {
        orchestrator.generate(&prepared, generator.as_ref()).await
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Palette generation task failed: {}", e)))?;

    Ok(Json(PalettesResponse { palettes, warning }))
}

/// Build generation routes
pub fn generate_routes() -> Router<AppState> {
    Router::new().route("/api/generatePalettes", post(generate_palettes))
}
