//! External text generation boundary
//!
//! The engine treats the language model as a black box: a prompt goes in,
//! prose comes out, fallibly. Implementations classify every failure into a
//! closed set of cases so the retry controller never inspects raw errors.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::GenerationMode;

/// Classified failure of one external generation call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Service asked us to slow down (HTTP 429); worth retrying after backoff
    #[error("Rate limited by generation service")]
    RateLimited,

    /// Network failure, timeout, or server-side error; not retried
    #[error("Transient generation failure: {0}")]
    Transient(String),

    /// Request rejected or response unusable; not retried
    #[error("Generation failed: {0}")]
    Fatal(String),
}

/// A text generation capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier for logging
    fn name(&self) -> &str;

    /// Generate text for a prompt
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Generator that always fails
///
/// Used when no credentials are configured and when a request deadline is
/// breached: every step takes its fallback path immediately.
#[derive(Debug, Clone, Default)]
pub struct UnavailableGenerator;

#[async_trait]
impl TextGenerator for UnavailableGenerator {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Fatal(
            "text generation is unavailable".to_string(),
        ))
    }
}

/// Generators per request mode
#[derive(Clone)]
pub struct GeneratorSet {
    pub prompt: Arc<dyn TextGenerator>,
    pub image: Arc<dyn TextGenerator>,
}

impl GeneratorSet {
    pub fn new(prompt: Arc<dyn TextGenerator>, image: Arc<dyn TextGenerator>) -> Self {
        Self { prompt, image }
    }

    /// Same generator for both modes
    pub fn uniform(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            prompt: generator.clone(),
            image: generator,
        }
    }

    pub fn for_mode(&self, mode: GenerationMode) -> Arc<dyn TextGenerator> {
        match mode {
            GenerationMode::Prompt => self.prompt.clone(),
            GenerationMode::Image => self.image.clone(),
        }
    }
}
