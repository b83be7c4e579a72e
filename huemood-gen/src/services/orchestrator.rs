//! Palette generation orchestrator
//!
//! Turns one request into the full set of palettes:
//!
//! 1. Resolve moods (user list → cache → model → default list)
//! 2. For every mood concurrently: generate palette colors (retry + parse,
//!    static or random fallback)
//! 3. For every color: generate psychology under the concurrency limiter
//!    (cache → retry + parse → generic fallback)
//! 4. Assess accessibility and assemble the [`Palette`]
//!
//! External failures are recovered locally at each step; a request that
//! passed validation always yields a complete set of palettes. The whole run
//! is bounded by a request deadline, after which palettes are built from
//! local fallback data without touching the cache or the model.

use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use super::accessibility::assess_palette;
use super::cache::ResponseCache;
use super::fallback;
use super::id_generator::{IdGenerator, RandomIdGenerator};
use super::limiter::ConcurrencyLimiter;
use super::parsers::{sanitize_input, PlainTextParser, ResponseParser};
use super::retry::{RetryOutcome, RetryPolicy};
use super::text_generator::TextGenerator;
use crate::models::{
    ColorEntry, ColorPsychology, ColorRole, GenerationMode, GenerationRequest, HexColor, Palette,
};
use huemood_common::config::GenerationConfig;

/// Cache namespace for resolved mood lists
pub const EMOTION_CACHE: &str = "emotionCache";

/// Cache namespace for psychology records
pub const PSYCHOLOGY_CACHE: &str = "psychologyCache";

/// Mood prompt used when the request has none
pub const DEFAULT_MOOD_PROMPT: &str = "Provide a list of 6 emotions";

/// One color per role
pub const MAX_PALETTE_SIZE: usize = ColorRole::ALL.len();

/// Request rejected before any generation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Prompt is required")]
    MissingPrompt,

    #[error("Image is required")]
    MissingImage,

    #[error("Palette size must be between 1 and 5 (got {0})")]
    InvalidPaletteSize(usize),
}

/// Engine tuning
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub retry: RetryPolicy,
    /// Concurrent psychology generations per request
    pub psychology_concurrency: usize,
    /// Palette size when the request carries none
    pub default_palette_size: usize,
    /// Deadline for a whole request
    pub request_timeout: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            psychology_concurrency: 2,
            default_palette_size: MAX_PALETTE_SIZE,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl OrchestratorSettings {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            retry: RetryPolicy::from_config(config),
            psychology_concurrency: config.psychology_concurrency.max(1),
            default_palette_size: config.default_palette_size.clamp(1, MAX_PALETTE_SIZE),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }
}

/// Validated and sanitized request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub mode: GenerationMode,
    /// Sanitized prompt, possibly empty in image mode
    pub prompt_text: String,
    /// Sanitized mood prompt; also the mood cache key
    pub mood_prompt_text: String,
    /// Sanitized, non-empty user moods (may be empty)
    pub user_moods: Vec<String>,
    pub palette_size: usize,
}

/// Top-level generation engine
///
/// Holds the process-wide cache handle; everything else is request-scoped.
pub struct PaletteOrchestrator {
    cache: ResponseCache,
    parser: Arc<dyn ResponseParser>,
    ids: Arc<dyn IdGenerator>,
    settings: OrchestratorSettings,
}

impl PaletteOrchestrator {
    pub fn new(cache: ResponseCache, settings: OrchestratorSettings) -> Self {
        Self {
            cache,
            parser: Arc::new(PlainTextParser),
            ids: Arc::new(RandomIdGenerator),
            settings,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn ResponseParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Validate required inputs for the mode, then sanitize
    ///
    /// Validation looks at the raw input; a prompt that sanitizes to nothing
    /// is accepted and treated as empty.
    pub fn prepare(&self, request: &GenerationRequest) -> Result<PreparedRequest, InputError> {
        let is_blank =
            |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());

        match request.mode {
            GenerationMode::Prompt if is_blank(&request.prompt_text) => {
                return Err(InputError::MissingPrompt)
            }
            GenerationMode::Image if is_blank(&request.image_data) => {
                return Err(InputError::MissingImage)
            }
            _ => {}
        }

        let palette_size = request
            .palette_size
            .unwrap_or(self.settings.default_palette_size);
        if !(1..=MAX_PALETTE_SIZE).contains(&palette_size) {
            return Err(InputError::InvalidPaletteSize(palette_size));
        }

        let prompt_text = sanitize_input(request.prompt_text.as_deref().unwrap_or_default());

        let mood_prompt_text =
            sanitize_input(request.mood_prompt_text.as_deref().unwrap_or_default());
        let mood_prompt_text = if mood_prompt_text.is_empty() {
            DEFAULT_MOOD_PROMPT.to_string()
        } else {
            mood_prompt_text
        };

        let user_moods = request
            .user_moods
            .iter()
            .flatten()
            .map(|m| sanitize_input(m))
            .filter(|m| !m.is_empty())
            .collect();

        Ok(PreparedRequest {
            mode: request.mode,
            prompt_text,
            mood_prompt_text,
            user_moods,
            palette_size,
        })
    }

    /// Generate all palettes for a prepared request
    ///
    /// Never fails. If the request deadline passes, in-flight work is dropped
    /// and palettes are rebuilt from fallback data alone.
    pub async fn generate(
        &self,
        request: &PreparedRequest,
        generator: &dyn TextGenerator,
    ) -> Vec<Palette> {
        let span = tracing::info_span!(
            "generate_palettes",
            request_id = %Uuid::new_v4(),
            mode = ?request.mode,
            model = generator.name(),
        );

        async {
            let started = Instant::now();

            let palettes = match tokio::time::timeout(
                self.settings.request_timeout,
                self.run(request, generator),
            )
            .await
            {
                Ok(palettes) => palettes,
                Err(_) => {
                    tracing::warn!(
                        timeout_ms = self.settings.request_timeout.as_millis() as u64,
                        "Request deadline exceeded, serving fallback palettes"
                    );
                    self.fallback_palettes(request)
                }
            };

            tracing::info!(
                palettes = palettes.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Palette generation complete"
            );
            palettes
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &PreparedRequest, generator: &dyn TextGenerator) -> Vec<Palette> {
        let moods = self.resolve_moods(request, generator).await;
        let limiter = ConcurrencyLimiter::new(self.settings.psychology_concurrency);

        join_all(
            moods
                .iter()
                .map(|mood| self.build_palette(mood, request, generator, &limiter)),
        )
        .await
    }

    /// Palettes built from local data only
    ///
    /// No cache or model access, so this completes immediately. Moods are the
    /// user's, or the default list.
    pub fn fallback_palettes(&self, request: &PreparedRequest) -> Vec<Palette> {
        let moods = if request.user_moods.is_empty() {
            fallback::default_moods()
        } else {
            request.user_moods.clone()
        };

        moods
            .iter()
            .map(|mood| {
                let colors = fallback::fallback_palette(mood, request.palette_size);
                let entries = colors
                    .iter()
                    .zip(ColorRole::ALL)
                    .map(|(hex, role)| {
                        let psychology = fallback::fallback_psychology(mood, role);
                        ColorEntry::new(mood, role, hex.clone(), psychology)
                    })
                    .collect();
                self.assemble_palette(mood, request, &colors, entries)
            })
            .collect()
    }

    /// Moods for a request, 1..=6 unless the user supplied more
    ///
    /// User moods are used verbatim. Otherwise the mood prompt is looked up in
    /// the cache, then asked of the model (single attempt). Failures yield the
    /// default list, which is cached too so the failing call is not repeated
    /// within the TTL.
    pub async fn resolve_moods(
        &self,
        request: &PreparedRequest,
        generator: &dyn TextGenerator,
    ) -> Vec<String> {
        if !request.user_moods.is_empty() {
            tracing::debug!(moods = ?request.user_moods, "Using user-supplied moods");
            return request.user_moods.clone();
        }

        let key = request.mood_prompt_text.as_str();

        if let Some(cached) = self.cache.get_json::<Vec<String>>(EMOTION_CACHE, key).await {
            if !cached.is_empty() {
                tracing::debug!(moods = ?cached, "Using cached moods");
                return cached;
            }
        }

        let prompt = mood_prompt(key);
        let single_attempt = RetryPolicy {
            max_attempts: 1,
            ..self.settings.retry.clone()
        };

        let moods = match single_attempt
            .invoke_with_retry("mood list", || generator.generate(&prompt))
            .await
        {
            RetryOutcome::Success(text) => match self.parser.parse_moods(&text) {
                Ok(moods) => moods,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to parse moods, using default moods");
                    fallback::default_moods()
                }
            },
            RetryOutcome::Fallback(reason) => {
                tracing::warn!(reason = ?reason, "Failed to generate moods, using default moods");
                fallback::default_moods()
            }
        };

        self.cache.set_json(EMOTION_CACHE, key, &moods).await;
        moods
    }

    /// Hex colors for one mood
    ///
    /// Model output yields exactly `palette_size` colors. Fallback yields the
    /// static palette for known moods (truncated, never padded) or
    /// `palette_size` random colors.
    pub async fn generate_palette_colors(
        &self,
        mood: &str,
        prompt_text: &str,
        palette_size: usize,
        generator: &dyn TextGenerator,
    ) -> Vec<HexColor> {
        let prompt = palette_prompt(mood, prompt_text, palette_size);
        let operation_name = format!("palette for {}", mood);

        match self
            .settings
            .retry
            .invoke_with_retry(&operation_name, || generator.generate(&prompt))
            .await
        {
            RetryOutcome::Success(text) => {
                match self.parser.parse_hex_colors(&text, palette_size) {
                    Ok(colors) => return colors,
                    Err(e) => {
                        tracing::warn!(
                            mood = %mood,
                            error = %e,
                            "Unusable palette response, using fallback"
                        );
                    }
                }
            }
            RetryOutcome::Fallback(reason) => {
                tracing::debug!(mood = %mood, reason = ?reason, "Palette generation fell back");
            }
        }

        fallback::fallback_palette(mood, palette_size)
    }

    /// Psychology record for one (mood, role), cached under `{mood}_{role}`
    ///
    /// Fallback records are cached as well.
    pub async fn generate_psychology(
        &self,
        mood: &str,
        role: ColorRole,
        generator: &dyn TextGenerator,
    ) -> ColorPsychology {
        let cache_key = format!("{}_{}", mood, role.key());

        if let Some(cached) = self
            .cache
            .get_json::<ColorPsychology>(PSYCHOLOGY_CACHE, &cache_key)
            .await
        {
            return cached;
        }

        let prompt = psychology_prompt(mood, role);
        let operation_name = format!("psychology for {} {}", mood, role.key());

        let record = match self
            .settings
            .retry
            .invoke_with_retry(&operation_name, || generator.generate(&prompt))
            .await
        {
            RetryOutcome::Success(text) => match self.parser.parse_psychology(&text) {
                Ok(fields) => ColorPsychology {
                    mood: mood.to_string(),
                    meaning: format!("{} through {}", fields.meaning, role.key()),
                    associations: fields.associations,
                    application: fields.application,
                },
                Err(e) => {
                    tracing::warn!(
                        mood = %mood,
                        role = %role,
                        error = %e,
                        "Unusable psychology response, using fallback"
                    );
                    fallback::fallback_psychology(mood, role)
                }
            },
            RetryOutcome::Fallback(reason) => {
                tracing::debug!(
                    mood = %mood,
                    role = %role,
                    reason = ?reason,
                    "Psychology generation fell back"
                );
                fallback::fallback_psychology(mood, role)
            }
        };

        self.cache.set_json(PSYCHOLOGY_CACHE, &cache_key, &record).await;
        record
    }

    async fn build_palette(
        &self,
        mood: &str,
        request: &PreparedRequest,
        generator: &dyn TextGenerator,
        limiter: &ConcurrencyLimiter,
    ) -> Palette {
        let colors = self
            .generate_palette_colors(mood, &request.prompt_text, request.palette_size, generator)
            .await;

        let entries = join_all(colors.iter().zip(ColorRole::ALL).map(|(hex, role)| {
            limiter.schedule(async move {
                let psychology = self.generate_psychology(mood, role, generator).await;
                ColorEntry::new(mood, role, hex.clone(), psychology)
            })
        }))
        .await;

        self.assemble_palette(mood, request, &colors, entries)
    }

    fn assemble_palette(
        &self,
        mood: &str,
        request: &PreparedRequest,
        colors: &[HexColor],
        entries: Vec<ColorEntry>,
    ) -> Palette {
        let name = if request.prompt_text.is_empty() {
            format!("{} Palette", mood)
        } else {
            format!("{} {}", mood, request.prompt_text)
        };

        let mut description = format!("A {} palette", mood.to_lowercase());
        if !request.prompt_text.is_empty() {
            description.push_str(&format!(" inspired by {}", request.prompt_text));
        }

        Palette {
            id: self.ids.next_id(),
            name,
            mood: mood.to_string(),
            accessibility: assess_palette(colors),
            colors: entries,
            description,
        }
    }
}

fn mood_prompt(mood_prompt_text: &str) -> String {
    format!(
        "{}. List 6 distinct emotions suitable for generating color palettes, \
         separated by commas.",
        mood_prompt_text
    )
}

fn palette_prompt(mood: &str, prompt_text: &str, palette_size: usize) -> String {
    let format = vec!["#RRGGBB"; palette_size].join(", ");
    format!(
        "Generate a color palette of {} hex codes for a {} mood based on: {}. Format: {}",
        palette_size,
        mood.to_lowercase(),
        prompt_text,
        format
    )
}

fn psychology_prompt(mood: &str, role: ColorRole) -> String {
    format!(
        "Describe the psychological impact and associations of a {} color that evokes a {} mood. \
         Provide a brief meaning, three associations, and one sentence on how the color \
         could be applied in design.",
        role.key(),
        mood.to_lowercase()
    )
}
