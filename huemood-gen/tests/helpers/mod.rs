//! Test Helper Utilities
//!
//! Scripted text generators, misbehaving cache stores and orchestrator
//! builders shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use huemood_gen::services::{
    CacheError, CacheStore, GenerationError, MemoryCache, OrchestratorSettings,
    PaletteOrchestrator, ResponseCache, RetryPolicy, SequentialIdGenerator, TextGenerator,
};

type Responder = Box<dyn Fn(&str) -> Result<String, GenerationError> + Send + Sync>;

/// Generator driven by a closure, recording every prompt it receives
pub struct ScriptedGenerator {
    responder: Responder,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: None,
            prompts: Mutex::new(Vec::new()),
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Every call fails with a non-retryable error
    pub fn always_failing() -> Self {
        Self::new(|_| Err(GenerationError::Fatal("model unavailable".to_string())))
    }

    /// Every call is rate limited
    pub fn rate_limited() -> Self {
        Self::new(|_| Err(GenerationError::RateLimited))
    }

    /// Well-formed answers for each prompt kind
    pub fn healthy() -> Self {
        Self::new(|prompt| {
            let text = if prompt.starts_with("Generate a color palette") {
                "Sure: #102030, #405060, #708090, #A0B0C0, #D0E0F0".to_string()
            } else if prompt.starts_with("Describe") {
                "Evokes quiet focus. Ocean. Dusk. Silence. Use it for calm reading surfaces."
                    .to_string()
            } else {
                "Wistful, Radiant, Brooding".to_string()
            };
            Ok(text)
        })
    }

    /// Sleep before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Calls whose prompt contains `marker`
    pub fn calls_containing(&self, marker: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(marker))
            .count()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Most calls observed in flight at once
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let result = (self.responder)(prompt);

        self.running.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Marker of mood list requests
pub const MOOD_PROMPT_MARKER: &str = "List 6 distinct emotions";

/// Marker of palette requests
pub const PALETTE_PROMPT_MARKER: &str = "Generate a color palette";

/// Marker of psychology requests
pub const PSYCHOLOGY_PROMPT_MARKER: &str = "Describe the psychological impact";

/// Settings with short delays so tests stay fast
pub fn fast_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            jitter_factor: 0.5,
            call_timeout: Duration::from_secs(5),
        },
        psychology_concurrency: 2,
        default_palette_size: 5,
        request_timeout: Duration::from_secs(60),
    }
}

/// In-memory cache with a one-hour TTL
pub fn memory_cache() -> ResponseCache {
    ResponseCache::new(
        Arc::new(MemoryCache::new()),
        Duration::from_secs(3600),
        Duration::from_secs(1),
    )
}

/// Orchestrator over a fresh in-memory cache with deterministic ids
pub fn test_orchestrator(settings: OrchestratorSettings) -> PaletteOrchestrator {
    PaletteOrchestrator::new(memory_cache(), settings)
        .with_id_generator(Arc::new(SequentialIdGenerator::new("palette")))
}

/// Orchestrator over `store` with a two-second per-operation cache deadline
pub fn orchestrator_over(
    store: Arc<dyn CacheStore>,
    settings: OrchestratorSettings,
) -> PaletteOrchestrator {
    let cache = ResponseCache::new(store, Duration::from_secs(3600), Duration::from_secs(2));
    PaletteOrchestrator::new(cache, settings)
        .with_id_generator(Arc::new(SequentialIdGenerator::new("palette")))
}

/// Store whose every operation errors
pub struct FailingStore;

#[async_trait]
impl CacheStore for FailingStore {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Backend("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend("connection refused".to_string()))
    }

    async fn close(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Store whose reads and writes never complete
pub struct HungStore;

#[async_trait]
impl CacheStore for HungStore {
    fn backend_name(&self) -> &'static str {
        "hung"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        std::future::pending().await
    }

    async fn close(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
