//! Service modules for palette generation
//!
//! Leaf services (accessibility, fallback, parsers, retry, limiter, cache)
//! are independent of each other; the orchestrator composes them.

pub mod accessibility;
pub mod cache;
pub mod fallback;
pub mod gemini_client;
pub mod id_generator;
pub mod limiter;
pub mod orchestrator;
pub mod parsers;
pub mod retry;
pub mod text_generator;

pub use cache::{connect_store, CacheError, CacheStore, MemoryCache, RedisCache, ResponseCache};
pub use gemini_client::{GeminiClient, GeminiModel};
pub use id_generator::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use limiter::ConcurrencyLimiter;
pub use orchestrator::{InputError, OrchestratorSettings, PaletteOrchestrator, PreparedRequest};
pub use parsers::{ParseError, PlainTextParser, PsychologyFields, ResponseParser};
pub use retry::{FallbackReason, RetryOutcome, RetryPolicy};
pub use text_generator::{GenerationError, GeneratorSet, TextGenerator, UnavailableGenerator};
