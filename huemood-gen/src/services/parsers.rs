//! Response parsers for free-text model output
//!
//! The generation service returns prose, not a schema. Parsers here are
//! permissive about content and strict about quantity; a [`ParseError`] is
//! always recovered by the caller with fallback data.
//!
//! The orchestrator depends only on the [`ResponseParser`] trait so a
//! structured-output parser can replace [`PlainTextParser`] without touching it.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::HexColor;

/// Most moods taken from a model response
pub const MAX_MOODS: usize = 6;

/// Segments required by the psychology parser
const PSYCHOLOGY_SEGMENTS: usize = 5;

static MOOD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z][a-z]+").expect("valid regex"));

static HEX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#[A-Fa-f0-9]{6}").expect("valid regex"));

/// Parser failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("No moods found in response")]
    NoMoods,

    #[error("Insufficient colors: found {found}, need {required}")]
    InsufficientColors { found: usize, required: usize },

    #[error("Incomplete psychology data: {segments} segments, need 5")]
    IncompletePsychology { segments: usize },
}

/// Psychology fields extracted from a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsychologyFields {
    pub meaning: String,
    pub associations: [String; 3],
    pub application: String,
}

/// Converts model prose into structured values
pub trait ResponseParser: Send + Sync {
    /// Distinct mood names, first-seen order, at most [`MAX_MOODS`]
    fn parse_moods(&self, text: &str) -> Result<Vec<String>, ParseError>;

    /// Exactly `palette_size` hex colors in scan order
    fn parse_hex_colors(
        &self,
        text: &str,
        palette_size: usize,
    ) -> Result<Vec<HexColor>, ParseError>;

    /// Meaning, three associations and an application sentence
    fn parse_psychology(&self, text: &str) -> Result<PsychologyFields, ParseError>;
}

/// Pattern- and delimiter-based parser
///
/// Psychology parsing splits on `.` and maps segments by position, so a
/// response with abbreviations or decimals shifts every field. Known
/// limitation; the fallback contract keeps it harmless.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextParser;

impl ResponseParser for PlainTextParser {
    fn parse_moods(&self, text: &str) -> Result<Vec<String>, ParseError> {
        let mut moods: Vec<String> = Vec::new();

        for m in MOOD_PATTERN.find_iter(text) {
            if moods.len() == MAX_MOODS {
                break;
            }
            if !moods.iter().any(|existing| existing == m.as_str()) {
                moods.push(m.as_str().to_string());
            }
        }

        if moods.is_empty() {
            return Err(ParseError::NoMoods);
        }
        Ok(moods)
    }

    fn parse_hex_colors(
        &self,
        text: &str,
        palette_size: usize,
    ) -> Result<Vec<HexColor>, ParseError> {
        let colors: Vec<HexColor> = HEX_PATTERN
            .find_iter(text)
            .filter_map(|m| HexColor::parse(m.as_str()).ok())
            .collect();

        if colors.len() < palette_size {
            return Err(ParseError::InsufficientColors {
                found: colors.len(),
                required: palette_size,
            });
        }

        Ok(colors.into_iter().take(palette_size).collect())
    }

    fn parse_psychology(&self, text: &str) -> Result<PsychologyFields, ParseError> {
        let parts: Vec<&str> = text
            .split('.')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.len() < PSYCHOLOGY_SEGMENTS {
            return Err(ParseError::IncompletePsychology {
                segments: parts.len(),
            });
        }

        Ok(PsychologyFields {
            meaning: parts[0].to_string(),
            associations: [parts[1].to_string(), parts[2].to_string(), parts[3].to_string()],
            application: parts[4].to_string(),
        })
    }
}

/// Strip characters outside ASCII letters, digits, whitespace, `,` `.` `-`; trim
pub fn sanitize_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(*c, ',' | '.' | '-'))
        .collect::<String>()
        .trim()
        .to_string()
}
