//! Color value types
//!
//! [`HexColor`] is the only way a color enters a palette: construction
//! validates the `#RRGGBB` shape, so downstream code (RGB conversion,
//! luminance) never sees a malformed code.

use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rejected hex color literal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid hex color: {0:?} (expected #RRGGBB)")]
pub struct InvalidHexColor(pub String);

/// Well-formed `#RRGGBB` color code
///
/// Digit case is preserved as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Validate and wrap a `#RRGGBB` literal
    pub fn parse(value: &str) -> Result<Self, InvalidHexColor> {
        let digits = value
            .strip_prefix('#')
            .ok_or_else(|| InvalidHexColor(value.to_string()))?;

        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidHexColor(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    /// Uniformly random 24-bit color (uppercase digits)
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let value: u32 = rng.gen_range(0..=0xFF_FFFF);
        Self(format!("#{:06X}", value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Channel values 0-255
    pub fn rgb(&self) -> Rgb {
        // Shape is validated at construction, so every slice parses.
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&self.0[range], 16).unwrap_or_default()
        };
        Rgb {
            r: channel(1..3),
            g: channel(3..5),
            b: channel(5..7),
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HexColor {
    type Err = InvalidHexColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = InvalidHexColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

/// RGB triplet, serialized in CSS form `rgb(r,g,b)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Role of a color within a palette, by position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Primary,
    Secondary,
    Accent,
    Neutral,
    Highlight,
}

impl ColorRole {
    /// Roles in palette order
    pub const ALL: [ColorRole; 5] = [
        ColorRole::Primary,
        ColorRole::Secondary,
        ColorRole::Accent,
        ColorRole::Neutral,
        ColorRole::Highlight,
    ];

    /// Display name ("Primary")
    pub fn name(&self) -> &'static str {
        match self {
            ColorRole::Primary => "Primary",
            ColorRole::Secondary => "Secondary",
            ColorRole::Accent => "Accent",
            ColorRole::Neutral => "Neutral",
            ColorRole::Highlight => "Highlight",
        }
    }

    /// Lowercase form used in prompts and cache keys ("primary")
    pub fn key(&self) -> &'static str {
        match self {
            ColorRole::Primary => "primary",
            ColorRole::Secondary => "secondary",
            ColorRole::Accent => "accent",
            ColorRole::Neutral => "neutral",
            ColorRole::Highlight => "highlight",
        }
    }
}

impl fmt::Display for ColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
