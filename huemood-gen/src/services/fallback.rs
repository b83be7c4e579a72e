//! Fallback data used when generation fails
//!
//! Static palettes exist for the default moods. Unknown moods get random
//! colors; psychology falls back to a generic record.

use rand::Rng;

use crate::models::{ColorPsychology, ColorRole, HexColor};

/// Mood list used when no moods can be derived
pub const DEFAULT_MOODS: [&str; 6] =
    ["Calm", "Energetic", "Mysterious", "Joyful", "Serene", "Love"];

/// Static palettes keyed by mood (exact match)
const FALLBACK_PALETTES: &[(&str, [&str; 5])] = &[
    ("Calm", ["#E6EFF6", "#B8D1E5", "#92AFC7", "#6E8BA3", "#5A9BD5"]),
    ("Energetic", ["#FFE45C", "#FF6B6B", "#4ECDC4", "#45B7D1", "#F9AFAE"]),
    ("Mysterious", ["#2C3E50", "#8E44AD", "#2980B9", "#34495E", "#5D6D7E"]),
    ("Joyful", ["#FF9A8B", "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFD700"]),
    ("Serene", ["#E8F3F1", "#CCECE6", "#99D8CF", "#66C3B8", "#5BC0EB"]),
    ("Love", ["#FFB6C1", "#DB7093", "#C71585", "#FF69B4", "#FF1493"]),
];

/// Default mood list as owned strings
pub fn default_moods() -> Vec<String> {
    DEFAULT_MOODS.iter().map(|m| m.to_string()).collect()
}

/// Static palette for a known mood, at most `palette_size` colors
///
/// Static palettes are truncated to the requested size but never padded.
pub fn static_palette(mood: &str, palette_size: usize) -> Option<Vec<HexColor>> {
    FALLBACK_PALETTES
        .iter()
        .find(|(name, _)| *name == mood)
        .map(|(_, colors)| {
            colors
                .iter()
                .take(palette_size)
                .filter_map(|c| HexColor::parse(c).ok())
                .collect()
        })
}

/// Exactly `palette_size` uniformly random colors
pub fn random_palette(palette_size: usize) -> Vec<HexColor> {
    let mut rng = rand::thread_rng();
    random_palette_with(&mut rng, palette_size)
}

pub fn random_palette_with<R: Rng + ?Sized>(rng: &mut R, palette_size: usize) -> Vec<HexColor> {
    (0..palette_size).map(|_| HexColor::random(rng)).collect()
}

/// Static palette for known moods, random colors otherwise
pub fn fallback_palette(mood: &str, palette_size: usize) -> Vec<HexColor> {
    static_palette(mood, palette_size).unwrap_or_else(|| random_palette(palette_size))
}

/// Generic psychology record for a mood and role
pub fn fallback_psychology(mood: &str, role: ColorRole) -> ColorPsychology {
    ColorPsychology {
        mood: mood.to_string(),
        meaning: format!("General {} color psychology for {}", role.key(), mood),
        associations: [
            "General association 1".to_string(),
            "General association 2".to_string(),
            "General association 3".to_string(),
        ],
        application: "General design application".to_string(),
    }
}
