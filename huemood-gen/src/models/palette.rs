//! Palette output types
//!
//! Serialized field names match the JSON consumed by the web front end,
//! which calls a mood an `emotion`. `mood` is still accepted on input so
//! psychology records cached under the old name stay readable.

use serde::{Deserialize, Serialize};

use super::color::{ColorRole, HexColor, Rgb};

/// Psychological reading of one color role for one mood
///
/// Cached by `(mood, role)`; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPsychology {
    #[serde(rename = "emotion", alias = "mood")]
    pub mood: String,
    pub meaning: String,
    /// Always three entries
    pub associations: [String; 3],
    #[serde(default)]
    pub application: String,
}

/// One color of a palette
#[derive(Debug, Clone, Serialize)]
pub struct ColorEntry {
    /// "{mood} {Role}", e.g. "Calm Primary"
    pub name: String,
    pub hex: HexColor,
    pub rgb: Rgb,
    pub psychology: ColorPsychology,
}

impl ColorEntry {
    pub fn new(mood: &str, role: ColorRole, hex: HexColor, psychology: ColorPsychology) -> Self {
        Self {
            name: format!("{} {}", mood, role.name()),
            rgb: hex.rgb(),
            hex,
            psychology,
        }
    }
}

/// Colors and metadata generated for one mood
#[derive(Debug, Clone, Serialize)]
pub struct Palette {
    /// Short opaque identifier; uniqueness is best-effort
    pub id: String,
    pub name: String,
    #[serde(rename = "emotion")]
    pub mood: String,
    /// Ordered by role (Primary, Secondary, Accent, Neutral, Highlight)
    pub colors: Vec<ColorEntry>,
    pub description: String,
    pub accessibility: AccessibilityReport,
}

/// Average contrast classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContrastLevel {
    Low,
    Medium,
    High,
}

/// Text readability classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Readability {
    Fair,
    Good,
    Excellent,
}

/// WCAG compliance tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WcagTier {
    #[serde(rename = "Below AA")]
    BelowAA,
    #[serde(rename = "AA")]
    AA,
    #[serde(rename = "AAA")]
    AAA,
}

/// WCAG tiers for normal and large text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WcagCompliance {
    pub normal: WcagTier,
    pub large: WcagTier,
}

/// Accessibility assessment of a palette
///
/// `color_blindness` is a fixed placeholder; no simulation is performed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityReport {
    pub contrast: ContrastLevel,
    pub color_blindness: String,
    pub readability: Readability,
    pub wcag: WcagCompliance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::accessibility::assess_palette;
    use crate::services::fallback::fallback_psychology;

    #[test]
    fn test_mood_serialized_as_emotion() {
        let psychology = fallback_psychology("Calm", ColorRole::Primary);
        let hex = HexColor::parse("#E6EFF6").unwrap();
        let palette = Palette {
            id: "abc123xyz".to_string(),
            name: "Calm Palette".to_string(),
            mood: "Calm".to_string(),
            accessibility: assess_palette(std::slice::from_ref(&hex)),
            colors: vec![ColorEntry::new("Calm", ColorRole::Primary, hex, psychology)],
            description: "A calm palette".to_string(),
        };

        let json = serde_json::to_value(&palette).unwrap();
        assert_eq!(json["emotion"], "Calm");
        assert!(json.get("mood").is_none());
        assert_eq!(json["colors"][0]["psychology"]["emotion"], "Calm");
        assert!(json["colors"][0]["psychology"].get("mood").is_none());
    }

    #[test]
    fn test_psychology_reads_both_field_names() {
        let current: ColorPsychology = serde_json::from_str(
            r#"{"emotion":"Love","meaning":"m","associations":["a","b","c"],"application":"x"}"#,
        )
        .unwrap();
        let older: ColorPsychology = serde_json::from_str(
            r#"{"mood":"Love","meaning":"m","associations":["a","b","c"]}"#,
        )
        .unwrap();

        assert_eq!(current.mood, "Love");
        assert_eq!(older.mood, "Love");
        assert_eq!(older.application, "");
    }
}
