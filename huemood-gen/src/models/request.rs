//! Generation request and response payloads

use serde::{Deserialize, Serialize};

use super::palette::Palette;

/// Input source of a generation request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    #[default]
    Prompt,
    Image,
}

/// One palette generation request
///
/// Legacy field names (`prompt`, `image`, `emotionPrompt`, `userEmotions`)
/// are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default, alias = "prompt")]
    pub prompt_text: Option<String>,

    #[serde(default)]
    pub mode: GenerationMode,

    /// Encoded image; only its presence is checked
    #[serde(default, alias = "image")]
    pub image_data: Option<String>,

    #[serde(default, alias = "emotionPrompt")]
    pub mood_prompt_text: Option<String>,

    #[serde(default, alias = "userEmotions")]
    pub user_moods: Option<Vec<String>>,

    #[serde(default)]
    pub palette_size: Option<usize>,
}

impl GenerationRequest {
    /// Prompt-mode request with just a prompt
    pub fn from_prompt(prompt_text: impl Into<String>) -> Self {
        Self {
            prompt_text: Some(prompt_text.into()),
            ..Self::default()
        }
    }

    pub fn with_user_moods<I, S>(mut self, moods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_moods = Some(moods.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_palette_size(mut self, size: usize) -> Self {
        self.palette_size = Some(size);
        self
    }
}

/// Successful generation response
#[derive(Debug, Clone, Serialize)]
pub struct PalettesResponse {
    pub palettes: Vec<Palette>,
    /// Present when the response was produced in degraded mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_fields() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{
                "promptText": "sunset beach",
                "mode": "prompt",
                "moodPromptText": "cozy",
                "userMoods": ["Calm"],
                "paletteSize": 4
            }"#,
        )
        .unwrap();

        assert_eq!(request.prompt_text.as_deref(), Some("sunset beach"));
        assert_eq!(request.mode, GenerationMode::Prompt);
        assert_eq!(request.mood_prompt_text.as_deref(), Some("cozy"));
        assert_eq!(request.user_moods, Some(vec!["Calm".to_string()]));
        assert_eq!(request.palette_size, Some(4));
    }

    #[test]
    fn test_legacy_field_names() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{
                "prompt": "forest",
                "mode": "image",
                "image": "data:image/png;base64,AAAA",
                "emotionPrompt": "wild",
                "userEmotions": ["Serene"]
            }"#,
        )
        .unwrap();

        assert_eq!(request.prompt_text.as_deref(), Some("forest"));
        assert_eq!(request.mode, GenerationMode::Image);
        assert!(request.image_data.is_some());
        assert_eq!(request.mood_prompt_text.as_deref(), Some("wild"));
        assert_eq!(request.user_moods, Some(vec!["Serene".to_string()]));
    }

    #[test]
    fn test_mode_defaults_to_prompt() {
        let request: GenerationRequest = serde_json::from_str(r#"{"promptText":"x"}"#).unwrap();
        assert_eq!(request.mode, GenerationMode::Prompt);
        assert!(request.palette_size.is_none());
    }
}
