//! JSON exchange between drawing clients and the relay

use serde::{Deserialize, Serialize};

/// Action names understood by the relay
pub const ACTION_PRONOUNCE: &str = "generatePronunciation";
pub const ACTION_CHECK: &str = "checkHandwriting";

/// Request body: `{"action": ..., "payload": {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload")]
pub enum RelayRequest {
    #[serde(rename = "generatePronunciation")]
    GeneratePronunciation { word: String },
    #[serde(rename = "checkHandwriting")]
    CheckHandwriting {
        #[serde(rename = "imageDataUrl")]
        image_data_url: String,
        word: String,
    },
}

impl RelayRequest {
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::GeneratePronunciation { .. } => ACTION_PRONOUNCE,
            Self::CheckHandwriting { .. } => ACTION_CHECK,
        }
    }
}

/// Response to `generatePronunciation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronunciationResponse {
    /// Base64 PCM, `null` when the model returned no audio
    #[serde(rename = "audioData", default)]
    pub audio_data: Option<String>,
}

/// Response to `checkHandwriting`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingResponse {
    pub text: String,
}
