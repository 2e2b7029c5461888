//! Gemini `generateContent` client
//!
//! Holds the API key, so it only runs inside the relay server.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::InferenceGateway;
use crate::canvas::data_url_payload;
use crate::config::GeminiConfig;
use crate::voice::decode_base64;
use crate::{Error, Result};

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default speech synthesis model
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
/// Default handwriting grading model
pub const DEFAULT_GRADING_MODEL: &str = "gemini-2.5-flash";
/// Default prebuilt voice
pub const DEFAULT_VOICE: &str = "Kore";

/// Build the grading instruction for a target word
#[must_use]
pub fn grading_prompt(word: &str) -> String {
    format!(
        "You are an AI teacher helping a student practice their writing. \
         The student was asked to write the word \"{word}\". \
         Look at the image and evaluate their handwriting. \
         Respond with a single word: \"Correct\" if it is legible and clearly \"{word}\", \
         and \"Incorrect\" otherwise. Do not add any other explanation."
    )
}

/// Build the speech instruction for a word
#[must_use]
pub fn speech_prompt(word: &str) -> String {
    format!("Say: {word}")
}

/// Gemini REST client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    speech_model: String,
    grading_model: String,
    voice: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: Vec<&'a str>,
    speech_config: SpeechConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<ResponseInlineData>,
}

#[derive(Debug, Deserialize)]
struct ResponseInlineData {
    data: Option<String>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Base64 audio from the first part of the first candidate
    fn audio(&self) -> Option<&str> {
        self.first_parts()
            .first()
            .and_then(|p| p.inline_data.as_ref())
            .and_then(|d| d.data.as_deref())
            .filter(|d| !d.is_empty())
    }

    /// All text parts of the first candidate
    fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

impl GeminiClient {
    /// Create a client with default models
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(api_key: SecretString) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("Gemini API key required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            grading_model: DEFAULT_GRADING_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
        })
    }

    /// Create a client from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns error if no API key is configured
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("GEMINI_API_KEY is not set".to_string()))?;

        Ok(Self::new(api_key)?
            .with_base_url(config.base_url.clone())
            .with_speech_model(config.speech_model.clone())
            .with_grading_model(config.grading_model.clone())
            .with_voice(config.voice.clone()))
    }

    /// Point at a different API host (tests, proxies)
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn with_speech_model(mut self, model: String) -> Self {
        self.speech_model = model;
        self
    }

    #[must_use]
    pub fn with_grading_model(mut self, model: String) -> Self {
        self.grading_model = model;
        self
    }

    #[must_use]
    pub fn with_voice(mut self, voice: String) -> Self {
        self.voice = voice;
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:generateContent",
            self.base_url.trim_end_matches('/')
        )
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, model, body = %body, "gemini error body");
            return Err(Error::Gateway(format!("Gemini {model} returned {status}")));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl InferenceGateway for GeminiClient {
    async fn pronounce(&self, word: &str) -> Result<Vec<u8>> {
        let prompt = speech_prompt(word);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::Text { text: &prompt }],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: &self.voice,
                        },
                    },
                },
            }),
        };

        let response = self.generate(&self.speech_model, &request).await?;

        match response.audio() {
            Some(audio) => {
                let bytes = decode_base64(audio)?;
                tracing::debug!(word, bytes = bytes.len(), "pronunciation synthesized");
                Ok(bytes)
            }
            None => {
                tracing::debug!(word, "no audio in speech response");
                Ok(Vec::new())
            }
        }
    }

    async fn grade(&self, image_data_url: &str, word: &str) -> Result<String> {
        let image = data_url_payload(image_data_url)
            .ok_or_else(|| Error::Gateway("image is not a data URL".to_string()))?;
        let prompt = grading_prompt(word);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: "image/png",
                            data: image,
                        },
                    },
                    Part::Text { text: &prompt },
                ],
            }],
            generation_config: None,
        };

        let response = self.generate(&self.grading_model, &request).await?;
        let answer = response.text().trim().to_string();

        if answer.is_empty() {
            return Err(Error::Gateway("empty grading response".to_string()));
        }

        tracing::debug!(word, answer = %answer, "handwriting graded");
        Ok(answer)
    }
}
