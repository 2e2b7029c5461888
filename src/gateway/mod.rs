//! Remote inference gateway
//!
//! Two operations backed by a hosted model: speech synthesis for a word and
//! legibility grading of a handwriting snapshot. [`GeminiClient`] calls the
//! model directly and belongs on the server; [`RelayClient`] reaches it
//! through the relay endpoint.

mod gemini;
mod grading;
mod relay;
pub mod wire;

use async_trait::async_trait;

pub use gemini::{
    DEFAULT_BASE_URL, DEFAULT_GRADING_MODEL, DEFAULT_SPEECH_MODEL, DEFAULT_VOICE, GeminiClient,
    grading_prompt, speech_prompt,
};
pub use grading::Verdict;
pub use relay::RelayClient;

use crate::Result;

/// Hosted model operations
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Synthesize a word as raw 24 kHz mono PCM bytes
    ///
    /// Returns an empty buffer when the model produced no audio.
    async fn pronounce(&self, word: &str) -> Result<Vec<u8>>;

    /// Ask the model whether a PNG data URL shows `word`
    ///
    /// Returns the model's trimmed answer; classify it with
    /// [`Verdict::classify`].
    async fn grade(&self, image_data_url: &str, word: &str) -> Result<String>;
}
