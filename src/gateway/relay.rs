//! Client side of the relay: the drawing client never sees the API key

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use super::InferenceGateway;
use super::wire::{GradingResponse, PronunciationResponse, RelayRequest};
use crate::voice::decode_base64;
use crate::{Error, Result};

/// Gateway that forwards requests to a Quill relay server
pub struct RelayClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl RelayClient {
    /// Create a client for a relay endpoint such as `http://127.0.0.1:8787/api/gemini`
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Parse the endpoint and create a client
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is not a valid URL
    pub fn from_endpoint(endpoint: &str) -> Result<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("invalid relay endpoint {endpoint}: {e}")))?;
        Ok(Self::new(url))
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn call<T: DeserializeOwned>(&self, request: &RelayRequest) -> Result<T> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Gateway(format!(
                "relay {} returned {status}",
                request.action()
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl InferenceGateway for RelayClient {
    async fn pronounce(&self, word: &str) -> Result<Vec<u8>> {
        let request = RelayRequest::GeneratePronunciation {
            word: word.to_string(),
        };
        let response: PronunciationResponse = self.call(&request).await?;

        match response.audio_data.as_deref() {
            Some(audio) if !audio.is_empty() => decode_base64(audio),
            _ => Ok(Vec::new()),
        }
    }

    async fn grade(&self, image_data_url: &str, word: &str) -> Result<String> {
        let request = RelayRequest::CheckHandwriting {
            image_data_url: image_data_url.to_string(),
            word: word.to_string(),
        };
        let response: GradingResponse = self.call(&request).await?;
        Ok(response.text.trim().to_string())
    }
}
