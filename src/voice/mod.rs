//! Speech audio handling
//!
//! Decodes the model's raw PCM payloads and hands them to an [`AudioSink`].

mod pcm;
mod playback;

use async_trait::async_trait;

pub use pcm::{CHANNELS, PcmClip, SAMPLE_RATE, decode_base64, encode_base64};
pub use playback::AudioPlayback;

use crate::Result;

/// Destination for decoded pronunciation audio
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Play a clip to completion
    async fn play(&self, clip: &PcmClip) -> Result<()>;
}

/// Sink that discards audio (headless practice)
#[derive(Debug, Default, Clone, Copy)]
pub struct MutedSink;

#[async_trait]
impl AudioSink for MutedSink {
    async fn play(&self, clip: &PcmClip) -> Result<()> {
        tracing::debug!(duration_ms = clip.duration().as_millis(), "audio muted");
        Ok(())
    }
}
