//! Raw PCM payloads returned by the speech model
//!
//! The model answers with base64-encoded signed 16-bit little-endian samples,
//! mono, at 24 kHz. There is no container header.

use std::path::Path;
use std::time::Duration;

use base64::Engine;

use crate::{Error, Result};

/// Sample rate of synthesized speech
pub const SAMPLE_RATE: u32 = 24000;

/// Channel count of synthesized speech
pub const CHANNELS: u16 = 1;

/// Decoded speech audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmClip {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl PcmClip {
    /// Wrap samples in the speech model's format
    #[must_use]
    pub const fn new(samples: Vec<i16>) -> Self {
        Self {
            samples,
            sample_rate: SAMPLE_RATE,
            channels: CHANNELS,
        }
    }

    /// Interpret raw little-endian bytes as 16-bit samples
    ///
    /// # Errors
    ///
    /// Returns error if the byte count is odd
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 2 != 0 {
            return Err(Error::Audio(format!(
                "PCM payload has odd length {}",
                bytes.len()
            )));
        }

        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Ok(Self::new(samples))
    }

    /// Decode a base64 payload into a clip
    ///
    /// # Errors
    ///
    /// Returns error if the payload is not base64 or not whole samples
    pub fn from_base64(payload: &str) -> Result<Self> {
        let bytes = decode_base64(payload)?;
        Self::from_le_bytes(&bytes)
    }

    /// Raw samples
    #[must_use]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels
    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Whether the clip holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback length
    #[must_use]
    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() as u64 / u64::from(self.channels.max(1));
        Duration::from_millis(frames * 1000 / u64::from(self.sample_rate))
    }

    /// Samples normalized to `[-1.0, 1.0)` for the output device
    #[must_use]
    pub fn to_f32(&self) -> Vec<f32> {
        self.samples
            .iter()
            .map(|&s| f32::from(s) / 32768.0)
            .collect()
    }

    /// Little-endian bytes, the inverse of [`PcmClip::from_le_bytes`]
    #[must_use]
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    /// Base64 payload in the speech model's wire format
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.to_le_bytes())
    }

    /// Encode as a WAV file in memory
    ///
    /// # Errors
    ///
    /// Returns error if encoding fails
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| Error::Audio(e.to_string()))?;

            for &sample in &self.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| Error::Audio(e.to_string()))?;
            }

            writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
        }

        Ok(cursor.into_inner())
    }

    /// Write the clip to a WAV file
    ///
    /// # Errors
    ///
    /// Returns error if encoding or writing fails
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        let wav = self.to_wav()?;
        std::fs::write(path, wav)?;
        tracing::debug!(path = %path.display(), samples = self.samples.len(), "wrote wav");
        Ok(())
    }
}

/// Decode a standard base64 string
///
/// # Errors
///
/// Returns error if the input is not valid base64
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
}

/// Encode bytes as standard base64
#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trip_preserves_samples() {
        let original = PcmClip::new(vec![0, 1, -1, 12345, -12345, i16::MAX, i16::MIN]);

        let decoded = PcmClip::from_base64(&original.to_base64()).unwrap();

        assert_eq!(decoded.samples(), original.samples());
        assert_eq!(decoded.sample_rate(), 24000);
        assert_eq!(decoded.channels(), 1);
    }

    #[test]
    fn little_endian_byte_order() {
        let clip = PcmClip::from_le_bytes(&[0x34, 0x12, 0xff, 0xff]).unwrap();
        assert_eq!(clip.samples(), &[0x1234, -1]);
    }

    #[test]
    fn odd_length_payload_is_rejected() {
        let err = PcmClip::from_le_bytes(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::Audio(_)));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        assert!(matches!(
            PcmClip::from_base64("not base64!"),
            Err(Error::Base64(_))
        ));
    }

    #[test]
    fn normalization_range() {
        let clip = PcmClip::new(vec![i16::MIN, 0, 16384]);
        let samples = clip.to_f32();

        assert!((samples[0] + 1.0).abs() < f32::EPSILON);
        assert!(samples[1].abs() < f32::EPSILON);
        assert!((samples[2] - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn duration_at_24khz() {
        let clip = PcmClip::new(vec![0; 12000]);
        assert_eq!(clip.duration(), Duration::from_millis(500));
    }

    #[test]
    fn wav_header_describes_clip() {
        let clip = PcmClip::new(vec![100, -100, 200]);
        let wav = clip.to_wav().unwrap();

        let reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 24000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);

        let samples: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![100, -100, 200]);
    }
}
