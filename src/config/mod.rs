//! Configuration management for the Quill gateway
//!
//! Values resolve as env > TOML file > default.

pub mod file;

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::gateway::{DEFAULT_BASE_URL, DEFAULT_GRADING_MODEL, DEFAULT_SPEECH_MODEL, DEFAULT_VOICE};
use crate::{Error, Result};

/// Default relay port
pub const DEFAULT_PORT: u16 = 8787;

/// Practice words used when none are configured
pub const DEFAULT_WORDS: [&str; 4] = ["air", "water", "shelter", "food"];

/// Quill configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Practice words, advanced round-robin
    pub words: Vec<String>,

    /// Hosted model configuration (relay side)
    pub gemini: GeminiConfig,

    /// HTTP relay server configuration
    pub server: ServerConfig,

    /// Relay endpoint used by drawing clients
    pub endpoint: String,
}

/// Hosted model configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key (from `GEMINI_API_KEY` or `API_KEY`); redacted in debug output
    pub api_key: Option<SecretString>,

    /// API host
    pub base_url: String,

    /// Text-to-speech model
    pub speech_model: String,

    /// Vision model used for grading
    pub grading_model: String,

    /// Prebuilt voice name
    pub voice: String,
}

/// HTTP relay server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web UI)
    pub static_dir: Option<PathBuf>,

    /// Requests per minute allowed on the relay; `None` disables limiting
    pub requests_per_minute: Option<u32>,
}

impl Config {
    /// Load configuration from the process environment and config file
    ///
    /// # Errors
    ///
    /// Returns error if the resolved configuration is invalid
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let fc = file::load_config_file(config_path);
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if the word list is empty or a number fails to parse
    pub fn from_sources(
        fc: file::QuillConfigFile,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let words: Vec<String> = env("QUILL_WORDS")
            .map(|list| list.split(',').map(str::to_string).collect())
            .or(fc.words)
            .unwrap_or_else(|| DEFAULT_WORDS.iter().map(ToString::to_string).collect())
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(Error::Config("practice word list is empty".to_string()));
        }

        // Gemini (env > toml > default)
        let gemini = GeminiConfig {
            api_key: env("GEMINI_API_KEY")
                .or_else(|| env("API_KEY"))
                .or(fc.gemini.api_key)
                .map(SecretString::from),
            base_url: env("QUILL_GEMINI_URL")
                .or(fc.gemini.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            speech_model: env("QUILL_SPEECH_MODEL")
                .or(fc.gemini.speech_model)
                .unwrap_or_else(|| DEFAULT_SPEECH_MODEL.to_string()),
            grading_model: env("QUILL_GRADING_MODEL")
                .or(fc.gemini.grading_model)
                .unwrap_or_else(|| DEFAULT_GRADING_MODEL.to_string()),
            voice: env("QUILL_VOICE")
                .or(fc.gemini.voice)
                .unwrap_or_else(|| DEFAULT_VOICE.to_string()),
        };

        // Server (env > toml > default)
        let port = match env("QUILL_PORT").or_else(|| env("PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid port: {raw}")))?,
            None => fc.server.port.unwrap_or(DEFAULT_PORT),
        };

        let requests_per_minute = match env("QUILL_RATE_LIMIT") {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| Error::Config(format!("invalid rate limit: {raw}")))?,
            ),
            None => fc.server.requests_per_minute,
        }
        .filter(|&rpm| rpm > 0);

        let server = ServerConfig {
            port,
            static_dir: env("QUILL_STATIC_DIR")
                .or(fc.server.static_dir)
                .map(PathBuf::from),
            requests_per_minute,
        };

        let endpoint = env("QUILL_ENDPOINT")
            .or(fc.client.endpoint)
            .unwrap_or_else(|| format!("http://127.0.0.1:{port}/api/gemini"));

        Ok(Self {
            words,
            gemini,
            server,
            endpoint,
        })
    }
}
