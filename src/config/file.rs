//! TOML configuration file loading
//!
//! Supports `~/.config/quill/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct QuillConfigFile {
    /// Practice word list, in order
    #[serde(default)]
    pub words: Option<Vec<String>>,

    /// Hosted model configuration
    #[serde(default)]
    pub gemini: GeminiFileConfig,

    /// Relay server configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Drawing client configuration
    #[serde(default)]
    pub client: ClientFileConfig,
}

/// Gemini configuration
#[derive(Debug, Default, Deserialize)]
pub struct GeminiFileConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub speech_model: Option<String>,
    pub grading_model: Option<String>,
    /// Prebuilt voice name (e.g. "Kore")
    pub voice: Option<String>,
}

/// Relay server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Directory with a web front end to serve
    pub static_dir: Option<String>,

    /// Global request budget for the relay endpoint
    pub requests_per_minute: Option<u32>,
}

/// Drawing client configuration
#[derive(Debug, Default, Deserialize)]
pub struct ClientFileConfig {
    /// Relay endpoint URL
    pub endpoint: Option<String>,
}

/// Load the TOML config file from an explicit path or the standard path
///
/// Returns `QuillConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file(path: Option<&Path>) -> QuillConfigFile {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_file_path) else {
        return QuillConfigFile::default();
    };

    if !path.exists() {
        return QuillConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                QuillConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            QuillConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/quill/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("quill").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_file() {
        let fc: QuillConfigFile = toml::from_str(
            r#"
            words = ["sun", "moon"]

            [gemini]
            voice = "Puck"

            [server]
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(fc.words, Some(vec!["sun".to_string(), "moon".to_string()]));
        assert_eq!(fc.gemini.voice.as_deref(), Some("Puck"));
        assert_eq!(fc.gemini.api_key, None);
        assert_eq!(fc.server.port, Some(9000));
        assert_eq!(fc.client.endpoint, None);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let fc = load_config_file(Some(&dir.path().join("absent.toml")));
        assert!(fc.words.is_none());
    }

    #[test]
    fn unparseable_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "words = [unterminated").unwrap();

        let fc = load_config_file(Some(&path));
        assert!(fc.words.is_none());
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[client]\nendpoint = \"http://relay:1/api/gemini\"\n").unwrap();

        let fc = load_config_file(Some(&path));
        assert_eq!(fc.client.endpoint.as_deref(), Some("http://relay:1/api/gemini"));
    }
}
