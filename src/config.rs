//! Configuration loading
//!
//! Supports `~/.config/confab/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of
//! defaults, and CLI flags (or their env equivalents) win over the file.
//!
//! The OpenAI API key lives in its own file (`~/.openai` by default, a single
//! trimmed line) and is loaded separately at startup so a missing or empty
//! key can abort with a directive message before anything else runs.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;

use crate::persona::Persona;
use crate::{Error, Result};

/// Default chat completion model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default transcription model
pub const DEFAULT_STT_MODEL: &str = "whisper-1";

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Persona identifier (e.g. "laconic")
    #[serde(default)]
    pub persona: Option<Persona>,

    /// Path to the API key file (defaults to `~/.openai`)
    #[serde(default)]
    pub api_key_path: Option<PathBuf>,

    /// LLM configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Chat model identifier (e.g. "gpt-3.5-turbo")
    pub model: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Record queries from the microphone (false = text input)
    pub enabled: Option<bool>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,
}

/// Overrides taken from the command line
#[derive(Debug, Default)]
pub struct Overrides {
    pub persona: Option<Persona>,
    pub model: Option<String>,
    pub text_mode: bool,
}

/// Resolved runtime configuration
#[derive(Debug)]
pub struct Config {
    /// Chat completion model
    pub model: String,
    /// Transcription model
    pub stt_model: String,
    /// Active persona preset
    pub persona: Persona,
    /// Record queries from the microphone
    pub voice: bool,
    /// Path to the API key file
    pub api_key_path: PathBuf,
}

impl Config {
    /// Load configuration from the standard file path, applying overrides
    #[must_use]
    pub fn load(overrides: &Overrides) -> Self {
        Self::resolve(load_config_file(), overrides)
    }

    /// Merge a parsed config file with CLI overrides and defaults
    #[must_use]
    pub fn resolve(file: ConfigFile, overrides: &Overrides) -> Self {
        let voice = if overrides.text_mode {
            false
        } else {
            file.voice.enabled.unwrap_or(true)
        };

        Self {
            model: overrides
                .model
                .clone()
                .or(file.llm.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            stt_model: file
                .voice
                .stt_model
                .unwrap_or_else(|| DEFAULT_STT_MODEL.to_string()),
            persona: overrides.persona.or(file.persona).unwrap_or_default(),
            voice,
            api_key_path: file.api_key_path.unwrap_or_else(default_api_key_path),
        }
    }
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be
/// parsed.
#[must_use]
pub fn load_config_file() -> ConfigFile {
    let Some(path) = config_file_path() else {
        return ConfigFile::default();
    };

    if !path.exists() {
        return ConfigFile::default();
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
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/confab/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("confab").join("config.toml"))
}

/// Default API key file path: `~/.openai`
fn default_api_key_path() -> PathBuf {
    directories::BaseDirs::new()
        .map_or_else(|| PathBuf::from(".openai"), |d| d.home_dir().join(".openai"))
}

/// Read the API key file and return the trimmed key
///
/// # Errors
///
/// Returns `Error::Config` with a remediation message if the file is missing,
/// unreadable, or holds an empty key.
pub fn load_api_key(path: &Path) -> Result<SecretString> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "could not read API key file {}: {e}. Please save an OpenAI API key to {}.",
            path.display(),
            path.display()
        ))
    })?;

    let key = content.trim();
    if key.is_empty() {
        return Err(Error::Config(format!(
            "API key file {} is empty. Please save an OpenAI API key to {}.",
            path.display(),
            path.display()
        )));
    }

    Ok(SecretString::from(key.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn resolve_applies_defaults() {
        let config = Config::resolve(ConfigFile::default(), &Overrides::default());

        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.stt_model, DEFAULT_STT_MODEL);
        assert_eq!(config.persona, Persona::Default);
        assert!(config.voice);
    }

    #[test]
    fn file_values_fill_unset_fields() {
        let file: ConfigFile = toml::from_str(
            r#"
            persona = "laconic"

            [llm]
            model = "gpt-4o-mini"

            [voice]
            enabled = false
            stt_model = "whisper-large"
            "#,
        )
        .unwrap();

        let config = Config::resolve(file, &Overrides::default());

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.stt_model, "whisper-large");
        assert_eq!(config.persona, Persona::Laconic);
        assert!(!config.voice);
    }

    #[test]
    fn overrides_win_over_file() {
        let file: ConfigFile = toml::from_str(
            r#"
            persona = "helpful"

            [llm]
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        let overrides = Overrides {
            persona: Some(Persona::GreatDepth),
            model: Some("gpt-4".to_string()),
            text_mode: true,
        };

        let config = Config::resolve(file, &overrides);

        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.persona, Persona::GreatDepth);
        assert!(!config.voice);
    }

    #[test]
    fn api_key_is_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  sk-test-key  ").unwrap();

        let key = load_api_key(file.path()).unwrap();
        assert_eq!(key.expose_secret(), "sk-test-key");
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "   ").unwrap();

        let err = load_api_key(file.path()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn missing_api_key_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-key");

        let err = load_api_key(&path).unwrap_err();
        assert!(err.to_string().contains("no-such-key"));
    }
}
