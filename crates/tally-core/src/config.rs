//! AI backend configuration
//!
//! Configuration is resolved once at startup and handed to `AIClient::from_config`.
//! Resolution order (later wins):
//! 1. Built-in defaults (AI disabled, 20 second timeout)
//! 2. TOML file: explicit path, or `~/.local/share/tally/config/ai.toml`
//! 3. Environment: `TALLY_AI_PROVIDER`, `TALLY_AI_HOST`, `TALLY_AI_MODEL`,
//!    `TALLY_AI_API_KEY`, `TALLY_AI_TIMEOUT_SECS`
//!
//! ```toml
//! [ai]
//! provider = "ollama"
//! host = "http://localhost:11434"
//! model = "llama3.2"
//! timeout_secs = 20
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default bound on a single AI request
pub const DEFAULT_AI_TIMEOUT: Duration = Duration::from_secs(20);

/// Which AI protocol to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiProvider {
    #[default]
    Ollama,
    /// Any server implementing `/v1/chat/completions`
    OpenAICompatible,
    /// In-process canned responses (development and tests)
    Mock,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAICompatible => "openai_compatible",
            Self::Mock => "mock",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::Ollama => "llama3.2",
            Self::OpenAICompatible => "gpt-3.5-turbo",
            Self::Mock => "mock",
        }
    }
}

impl std::str::FromStr for AiProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                Ok(Self::OpenAICompatible)
            }
            "mock" => Ok(Self::Mock),
            other => Err(Error::Config(format!("Unknown AI provider: {}", other))),
        }
    }
}

/// Resolved AI configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub provider: AiProvider,
    /// Server URL; `None` disables the network backends
    pub host: Option<String>,
    /// Model name; `None` uses the provider default
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            host: None,
            model: None,
            api_key: None,
            timeout: DEFAULT_AI_TIMEOUT,
        }
    }
}

impl AiConfig {
    /// Configuration with every AI feature turned off (fallbacks only)
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Configuration for the in-process mock backend
    pub fn mock() -> Self {
        Self {
            provider: AiProvider::Mock,
            ..Self::default()
        }
    }

    /// Whether a backend can be built from this configuration
    pub fn is_enabled(&self) -> bool {
        self.provider == AiProvider::Mock || self.host.is_some()
    }

    /// Model to request, falling back to the provider default
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Load configuration: file (if any) then environment
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => Self::from_file(&default_path)?,
                _ => Self::default(),
            },
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading AI config");
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML configuration content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();
        if let Some(ai) = raw.ai {
            if let Some(provider) = ai.provider {
                config.provider = provider.parse()?;
            }
            config.host = ai.host.map(normalize_host).filter(|h| !h.is_empty());
            config.model = ai.model.filter(|m| !m.trim().is_empty());
            config.api_key = ai.api_key.filter(|k| !k.is_empty());
            if let Some(secs) = ai.timeout_secs {
                config.timeout = timeout_from_secs(secs)?;
            }
        }
        Ok(config)
    }

    /// Apply `TALLY_AI_*` overrides from a variable lookup
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get("TALLY_AI_PROVIDER") {
            self.provider = provider.parse()?;
        }
        if let Some(host) = get("TALLY_AI_HOST") {
            self.host = Some(normalize_host(host));
        }
        if let Some(model) = get("TALLY_AI_MODEL") {
            self.model = Some(model);
        }
        if let Some(key) = get("TALLY_AI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(secs) = get("TALLY_AI_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => self.timeout = timeout_from_secs(secs)?,
                Err(_) => warn!(value = %secs, "Ignoring invalid TALLY_AI_TIMEOUT_SECS"),
            }
        }
        Ok(self)
    }
}

fn normalize_host(host: String) -> String {
    host.trim().trim_end_matches('/').to_string()
}

fn timeout_from_secs(secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(Error::Config("timeout_secs must be greater than 0".into()));
    }
    Ok(Duration::from_secs(secs))
}

/// Tally's data directory (`~/.local/share/tally` on Linux)
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally"))
}

/// Default AI config location
pub fn default_config_path() -> Option<PathBuf> {
    data_dir().map(|d| d.join("config").join("ai.toml"))
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    ai: Option<RawAi>,
}

#[derive(Debug, Deserialize)]
struct RawAi {
    provider: Option<String>,
    host: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_is_disabled() {
        let config = AiConfig::default();
        assert!(!config.is_enabled());
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.model_name(), "llama3.2");
    }

    #[test]
    fn test_parse_toml() {
        let config = AiConfig::from_toml_str(
            r#"
[ai]
provider = "openai"
host = "http://localhost:8080/"
model = "llama-3.2-3b"
api_key = "secret"
timeout_secs = 5
"#,
        )
        .unwrap();

        assert_eq!(config.provider, AiProvider::OpenAICompatible);
        assert_eq!(config.host.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.model_name(), "llama-3.2-3b");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.is_enabled());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        assert_eq!(AiConfig::from_toml_str("").unwrap(), AiConfig::default());
    }

    #[test]
    fn test_invalid_toml_values() {
        assert!(matches!(
            AiConfig::from_toml_str("[ai]\nprovider = \"skynet\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AiConfig::from_toml_str("[ai]\ntimeout_secs = 0"),
            Err(Error::Config(_))
        ));
        assert!(AiConfig::from_toml_str("[ai\n").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let config = AiConfig::from_toml_str("[ai]\nhost = \"http://file:11434\"\nmodel = \"a\"")
            .unwrap()
            .with_env_overrides(env(&[
                ("TALLY_AI_MODEL", "b"),
                ("TALLY_AI_TIMEOUT_SECS", "3"),
                ("TALLY_AI_API_KEY", ""),
            ]))
            .unwrap();

        assert_eq!(config.host.as_deref(), Some("http://file:11434"));
        assert_eq!(config.model_name(), "b");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_env_invalid_timeout_is_ignored() {
        let config = AiConfig::default()
            .with_env_overrides(env(&[("TALLY_AI_TIMEOUT_SECS", "soon")]))
            .unwrap();
        assert_eq!(config.timeout, DEFAULT_AI_TIMEOUT);
    }

    #[test]
    fn test_mock_is_enabled_without_host() {
        let config = AiConfig::default()
            .with_env_overrides(env(&[("TALLY_AI_PROVIDER", "mock")]))
            .unwrap();
        assert!(config.is_enabled());
        assert_eq!(config.model_name(), "mock");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai.toml");
        fs::write(&path, "[ai]\nprovider = \"mock\"\n").unwrap();

        let config = AiConfig::from_file(&path).unwrap();
        assert_eq!(config.provider, AiProvider::Mock);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(AiConfig::from_file(&missing), Err(Error::Config(_))));
    }
}
