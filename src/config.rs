//! Configuration management
//!
//! Settings come from an optional TOML file, then environment variables
//! (falling back to a `.env` file) override individual fields. The result is loaded once at startup and
//! passed down explicitly.

use crate::llm::openai::DEFAULT_API_BASE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_PROMPT_PATH: &str = "prompts/system.txt";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const ENV_FILE: &str = ".env";

/// Proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Key for the completion API (OPENAI_API_KEY)
    pub openai_api_key: Option<String>,
    /// Port to listen on (PORT)
    pub port: u16,
    /// Model identifier sent with every request (OPENAI_MODEL)
    pub model: String,
    /// Base URL of the completion API (OPENAI_BASE_URL)
    pub api_base_url: String,
    /// Path to the system prompt file (SYSTEM_PROMPT_PATH)
    pub system_prompt_path: PathBuf,
    /// Timeout for the outbound completion call (REQUEST_TIMEOUT_SECS)
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            system_prompt_path: PathBuf::from(DEFAULT_PROMPT_PATH),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load from an optional TOML file, then apply the process environment
    /// and `./.env`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env_file(path, Path::new(ENV_FILE))
    }

    /// Like [`Config::load`] with an explicit dotenv file. Variables already
    /// set in the process environment win over the file; a missing file is fine.
    pub fn load_with_env_file(path: Option<&Path>, env_file: &Path) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let dotenv = read_env_file(env_file)?;
        base.with_env(|key| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned()))
    }

    /// Parse a TOML config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Override fields from environment-style lookups. Empty values are ignored.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(port) = var("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", port))?;
        }
        if let Some(model) = var("OPENAI_MODEL") {
            self.model = model;
        }
        if let Some(url) = var("OPENAI_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(path) = var("SYSTEM_PROMPT_PATH") {
            self.system_prompt_path = PathBuf::from(path);
        }
        if let Some(secs) = var("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("REQUEST_TIMEOUT_SECS is not a number: {}", secs))?;
        }

        Ok(self)
    }

    /// The API key, if one is configured and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Address the server binds to
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Key shown in diagnostics: only the last four characters survive.
    pub fn redacted_api_key(&self) -> String {
        match self.api_key() {
            Some(key) if key.chars().count() > 8 => {
                let tail: String = key.chars().skip(key.chars().count() - 4).collect();
                format!("****{}", tail)
            }
            Some(_) => "****".to_string(),
            None => "(not set)".to_string(),
        }
    }
}

/// Parse a dotenv file into a map without touching the process environment.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to read env file {}", path.display()))?
        .collect::<std::result::Result<HashMap<_, _>, _>>()
        .with_context(|| format!("Failed to parse env file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 4000);
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.api_key(), None);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_env(env(&[
                ("OPENAI_API_KEY", "sk-abc"),
                ("PORT", "8080"),
                ("OPENAI_MODEL", "gpt-4o-mini"),
                ("REQUEST_TIMEOUT_SECS", "5"),
            ]))
            .unwrap();
        assert_eq!(config.api_key(), Some("sk-abc"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = Config::default()
            .with_env(env(&[("OPENAI_API_KEY", ""), ("PORT", "")]))
            .unwrap();
        assert_eq!(config.api_key(), None);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let result = Config::default().with_env(env(&[("PORT", "not-a-port")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_key_in_file_counts_as_missing() {
        let config = Config {
            openai_api_key: Some(String::new()),
            ..Config::default()
        };
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_partial_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("proxy.toml");
        std::fs::write(&path, "port = 9000\nmodel = \"gpt-4o\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.system_prompt_path, PathBuf::from(DEFAULT_PROMPT_PATH));
    }

    #[test]
    fn test_env_wins_over_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("proxy.toml");
        std::fs::write(&path, "openai_api_key = \"from-file\"\nport = 9000\n").unwrap();

        let config = Config::from_file(&path)
            .unwrap()
            .with_env(env(&[("OPENAI_API_KEY", "from-env")]))
            .unwrap();
        assert_eq!(config.api_key(), Some("from-env"));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_env_file_supplies_missing_variables() {
        let dir = tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(
            &env_file,
            "# local settings\nCHAT_PROXY_UNUSED=1\nSYSTEM_PROMPT_PATH=/srv/prompts/dotenv.txt\n",
        )
        .unwrap();

        let config = Config::load_with_env_file(None, &env_file).unwrap();
        assert_eq!(config.system_prompt_path, PathBuf::from("/srv/prompts/dotenv.txt"));
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let dir = tempdir().unwrap();
        assert!(Config::load_with_env_file(None, &dir.path().join(".env")).is_ok());
    }

    #[test]
    fn test_malformed_env_file_is_an_error() {
        let dir = tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, "NOT A VALID LINE\n").unwrap();

        assert!(Config::load_with_env_file(None, &env_file).is_err());
    }

    #[test]
    fn test_redacted_api_key() {
        let mut config = Config::default();
        assert_eq!(config.redacted_api_key(), "(not set)");

        config.openai_api_key = Some("sk-1234567890abcd".to_string());
        assert_eq!(config.redacted_api_key(), "****abcd");

        config.openai_api_key = Some("short".to_string());
        assert_eq!(config.redacted_api_key(), "****");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
