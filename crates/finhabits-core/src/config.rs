//! Application configuration
//!
//! Resolution happens in three layers, later layers winning:
//! 1. Built-in defaults
//! 2. A TOML file (`--config`, then `FINHABITS_CONFIG`, then
//!    `~/.config/finhabits/config.toml`)
//! 3. Environment variables
//!
//! ```toml
//! [database]
//! path = "finhabits.db"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! allowed_origins = ["http://localhost:5173"]
//! session_ttl_hours = 168
//!
//! [ai]
//! backend = "gemini"
//! model = "gemini-2.5-flash"
//! ```
//!
//! Only the binary calls [`AppConfig::load`]; libraries receive the
//! resolved structs.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub const CONFIG_PATH_ENV: &str = "FINHABITS_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerSettings,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("finhabits.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
    /// Empty means same-origin only
    pub allowed_origins: Vec<String>,
    pub session_ttl_hours: i64,
    /// Mark the session cookie `Secure` (set when served over HTTPS)
    pub secure_cookies: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: None,
            allowed_origins: Vec::new(),
            session_ttl_hours: 24 * 7,
            secure_cookies: false,
        }
    }
}

/// Which AI service answers insight and chat requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiBackendKind {
    #[default]
    Gemini,
    #[serde(alias = "openai", alias = "vllm", alias = "localai", alias = "llamacpp")]
    OpenaiCompatible,
    Mock,
    /// AI features disabled
    None,
}

impl FromStr for AiBackendKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                Ok(Self::OpenaiCompatible)
            }
            "mock" => Ok(Self::Mock),
            "none" | "off" | "disabled" => Ok(Self::None),
            other => Err(Error::Config(format!("Unknown AI backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub backend: AiBackendKind,
    /// Base URL; each backend has its own default
    pub host: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

impl AppConfig {
    /// Load from file and process environment
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit_path, |key| std::env::var(key).ok())
    }

    /// Load using `env` in place of the process environment
    pub fn load_with<F>(explicit_path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match resolve_path(explicit_path, &env) {
            Some((path, required)) => {
                if path.exists() {
                    debug!(path = %path.display(), "Loading config file");
                    Self::from_file(&path)?
                } else if required {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                } else {
                    Self::default()
                }
            }
            None => Self::default(),
        };

        config.apply_env_overrides(&env)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env_overrides<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = env("FINHABITS_DB") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(host) = env("FINHABITS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env("FINHABITS_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid FINHABITS_PORT: {}", port)))?;
        }

        if let Some(backend) = env("FINHABITS_AI_BACKEND") {
            self.ai.backend = backend.parse()?;
        }

        match self.ai.backend {
            AiBackendKind::Gemini => {
                if let Some(key) = env("GEMINI_API_KEY") {
                    self.ai.api_key = Some(key);
                }
            }
            AiBackendKind::OpenaiCompatible => {
                if let Some(host) = env("OPENAI_COMPATIBLE_HOST") {
                    self.ai.host = Some(host);
                }
                if let Some(model) = env("OPENAI_COMPATIBLE_MODEL") {
                    self.ai.model = Some(model);
                }
                if let Some(key) = env("OPENAI_COMPATIBLE_API_KEY") {
                    self.ai.api_key = Some(key);
                }
            }
            AiBackendKind::Mock | AiBackendKind::None => {}
        }

        // Generic overrides win over the backend-specific ones
        if let Some(host) = env("FINHABITS_AI_HOST") {
            self.ai.host = Some(host);
        }
        if let Some(model) = env("FINHABITS_AI_MODEL") {
            self.ai.model = Some(model);
        }

        Ok(())
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("finhabits").join("config.toml"))
}

/// Returns the path to read and whether it must exist
fn resolve_path<F>(explicit: Option<&Path>, env: &F) -> Option<(PathBuf, bool)>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit {
        return Some((path.to_path_buf(), true));
    }
    if let Some(path) = env(CONFIG_PATH_ENV) {
        return Some((PathBuf::from(path), true));
    }
    default_config_path().map(|p| (p, false))
}
