use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MemoriaConfig {
    pub backend: BackendConfig,
    pub log: LogConfig,
    pub pull: PullConfig,
    pub storage: StorageConfig,
}

/// Hosted backend coordinates. An empty `url` or `anon_key` means "not configured".
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub bucket: String,
    pub brains_table: String,
    pub credentials_table: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

/// Where `memoria pull` places downloaded brains and conversation files.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PullConfig {
    pub brain_dir: String,
    pub conversations_dir: String,
    pub resume_command: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub credentials_path: String,
}

impl Default for MemoriaConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            log: LogConfig::default(),
            pull: PullConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            bucket: "brain-files".into(),
            brains_table: "brains".into(),
            credentials_table: "sync_credentials".into(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            brain_dir: "~/.gemini/antigravity/brain".into(),
            conversations_dir: "~/.gemini/antigravity/conversations".into(),
            resume_command: "gemini --resume".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let credentials_path = default_memoria_dir()
            .join("credentials.toml")
            .to_string_lossy()
            .into_owned();
        Self { credentials_path }
    }
}

impl BackendConfig {
    /// True when both the project URL and the anon key are set.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }
}

/// Returns `~/.memoria/`
pub fn default_memoria_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memoria")
}

/// Returns the default config file path: `~/.memoria/config.toml`
pub fn default_config_path() -> PathBuf {
    default_memoria_dir().join("config.toml")
}

impl MemoriaConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MemoriaConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (MEMORIA_SUPABASE_URL,
    /// MEMORIA_SUPABASE_ANON_KEY, MEMORIA_LOG_LEVEL, MEMORIA_CREDENTIALS).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MEMORIA_SUPABASE_URL") {
            self.backend.url = val;
        }
        if let Ok(val) = std::env::var("MEMORIA_SUPABASE_ANON_KEY") {
            self.backend.anon_key = val;
        }
        if let Ok(val) = std::env::var("MEMORIA_LOG_LEVEL") {
            self.log.level = val;
        }
        if let Ok(val) = std::env::var("MEMORIA_CREDENTIALS") {
            self.storage.credentials_path = val;
        }
    }

    pub fn resolved_credentials_path(&self) -> PathBuf {
        expand_tilde(&self.storage.credentials_path)
    }

    pub fn resolved_brain_dir(&self) -> PathBuf {
        expand_tilde(&self.pull.brain_dir)
    }

    pub fn resolved_conversations_dir(&self) -> PathBuf {
        expand_tilde(&self.pull.conversations_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
