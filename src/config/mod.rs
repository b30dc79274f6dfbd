use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub links: LinksConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            pool_size: default_pool_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default = "default_session_days")]
    pub session_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_days: default_session_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinksConfig {
    /// Look up the destination page title when a link is created from the dialog.
    #[serde(default = "default_true")]
    pub title_lookup: bool,
    #[serde(default = "default_title_timeout_ms")]
    pub title_timeout_ms: u64,
    /// Prefix the percent-encoded target URL is appended to, e.g.
    /// `https://api.allorigins.win/raw?url=`. Empty means fetch directly.
    #[serde(default)]
    pub title_proxy: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            title_lookup: true,
            title_timeout_ms: default_title_timeout_ms(),
            title_proxy: String::new(),
        }
    }
}

impl LinksConfig {
    pub fn title_timeout(&self) -> Duration {
        Duration::from_millis(self.title_timeout_ms)
    }

    pub fn title_proxy(&self) -> Option<&str> {
        let proxy = self.title_proxy.trim();
        if proxy.is_empty() {
            None
        } else {
            Some(proxy)
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database_path() -> String {
    "./data/snip.db".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_session_days() -> i64 {
    7
}

fn default_true() -> bool {
    true
}

fn default_title_timeout_ms() -> u64 {
    2000
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Could not read config file '{}': {}. Run `snip init` to create one.",
                path.display(),
                e
            )
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 || self.database.pool_size > 64 {
            anyhow::bail!("database.pool_size must be between 1 and 64");
        }
        if self.auth.session_days < 1 || self.auth.session_days > 365 {
            anyhow::bail!("auth.session_days must be between 1 and 365");
        }
        if self.links.title_timeout_ms == 0 || self.links.title_timeout_ms > 30_000 {
            anyhow::bail!("links.title_timeout_ms must be between 1 and 30000");
        }
        if let Some(proxy) = self.links.title_proxy() {
            url::Url::parse(proxy).map_err(|e| {
                anyhow::anyhow!("links.title_proxy '{}' is not a valid URL: {}", proxy, e)
            })?;
        }
        Ok(())
    }
}
