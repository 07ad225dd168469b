use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// 接続先の環境変数（設定ファイルより優先）
pub const BASE_URL_ENV: &str = "CATALOG_BASE_URL";

const CONFIG_DIR: &str = "catalog-client";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default_config()
        };

        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if url.trim().is_empty() {
                warn!("{BASE_URL_ENV} is empty, keeping {}", config.base_url);
            } else {
                info!("{BASE_URL_ENV} set, using {url}");
                config.base_url = url;
            }
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ClientError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join(CONFIG_DIR))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// トークンとテーマの永続化先
    pub fn storage_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("storage.json"))
    }

    fn default_config() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            timeout_seconds: 30,
        }
    }

    pub fn set_base_url(&mut self, url: String) -> Result<()> {
        self.base_url = normalize_base_url(&url)?;
        self.save()
    }
}

/// 末尾の `/` を落とし、http(s) URL であることを確認する
pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ClientError::Config(format!("invalid base URL {trimmed:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::Config(format!(
            "base URL must be http or https: {trimmed}"
        )));
    }
    Ok(trimmed.to_string())
}
