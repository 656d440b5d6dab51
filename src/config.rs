use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::mail::http::DEFAULT_API_BASE_URL;
use crate::store::debounce::DEFAULT_WINDOW;

pub const API_ENV_VAR: &str = "RS_INBOX_API";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub db_path: Option<String>,
    pub debounce_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Env override first, then the file, then the public mock API.
    pub fn api_base_url(&self) -> String {
        std::env::var(API_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_WINDOW)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(15))
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("rs_inbox"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn default_db_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("inbox.db");
    Ok(p)
}

/// Load the config file, writing a commented-out template on first run.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        fs::write(&path, template())?;
        log::info!("Created template config at {}", path.display());
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&path)?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

fn template() -> String {
    format!(
        "# rs_inbox configuration\n\
         # api_base_url = \"{DEFAULT_API_BASE_URL}\"\n\
         # db_path = \"/path/to/inbox.db\"\n\
         # debounce_ms = {}\n\
         # request_timeout_secs = 15\n",
        DEFAULT_WINDOW.as_millis()
    )
}

pub fn resolve_db_path(cfg: &Config) -> Result<PathBuf> {
    if let Some(p) = &cfg.db_path {
        Ok(PathBuf::from(p))
    } else {
        default_db_path()
    }
}
