//! Runtime configuration from the environment.
//!
//! A `.env` file in the working directory is loaded first if present.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_DB_PATH: &str = ".ainotes_db";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    /// Shared login password. Authentication is off when unset.
    pub password: Option<String>,
    pub generation: GenerationConfig,
    /// Render diagrams to SVG before serving pages instead of in the browser.
    pub server_hydration: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Missing .env is the normal case.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = non_empty("AINOTES_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse()
            .map_err(|e| Error::Config(format!("AINOTES_BIND={:?}: {}", bind_raw, e)))?;

        let timeout_secs = match non_empty("OPENAI_TIMEOUT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| Error::Config(format!("OPENAI_TIMEOUT={:?}: {}", raw, e)))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let server_hydration = match non_empty("AINOTES_SERVER_HYDRATION") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                Error::Config(format!("AINOTES_SERVER_HYDRATION={:?} is not a boolean", raw))
            })?,
            None => true,
        };

        Ok(Self {
            bind,
            db_path: PathBuf::from(non_empty("AINOTES_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string())),
            password: lookup("AINOTES_PASSWORD").filter(|p| !p.is_empty()),
            generation: GenerationConfig {
                base_url: non_empty("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
                api_key: non_empty("OPENAI_API_KEY"),
                model: non_empty("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                timeout_secs,
            },
            server_hydration,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
