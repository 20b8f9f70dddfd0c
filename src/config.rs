use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    /// Absent key routes question generation and scoring to the
    /// static/rule-based paths.
    pub google_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    /// When set, sessions and candidates persist to this JSON file;
    /// otherwise everything lives in memory.
    pub data_file: Option<PathBuf>,
    pub uploads_dir: PathBuf,
    pub public_rps: u32,
    pub ai_timeout_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "127.0.0.1:5174"),
            google_api_key: env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_base_url: get_env_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            gemini_model: get_env_or("GEMINI_MODEL", "gemini-2.5-flash"),
            data_file: env::var("DATA_FILE").ok().map(PathBuf::from),
            uploads_dir: PathBuf::from(get_env_or("UPLOADS_DIR", "uploads")),
            public_rps: get_env_parse_or("PUBLIC_RPS", 50)?,
            ai_timeout_secs: get_env_parse_or("AI_TIMEOUT_SECS", 30)?,
        })
    }
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
