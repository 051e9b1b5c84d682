use anyhow::{Context, Result};

use crate::llm_client::PreferredModel;

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Application configuration loaded from environment variables.
/// The Gemini credential is optional: sessions may supply their own.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_base: String,
    pub gemini_api_key: Option<String>,
    pub default_model: PreferredModel,
    pub port: u16,
    pub rust_log: String,
    /// Sessions untouched for this long are evicted.
    pub session_idle_minutes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let default_model = match optional_env("DEFAULT_MODEL") {
            Some(raw) => raw
                .parse::<PreferredModel>()
                .with_context(|| format!("DEFAULT_MODEL '{raw}' is not a supported model"))?,
            None => PreferredModel::default(),
        };

        Ok(Config {
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            default_model,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            session_idle_minutes: optional_env("SESSION_IDLE_MINUTES")
                .unwrap_or_else(|| "60".to_string())
                .parse::<u64>()
                .context("SESSION_IDLE_MINUTES must be a whole number of minutes")?,
        })
    }
}

/// Reads an env var, treating unset and blank values alike.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
