//! Environment-sourced configuration, loaded once at startup.

use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub chat: ChatConfig,
}

/// Settings for the external completion service. The API key is a secret and
/// must come from the environment, never from source.
#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

const DEFAULT_CHAT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_CHAT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 10;

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT is not a valid port number")?;

        let chat = ChatConfig {
            api_key: std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?,
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_CHAT_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("CHAT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_CHAT_TIMEOUT_SECS),
            ),
        };

        Ok(Self {
            database_url,
            port,
            chat,
        })
    }
}
