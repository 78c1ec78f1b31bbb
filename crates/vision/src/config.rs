use std::time::Duration;

use trafficeye_core::error::CoreError;

/// Vision service configuration loaded from environment variables.
///
/// | Env Var               | Default                                      |
/// |-----------------------|----------------------------------------------|
/// | `GEMINI_API_KEY`      | required                                     |
/// | `GEMINI_MODEL`        | `gemini-1.5-flash`                           |
/// | `GEMINI_BASE_URL`     | `https://generativelanguage.googleapis.com`  |
/// | `GEMINI_TIMEOUT_SECS` | `30`                                         |
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl GeminiConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CoreError::Validation("GEMINI_API_KEY must be set".into()))?;

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs: u64 = match std::env::var("GEMINI_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                CoreError::Validation("GEMINI_TIMEOUT_SECS must be a valid u64".into())
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
