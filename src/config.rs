/// Startup configuration
///
/// Read once from the process environment (optionally seeded from a `.env`
/// file). A missing API credential is fatal: the app refuses to start rather
/// than make unauthenticated calls.
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Used until the first window resize event arrives
pub const DEFAULT_CANVAS_WIDTH: f32 = 800.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API key not set (export GEMINI_API_KEY or API_KEY)")]
    MissingApiKey,
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub image_model: String,
    pub text_model: String,
    pub request_timeout: Duration,
    pub default_canvas_width: f32,
}

impl AppConfig {
    /// Load from the real environment, honouring a `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env is normal
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("GEMINI_API_KEY")
            .or_else(|| get("API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        let request_timeout = match get("NANO_BANANA_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "NANO_BANANA_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_key,
            api_base_url: get("NANO_BANANA_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            image_model: get("NANO_BANANA_IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            text_model: get("NANO_BANANA_TEXT_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            request_timeout,
            default_canvas_width: DEFAULT_CANVAS_WIDTH,
        })
    }
}

// Never print the credential
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_base_url", &self.api_base_url)
            .field("image_model", &self.image_model)
            .field("text_model", &self.text_model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
