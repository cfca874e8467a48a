// Configuration read once from the environment at startup

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.gapgpt.app/v1";
pub const DEFAULT_CHAT_MODEL: &str = "grok-3-mini";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_GEMINI_TEXT_MODEL: &str = "gemini-2.5-flash";

// Time a handler gets past `llm_timeout` to turn a provider timeout into its response
const HANDLER_GRACE_SECS: u64 = 5;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub llm_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub frontend_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            llm_timeout_secs: 120,
            request_timeout_secs: 60,
            cors_allowed_origins: None,
            frontend_dir: PathBuf::from("frontend"),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);

        let llm_timeout_secs = lookup("LLM_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.llm_timeout_secs);

        let request_timeout_secs = lookup("REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        let frontend_dir = lookup("FRONTEND_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.frontend_dir);

        Self {
            port,
            llm_timeout_secs,
            request_timeout_secs,
            cors_allowed_origins,
            frontend_dir,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    /// Outer bound applied by the router. Kept above `llm_timeout` so a slow
    /// provider is reported by the handler, not cut off with a bare 408.
    pub fn router_timeout(&self) -> Duration {
        self.request_timeout()
            .max(self.llm_timeout() + Duration::from_secs(HANDLER_GRACE_SECS))
    }
}

/// Credentials and model names for the two AI providers.
#[derive(Clone)]
pub struct ProviderConfig {
    pub chat_api_key: Option<String>,
    pub chat_base_url: String,
    pub chat_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_tts_model: String,
    pub gemini_text_model: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<set>").unwrap_or("<unset>");
        f.debug_struct("ProviderConfig")
            .field("chat_api_key", &redact(&self.chat_api_key))
            .field("chat_base_url", &self.chat_base_url)
            .field("chat_model", &self.chat_model)
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_tts_model", &self.gemini_tts_model)
            .field("gemini_text_model", &self.gemini_text_model)
            .finish()
    }
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or_default = |key: &str, default: &str| non_empty(key).unwrap_or_else(|| default.to_string());

        Self {
            chat_api_key: non_empty("GAPGPT_API_KEY"),
            chat_base_url: or_default("GAPGPT_BASE_URL", DEFAULT_CHAT_BASE_URL),
            chat_model: or_default("CHAT_MODEL", DEFAULT_CHAT_MODEL),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_base_url: or_default("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            gemini_tts_model: or_default("GEMINI_TTS_MODEL", DEFAULT_GEMINI_TTS_MODEL),
            gemini_text_model: or_default("GEMINI_TEXT_MODEL", DEFAULT_GEMINI_TEXT_MODEL),
        }
    }
}
