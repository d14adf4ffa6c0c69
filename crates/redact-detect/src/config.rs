//! Detection service settings.

use serde::{Deserialize, Serialize};

/// Environment variable holding the service credential.
pub const API_KEY_VAR: &str = "REDACT_API_KEY";
/// Optional endpoint override.
pub const API_URL_VAR: &str = "REDACT_API_URL";
/// Optional model override.
pub const MODEL_VAR: &str = "REDACT_MODEL";

/// Where and how to call the vision model.
///
/// The API key is never serialized back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Chat-completions endpoint.
    pub endpoint: String,
    pub model: String,
    /// Kept low so the model sticks to the output format.
    pub temperature: f64,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Transport timeout. `None` leaves it to the HTTP client's default.
    pub timeout_secs: Option<u64>,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.modelscope.cn/v1/chat/completions".to_string(),
            model: "Qwen/Qwen2.5-VL-72B-Instruct".to_string(),
            temperature: 0.05,
            api_key: None,
            timeout_secs: None,
        }
    }
}

impl DetectConfig {
    /// Defaults, overridden by `REDACT_API_KEY`, `REDACT_API_URL` and
    /// `REDACT_MODEL` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        config.api_key = get(API_KEY_VAR);
        if let Some(url) = get(API_URL_VAR) {
            config.endpoint = url;
        }
        if let Some(model) = get(MODEL_VAR) {
            config.model = model;
        }
        config
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}
