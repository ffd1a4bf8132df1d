use super::environment::AppConfig;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
    pub bucket: String,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct HttpClientConfig {
    pub timeout: Option<Duration>,
}

impl SupabaseConfig {
    pub fn from_app(config: &AppConfig) -> Result<Self, String> {
        let url = config
            .supabase_url
            .clone()
            .ok_or_else(|| "missing required env var: SUPABASE_URL".to_string())?;
        let key = config
            .supabase_key
            .clone()
            .ok_or_else(|| "missing required env var: SUPABASE_KEY".to_string())?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            key,
            bucket: config.policy_bucket.clone(),
        })
    }
}

impl GeminiConfig {
    pub fn from_app(config: &AppConfig) -> Result<Self, String> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or_else(|| "missing required env var: GEMINI_API_KEY".to_string())?;
        Ok(Self {
            api_key,
            model: config.gemini_model.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl HttpClientConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            timeout: config
                .outbound_timeout_seconds
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}
