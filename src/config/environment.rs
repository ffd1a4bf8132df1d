use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rust_env: String,
    pub api_host: String,
    pub api_port: u16,
    pub service_name: String,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub policy_bucket: String,
    pub policy_prefix: String,
    pub max_upload_bytes: usize,
    pub outbound_timeout_seconds: Option<u64>,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        load_dotenv_layers();

        Ok(Self {
            rust_env: read_optional_string("RUST_ENV", "development"),
            api_host: read_optional_string("API_HOST", "0.0.0.0"),
            api_port: read_optional_string("API_PORT", "5000")
                .parse::<u16>()
                .map_err(|e| format!("invalid API_PORT: {e}"))?,
            service_name: read_optional_string("SERVICE_NAME", "CampusAI Backend"),
            supabase_url: read_optional_env("SUPABASE_URL"),
            supabase_key: read_optional_env("SUPABASE_KEY"),
            gemini_api_key: read_optional_env("GEMINI_API_KEY"),
            gemini_model: read_optional_string("GEMINI_MODEL", "gemini-1.5-flash"),
            gemini_base_url: read_optional_string(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            policy_bucket: read_optional_string("POLICY_BUCKET", "policies"),
            policy_prefix: read_optional_string("POLICY_PREFIX", "policies"),
            max_upload_bytes: read_optional_usize("MAX_UPLOAD_BYTES", 25 * 1024 * 1024)?,
            outbound_timeout_seconds: read_optional_u64("OUTBOUND_TIMEOUT_SECONDS")?,
            cors_allowed_origins: read_optional_list("CORS_ALLOWED_ORIGINS"),
        })
    }
}

fn read_optional_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn read_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn read_optional_usize(key: &str, default: usize) -> Result<usize, String> {
    match env::var(key) {
        Ok(v) => v.parse::<usize>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_u64(key: &str) -> Result<Option<u64>, String> {
    match read_optional_env(key) {
        Some(v) => v
            .parse::<u64>()
            .map(Some)
            .map_err(|e| format!("invalid {key}: {e}")),
        None => Ok(None),
    }
}

fn read_optional_list(key: &str) -> Vec<String> {
    read_optional_env(key)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn load_dotenv_layers() {
    for path in [".env", "../.env", "../../.env"] {
        let _ = dotenvy::from_path(path);
    }
}
