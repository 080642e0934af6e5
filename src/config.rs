use std::env;

use once_cell::sync::Lazy;
use tracing::info;

/// The language models the pipelines may call, in the fixed order the
/// movie summary stage tries them. Selection is explicit per variant
/// rather than sniffed out of a model-name string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    Flash,
    Pro,
    FlashLite,
}

impl ModelChoice {
    pub const SUMMARY_CANDIDATES: [ModelChoice; 3] =
        [ModelChoice::Flash, ModelChoice::Pro, ModelChoice::FlashLite];

    pub fn model_id<'a>(&self, config: &'a Config) -> &'a str {
        match self {
            ModelChoice::Flash => &config.gemini_model,
            ModelChoice::Pro => &config.gemini_pro_model,
            ModelChoice::FlashLite => &config.gemini_lite_model,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelChoice::Flash => "flash",
            ModelChoice::Pro => "pro",
            ModelChoice::FlashLite => "flash-lite",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub gemini_api_key: String,
    pub gemini_api_url: String,
    pub gemini_model: String,
    pub gemini_pro_model: String,
    pub gemini_lite_model: String,
    pub gemini_temperature: f32,
    pub gemini_top_k: i32,
    pub gemini_top_p: f32,
    pub gemini_max_output_tokens: i32,
    pub qloo_api_key: String,
    pub qloo_api_url: String,
    pub qloo_location: String,
    pub request_timeout_seconds: u64,
    pub max_image_bytes: usize,
    pub fallback_rating_seed: Option<u64>,
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::load);

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_f32(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<f32>().ok())
        .unwrap_or(default)
}

fn env_i32(name: &str, default: i32) -> i32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<i32>().ok())
        .unwrap_or(default)
}

fn env_opt_u64(name: &str) -> Option<u64> {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
}

impl Config {
    pub fn load() -> Self {
        Config {
            host: env_string("HOST", "0.0.0.0"),
            port: env_u16("PORT", 8080),
            log_level: env_string("LOG_LEVEL", "info"),
            gemini_api_key: env_string("GEMINI_API_KEY", ""),
            gemini_api_url: env_string(
                "GEMINI_API_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            gemini_model: env_string("GEMINI_MODEL", "gemini-2.5-flash"),
            gemini_pro_model: env_string("GEMINI_PRO_MODEL", "gemini-2.5-pro"),
            gemini_lite_model: env_string("GEMINI_LITE_MODEL", "gemini-2.5-flash-lite"),
            gemini_temperature: env_f32("GEMINI_TEMPERATURE", 0.7),
            gemini_top_k: env_i32("GEMINI_TOP_K", 40),
            gemini_top_p: env_f32("GEMINI_TOP_P", 0.95),
            gemini_max_output_tokens: env_i32("GEMINI_MAX_OUTPUT_TOKENS", 2048),
            qloo_api_key: env_string("QLOO_API_KEY", ""),
            qloo_api_url: env_string("QLOO_API_URL", "https://hackathon.api.qloo.com"),
            qloo_location: env_string("QLOO_LOCATION", "New York City"),
            request_timeout_seconds: env_u64("REQUEST_TIMEOUT_SECONDS", 30),
            max_image_bytes: env_usize("MAX_IMAGE_BYTES", 10 * 1024 * 1024),
            fallback_rating_seed: env_opt_u64("FALLBACK_RATING_SEED"),
        }
    }

    pub fn has_gemini_credential(&self) -> bool {
        !self.gemini_api_key.trim().is_empty()
    }

    pub fn has_qloo_credential(&self) -> bool {
        !self.qloo_api_key.trim().is_empty()
    }

    pub fn log_startup_summary(&self) {
        info!(
            "Configuration: host={} port={} gemini_model={} gemini_pro_model={} gemini_lite_model={} gemini_key_set={} qloo_key_set={} qloo_location={} timeout_s={} max_image_bytes={} rating_seed={:?}",
            self.host,
            self.port,
            self.gemini_model,
            self.gemini_pro_model,
            self.gemini_lite_model,
            self.has_gemini_credential(),
            self.has_qloo_credential(),
            self.qloo_location,
            self.request_timeout_seconds,
            self.max_image_bytes,
            self.fallback_rating_seed,
        );
    }
}
