use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::warn;

use crate::gemini::{DEFAULT_API_BASE, DEFAULT_IMAGE_MODEL};

const DEV_JWT_SECRET: &str = "dev-only-insecure-jwt-secret";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    /// `None` when unset or the `DEMO_KEY` placeholder.
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub gemini_model: String,
    pub ai_provider: String,
    pub storage_provider: String,
    pub local_upload_path: PathBuf,
    pub upload_base_url: String,
    pub max_images_per_request: usize,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match non_empty(&lookup, "PORT") {
            Some(raw) => raw.trim().parse::<u16>().with_context(|| format!("invalid PORT: {raw}"))?,
            None => 8080,
        };

        let jwt_secret = non_empty(&lookup, "JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET is not set, using an insecure development secret");
            DEV_JWT_SECRET.to_string()
        });

        let max_images_per_request = env_usize(&lookup, "MAX_IMAGES_PER_REQUEST", 4);
        if max_images_per_request == 0 {
            bail!("MAX_IMAGES_PER_REQUEST must be at least 1");
        }

        Ok(Self {
            port,
            jwt_secret,
            gemini_api_key: non_empty(&lookup, "GEMINI_API_KEY").filter(|key| key != "DEMO_KEY"),
            gemini_api_base: env_string(&lookup, "GEMINI_API_BASE", DEFAULT_API_BASE),
            gemini_model: env_string(&lookup, "GEMINI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            ai_provider: env_string(&lookup, "AI_PROVIDER", DEFAULT_IMAGE_MODEL).to_lowercase(),
            storage_provider: env_string(&lookup, "STORAGE_PROVIDER", "local").to_lowercase(),
            local_upload_path: PathBuf::from(env_string(&lookup, "LOCAL_UPLOAD_PATH", "./uploads")),
            upload_base_url: non_empty(&lookup, "UPLOAD_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{port}/api/uploads")),
            max_images_per_request,
            max_body_bytes: env_usize(&lookup, "MAX_BODY_BYTES", 25 * 1024 * 1024),
        })
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|value| !value.trim().is_empty())
}

fn env_string(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    non_empty(lookup, name).unwrap_or_else(|| default.to_string())
}

fn env_usize(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: usize) -> usize {
    lookup(name)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}
