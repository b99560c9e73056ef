use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::content::Strictness;

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values fail start-up.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the `{book}/{class}/{chapter}/` tree.
    pub content_root: PathBuf,
    /// URL prefix of image links. A path prefix (`/static`) is also where
    /// `content_root` gets mounted; an absolute URL means images live elsewhere.
    pub static_url_prefix: String,
    pub placeholder_image_url: String,
    pub strictness: Strictness,
    pub page_size: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let page_size: usize = parse_env("PAGE_SIZE", "10")?;
        if page_size == 0 {
            bail!("PAGE_SIZE must be greater than zero");
        }

        let static_url_prefix = env_or("STATIC_URL_PREFIX", "/static")
            .trim_end_matches('/')
            .to_string();
        if static_url_prefix.is_empty() {
            bail!("STATIC_URL_PREFIX must not be the site root");
        }

        Ok(Config {
            content_root: PathBuf::from(env_or("CONTENT_ROOT", "static")),
            static_url_prefix,
            placeholder_image_url: env_or("PLACEHOLDER_IMAGE_URL", "/static/placeholder.png"),
            strictness: parse_env("RESOLUTION_STRICTNESS", "strict")?,
            page_size,
            port: parse_env("PORT", "3000")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env_or(key, default);
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
}
