use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Upload and prompt size limits.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Max files per individual analysis.
    pub max_cvs: usize,
    /// Max files per comparison analysis.
    pub max_cvs_compare: usize,
    /// Max extracted characters sent to the LLM for a single CV.
    pub max_chars_per_cv: usize,
    /// Max multipart body size accepted by `/analyze`.
    pub max_upload_bytes: usize,
}

impl Limits {
    /// Combined character budget for a comparison prompt.
    pub fn max_chars_combined(&self) -> usize {
        self.max_cvs_compare * self.max_chars_per_cv
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_cvs: 5,
            max_cvs_compare: 5,
            max_chars_per_cv: 10_000,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if no OpenAI API key can be found.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_fallback_model: String,
    /// Root of the per-user namespace; `users.json` lives here too.
    pub data_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub session_ttl_hours: i64,
    pub password_hash_iterations: u32,
    pub limits: Limits,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Limits::default();
        let limits = Limits {
            max_cvs: parse_env("MAX_CVS", defaults.max_cvs)?,
            max_cvs_compare: parse_env("MAX_CVS_COMPARE", defaults.max_cvs_compare)?,
            max_chars_per_cv: parse_env("MAX_CHARS_PER_CV", defaults.max_chars_per_cv)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        };

        Ok(Config {
            openai_api_key: load_api_key()?,
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            openai_model: env_or("OPENAI_MODEL", "gpt-4o-mini"),
            openai_fallback_model: env_or("OPENAI_FALLBACK_MODEL", "gpt-3.5-turbo"),
            data_dir: PathBuf::from(env_or("DATA_DIR", "users")),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
            session_ttl_hours: parse_env("SESSION_TTL_HOURS", 12)?,
            password_hash_iterations: parse_env("PASSWORD_HASH_ITERATIONS", 600_000)?,
            limits,
        })
    }

    /// Path of the flat-file user database.
    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }
}

/// The key comes from `OPENAI_API_KEY`, else from the key file
/// (`OPENAI_API_KEY_FILE`, default `chatgpt-api-key.txt`).
fn load_api_key() -> Result<String> {
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        if !key.trim().is_empty() {
            return Ok(key.trim().to_string());
        }
    }

    let key_file = env_or("OPENAI_API_KEY_FILE", "chatgpt-api-key.txt");
    let key = std::fs::read_to_string(&key_file).with_context(|| {
        format!("OPENAI_API_KEY is not set and the key file '{key_file}' could not be read")
    })?;
    let key = key.trim();
    if key.is_empty() {
        bail!("API key file '{key_file}' is empty");
    }
    Ok(key.to_string())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_cvs, 5);
        assert_eq!(limits.max_cvs_compare, 5);
        assert_eq!(limits.max_chars_per_cv, 10_000);
        assert_eq!(limits.max_chars_combined(), 50_000);
    }

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: u16 = parse_env("CVRANK_TEST_UNSET_PORT_VARIABLE", 4242).unwrap();
        assert_eq!(value, 4242);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("CVRANK_TEST_BAD_NUMBER", "twelve");
        let result: Result<u32> = parse_env("CVRANK_TEST_BAD_NUMBER", 1);
        assert!(result.is_err());
        std::env::remove_var("CVRANK_TEST_BAD_NUMBER");
    }
}
