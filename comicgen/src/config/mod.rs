use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::ComicError;

pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_IMAGEN_MODEL: &str = "imagen-4.0-generate-001";
const DEFAULT_OPENAI_MODEL: &str = "gpt-image-1";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct ComicConfig {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_model: String,
    pub imagen_model: String,
    pub openai_model: String,
    pub gemini_api_base: String,
    pub openai_api_base: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct KeyStatus {
    pub openai: bool,
    pub gemini: bool,
}

impl Default for ComicConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            openai_api_key: None,
            gemini_model: String::from(DEFAULT_GEMINI_MODEL),
            imagen_model: String::from(DEFAULT_IMAGEN_MODEL),
            openai_model: String::from(DEFAULT_OPENAI_MODEL),
            gemini_api_base: String::from(DEFAULT_GEMINI_API_BASE),
            openai_api_base: String::from(DEFAULT_OPENAI_API_BASE),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ComicConfig {
    /// Loads `.env` (when present) and then reads the process environment.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("ignoring unreadable .env file: {e}"),
        }
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let defaults = Self::default();

        let request_timeout = match get("COMICGEN_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!("COMICGEN_TIMEOUT_SECS={raw} is not a positive integer; using {DEFAULT_TIMEOUT_SECS}");
                    defaults.request_timeout
                }
            },
            None => defaults.request_timeout,
        };

        Self {
            gemini_api_key: get(GEMINI_API_KEY),
            openai_api_key: get(OPENAI_API_KEY),
            gemini_model: get("COMICGEN_GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            imagen_model: get("COMICGEN_IMAGEN_MODEL").unwrap_or(defaults.imagen_model),
            openai_model: get("COMICGEN_OPENAI_MODEL").unwrap_or(defaults.openai_model),
            gemini_api_base: get("GEMINI_API_BASE")
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini_api_base),
            openai_api_base: get("OPENAI_API_BASE")
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_api_base),
            request_timeout,
        }
    }

    pub fn key_status(&self) -> KeyStatus {
        KeyStatus {
            openai: self.openai_api_key.is_some(),
            gemini: self.gemini_api_key.is_some(),
        }
    }

    pub fn http_client(&self) -> Result<reqwest::Client, ComicError> {
        let client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?;
        Ok(client)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = ComicConfig::from_vars(HashMap::new());
        assert_eq!(cfg.gemini_model, "gemini-2.0-flash");
        assert_eq!(cfg.imagen_model, "imagen-4.0-generate-001");
        assert_eq!(cfg.openai_model, "gpt-image-1");
        assert_eq!(cfg.request_timeout, Duration::from_secs(300));
        assert_eq!(
            cfg.key_status(),
            KeyStatus {
                openai: false,
                gemini: false
            }
        );
    }

    #[test]
    fn blank_keys_count_as_missing() {
        let cfg = ComicConfig::from_vars(vars(&[
            ("GEMINI_API_KEY", "   "),
            ("OPENAI_API_KEY", "sk-test"),
        ]));
        assert_eq!(
            cfg.key_status(),
            KeyStatus {
                openai: true,
                gemini: false
            }
        );
    }

    #[test]
    fn overrides_and_trailing_slash() {
        let cfg = ComicConfig::from_vars(vars(&[
            ("GEMINI_API_BASE", "http://localhost:9000/v1beta/"),
            ("COMICGEN_GEMINI_MODEL", "gemini-2.5-pro"),
            ("COMICGEN_TIMEOUT_SECS", "42"),
        ]));
        assert_eq!(cfg.gemini_api_base, "http://localhost:9000/v1beta");
        assert_eq!(cfg.gemini_model, "gemini-2.5-pro");
        assert_eq!(cfg.request_timeout, Duration::from_secs(42));
    }

    #[test]
    fn bad_timeout_falls_back_to_default() {
        let cfg = ComicConfig::from_vars(vars(&[("COMICGEN_TIMEOUT_SECS", "soon")]));
        assert_eq!(cfg.request_timeout, Duration::from_secs(300));
    }
}
