//! Application configuration loaded from the environment (and `.env`)

use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

use crate::advisory::Locale;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1/";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";
const ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const OPENAI_MODEL: &str = "gpt-4o-mini";

pub const ENV_LOCALE: &str = "HORMONE_LOCALE";
pub const ENV_PROVIDER: &str = "HORMONE_LLM_PROVIDER";
pub const ENV_MODEL: &str = "HORMONE_LLM_MODEL";
pub const ENV_BASE_URL: &str = "HORMONE_LLM_BASE_URL";
pub const ENV_ANTHROPIC_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_OPENAI_KEY: &str = "OPENAI_API_KEY";

/// ---------------------------------------------------------------------------
/// Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
  #[default]
  Anthropic,
  OpenAi,
}

impl LlmProvider {
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "anthropic" | "claude" => Some(LlmProvider::Anthropic),
      "openai" => Some(LlmProvider::OpenAi),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      LlmProvider::Anthropic => "anthropic",
      LlmProvider::OpenAi => "openai",
    }
  }

  /// Environment variable holding this provider's API key
  pub fn key_var(&self) -> &'static str {
    match self {
      LlmProvider::Anthropic => ENV_ANTHROPIC_KEY,
      LlmProvider::OpenAi => ENV_OPENAI_KEY,
    }
  }

  fn default_base(&self) -> &'static str {
    match self {
      LlmProvider::Anthropic => ANTHROPIC_API_BASE,
      LlmProvider::OpenAi => OPENAI_API_BASE,
    }
  }

  fn default_model(&self) -> &'static str {
    match self {
      LlmProvider::Anthropic => ANTHROPIC_MODEL,
      LlmProvider::OpenAi => OPENAI_MODEL,
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid {0}: {1}")]
  InvalidUrl(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
  pub provider: LlmProvider,
  pub api_key: Option<String>,
  pub model: String,
  /// Always ends with '/' so endpoint paths join onto it
  pub base_url: Url,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub locale: Locale,
  pub llm: LlmSettings,
}

/// ---------------------------------------------------------------------------
/// Loading
/// ---------------------------------------------------------------------------

fn non_empty_var(name: &str) -> Option<String> {
  env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
  let with_slash = if raw.ends_with('/') {
    raw.to_string()
  } else {
    format!("{}/", raw)
  };
  Url::parse(&with_slash).map_err(|e| ConfigError::InvalidUrl(ENV_BASE_URL, e.to_string()))
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let locale = match non_empty_var(ENV_LOCALE) {
      Some(raw) => Locale::parse(&raw).unwrap_or_else(|| {
        tracing::warn!(value = %raw, "unknown {}, using en", ENV_LOCALE);
        Locale::default()
      }),
      None => Locale::default(),
    };

    let provider = match non_empty_var(ENV_PROVIDER) {
      Some(raw) => LlmProvider::parse(&raw).unwrap_or_else(|| {
        tracing::warn!(value = %raw, "unknown {}, using anthropic", ENV_PROVIDER);
        LlmProvider::default()
      }),
      None => LlmProvider::default(),
    };

    // A bad override only affects advice, so fall back instead of failing startup
    let base_url = match non_empty_var(ENV_BASE_URL).map(|raw| parse_base_url(&raw)) {
      Some(Ok(url)) => url,
      Some(Err(e)) => {
        tracing::warn!(error = %e, "using default {} base url", provider.as_str());
        parse_base_url(provider.default_base())?
      }
      None => parse_base_url(provider.default_base())?,
    };

    let llm = LlmSettings {
      provider,
      api_key: non_empty_var(provider.key_var()),
      model: non_empty_var(ENV_MODEL).unwrap_or_else(|| provider.default_model().to_string()),
      base_url,
    };

    Ok(Self { locale, llm })
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
