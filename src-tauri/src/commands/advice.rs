//! Tauri commands for optional LLM-written advice

use serde::Serialize;
use std::sync::Arc;
use tauri::State;

use crate::assessment::assess;
use crate::llm::{LlmClient, LlmError, Usage};
use crate::models::LabPanel;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AiAdvice {
  pub text: String,
  pub provider: String,
  pub model: String,
  pub usage: Usage,
}

#[derive(Debug, Serialize)]
pub struct LlmStatus {
  pub configured: bool,
  pub provider: String,
  pub model: String,
}

#[tauri::command]
pub async fn get_llm_status(state: State<'_, Arc<AppState>>) -> Result<LlmStatus, String> {
  let llm = &state.config.llm;
  Ok(LlmStatus {
    configured: llm.api_key.is_some(),
    provider: llm.provider.as_str().to_string(),
    model: llm.model.clone(),
  })
}

/// Paraphrase the panel into free-text advice. The rule-based report is
/// recomputed so the model sees the same findings as the results table.
#[tauri::command]
pub async fn generate_ai_advice(
  state: State<'_, Arc<AppState>>,
  panel: LabPanel,
  locale: Option<String>,
) -> Result<AiAdvice, String> {
  let locale = state.locale_or_default(locale.as_deref());

  let report = assess(&panel, locale).map_err(|e| e.to_string())?;

  let client = LlmClient::from_settings(&state.config.llm).map_err(|e| match e {
    LlmError::MissingApiKey => {
      tracing::warn!("advice requested without an API key");
      format!(
        "AI advice is unavailable: {} is not set",
        state.config.llm.provider.key_var()
      )
    }
    other => format!("Failed to create LLM client: {}", other),
  })?;

  let (text, usage) = client
    .advise(&panel, &report, locale)
    .await
    .map_err(|e| {
      tracing::error!(error = %e, "advice request failed");
      format!("Failed to generate advice: {}", e)
    })?;

  Ok(AiAdvice {
    text,
    provider: client.provider().as_str().to_string(),
    model: state.config.llm.model.clone(),
    usage,
  })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
