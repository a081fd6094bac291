//! LLM integration for free-text panel advice
//!
//! This module paraphrases an already computed assessment into personalised
//! advice. It supports the Anthropic Messages API and OpenAI-compatible chat
//! completion endpoints.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::advisory::Locale;
use crate::assessment::AssessmentReport;
use crate::config::{LlmProvider, LlmSettings};
use crate::models::LabPanel;

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 400;
const TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Serialize)]
pub enum LlmError {
  #[error("API key not configured")]
  MissingApiKey,

  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

/// ---------------------------------------------------------------------------
/// Anthropic API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ClaudeRequest {
  model: String,
  max_tokens: u32,
  temperature: f32,
  system: String,
  messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
  role: String,
  content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
  content: Vec<ContentBlock>,
  usage: ClaudeUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
  #[serde(rename = "type")]
  content_type: String,
  text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeUsage {
  input_tokens: u32,
  output_tokens: u32,
}

/// ---------------------------------------------------------------------------
/// OpenAI API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct OpenAiRequest {
  model: String,
  max_tokens: u32,
  temperature: f32,
  messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
  choices: Vec<OpenAiChoice>,
  usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
  message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
  content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
  prompt_tokens: u32,
  completion_tokens: u32,
}

/// Both providers wrap errors as {"error": {"message": ...}}
#[derive(Debug, Deserialize)]
struct ErrorResponse {
  error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
  message: String,
}

/// Token usage, normalised across providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
  pub input_tokens: u32,
  pub output_tokens: u32,
}

/// ---------------------------------------------------------------------------
/// Prompt
/// ---------------------------------------------------------------------------

const SYSTEM_PROMPT: &str = include_str!("prompts/advisor_system.txt");

fn fmt_value(v: Option<f64>) -> String {
  v.map(|x| x.to_string()).unwrap_or_else(|| "not measured".to_string())
}

/// Build the user message from the panel and its rule-based assessment
pub fn build_prompt(panel: &LabPanel, report: &AssessmentReport, locale: Locale) -> String {
  let panel = panel.normalized();

  let phase = report
    .phase
    .map(|p| p.as_str().replace('_', " "))
    .unwrap_or_else(|| "unknown".to_string());

  let mut findings: Vec<String> = report
    .abnormal_rows()
    .map(|r| {
      format!(
        "- {} {} {} is {} (reference {})",
        r.label,
        r.value,
        r.unit,
        r.status.as_str(),
        r.interval
      )
    })
    .collect();
  findings.extend(
    report
      .findings
      .iter()
      .map(|f| format!("- {} is {} ({:.2})", f.label, f.status.as_str(), f.value)),
  );
  if findings.is_empty() {
    findings.push("- all measured values are within their reference ranges".to_string());
  }

  let language = match locale {
    Locale::En => "English",
    Locale::Zh => "Simplified Chinese",
  };

  format!(
    r#"Based on the following indicators:
FSH={} mIU/mL, LH={} mIU/mL, E2={} pg/mL, P4={} ng/mL, PRL={} ng/mL, T={} ng/dL, AMH={} ng/mL
Age: {}
Cycle day: {} (phase: {})

RULE-BASED FINDINGS:
{}

Please provide:
1. An overall assessment (2-3 sentences);
2. 4-5 personalised treatment or lifestyle recommendations.

Respond in {}."#,
    fmt_value(panel.fsh),
    fmt_value(panel.lh),
    fmt_value(panel.e2),
    fmt_value(panel.p4),
    fmt_value(panel.prl),
    fmt_value(panel.t),
    fmt_value(panel.amh),
    panel.age.map(|a| a.to_string()).unwrap_or_else(|| "not given".to_string()),
    panel.cycle_day.map(|d| d.to_string()).unwrap_or_else(|| "not given".to_string()),
    phase,
    findings.join("\n"),
    language
  )
}

/// ---------------------------------------------------------------------------
/// Client
/// ---------------------------------------------------------------------------

pub struct LlmClient {
  client: Client,
  api_key: String,
  settings: LlmSettings,
}

impl LlmClient {
  /// Create a client for the configured provider; fails when its key is missing
  pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
    let api_key = settings.api_key.clone().ok_or(LlmError::MissingApiKey)?;

    let client = Client::builder()
      .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
      .build()
      .map_err(|e| LlmError::Request(e.to_string()))?;

    Ok(Self {
      client,
      api_key,
      settings: settings.clone(),
    })
  }

  pub fn provider(&self) -> LlmProvider {
    self.settings.provider
  }

  fn endpoint(&self, path: &str) -> Result<url::Url, LlmError> {
    self
      .settings
      .base_url
      .join(path)
      .map_err(|e| LlmError::Request(format!("Invalid endpoint {}: {}", path, e)))
  }

  /// Send one system + user exchange and return the text reply
  pub async fn complete(
    &self,
    system_prompt: &str,
    user_message: &str,
    max_tokens: u32,
  ) -> Result<(String, Usage), LlmError> {
    match self.settings.provider {
      LlmProvider::Anthropic => self.complete_anthropic(system_prompt, user_message, max_tokens).await,
      LlmProvider::OpenAi => self.complete_openai(system_prompt, user_message, max_tokens).await,
    }
  }

  async fn complete_anthropic(
    &self,
    system_prompt: &str,
    user_message: &str,
    max_tokens: u32,
  ) -> Result<(String, Usage), LlmError> {
    let request = ClaudeRequest {
      model: self.settings.model.clone(),
      max_tokens,
      temperature: TEMPERATURE,
      system: system_prompt.to_string(),
      messages: vec![ChatMessage {
        role: "user".to_string(),
        content: user_message.to_string(),
      }],
    };

    let response = self
      .client
      .post(self.endpoint("messages")?)
      .header("x-api-key", &self.api_key)
      .header("anthropic-version", API_VERSION)
      .header("content-type", "application/json")
      .json(&request)
      .send()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    let body = read_body(response).await?;

    let claude_response: ClaudeResponse =
      serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

    // Extract text from the first text content block
    let text = claude_response
      .content
      .iter()
      .find(|c| c.content_type == "text")
      .and_then(|c| c.text.clone())
      .ok_or_else(|| LlmError::Parse("No text content in response".to_string()))?;

    let usage = Usage {
      input_tokens: claude_response.usage.input_tokens,
      output_tokens: claude_response.usage.output_tokens,
    };

    Ok((text, usage))
  }

  async fn complete_openai(
    &self,
    system_prompt: &str,
    user_message: &str,
    max_tokens: u32,
  ) -> Result<(String, Usage), LlmError> {
    let request = OpenAiRequest {
      model: self.settings.model.clone(),
      max_tokens,
      temperature: TEMPERATURE,
      messages: vec![
        ChatMessage {
          role: "system".to_string(),
          content: system_prompt.to_string(),
        },
        ChatMessage {
          role: "user".to_string(),
          content: user_message.to_string(),
        },
      ],
    };

    let response = self
      .client
      .post(self.endpoint("chat/completions")?)
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    let body = read_body(response).await?;

    let openai_response: OpenAiResponse =
      serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

    let text = openai_response
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .ok_or_else(|| LlmError::Parse("No choices in response".to_string()))?;

    let usage = openai_response
      .usage
      .map(|u| Usage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
      })
      .unwrap_or(Usage {
        input_tokens: 0,
        output_tokens: 0,
      });

    Ok((text, usage))
  }

  /// Paraphrase an assessment into free-text advice
  pub async fn advise(
    &self,
    panel: &LabPanel,
    report: &AssessmentReport,
    locale: Locale,
  ) -> Result<(String, Usage), LlmError> {
    let user_message = build_prompt(panel, report, locale);

    tracing::info!(
      provider = self.settings.provider.as_str(),
      model = %self.settings.model,
      "requesting panel advice"
    );

    let (text, usage) = self.complete(SYSTEM_PROMPT, &user_message, MAX_TOKENS).await?;

    tracing::info!(
      input_tokens = usage.input_tokens,
      output_tokens = usage.output_tokens,
      "panel advice received"
    );

    Ok((text.trim().to_string(), usage))
  }
}

/// Read the body, turning non-2xx responses into `LlmError::Api`
async fn read_body(response: reqwest::Response) -> Result<String, LlmError> {
  let status = response.status();
  let body = response
    .text()
    .await
    .map_err(|e| LlmError::Request(e.to_string()))?;

  if !status.is_success() {
    // Try to parse error response
    if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(&body) {
      return Err(LlmError::Api(error_resp.error.message));
    }
    return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
  }

  Ok(body)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assessment::assess;
  use crate::test_utils::*;
  use mockito::Matcher;

  #[test]
  fn test_missing_api_key() {
    let settings = mock_llm_settings(LlmProvider::Anthropic, "http://127.0.0.1:1/", None);
    assert!(matches!(
      LlmClient::from_settings(&settings),
      Err(LlmError::MissingApiKey)
    ));
  }

  #[test]
  fn test_prompt_lists_values_and_findings() {
    let panel = mock_pcos_panel();
    let report = assess(&panel, Locale::En).unwrap();
    let prompt = build_prompt(&panel, &report, Locale::En);

    assert!(prompt.contains("FSH=5 mIU/mL"));
    assert!(prompt.contains("phase: early follicular"));
    assert!(prompt.contains("- LH 15 mIU/mL is high (reference 2-12)"));
    assert!(prompt.contains("- LH/FSH is high (3.00)"));
    assert!(prompt.contains("2-3 sentences"));
    assert!(prompt.contains("Respond in English."));
  }

  #[test]
  fn test_prompt_marks_missing_values() {
    let panel = LabPanel {
      fsh: Some(6.0),
      ..Default::default()
    };
    let report = assess(&panel, Locale::Zh).unwrap();
    let prompt = build_prompt(&panel, &report, Locale::Zh);

    assert!(prompt.contains("LH=not measured"));
    assert!(prompt.contains("Age: not given"));
    assert!(prompt.contains("phase: unknown"));
    assert!(prompt.contains("all measured values are within"));
    assert!(prompt.contains("Simplified Chinese"));
  }

  #[tokio::test]
  async fn test_anthropic_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", "/messages")
      .match_header("x-api-key", "test-key")
      .match_header("anthropic-version", API_VERSION)
      .match_body(Matcher::PartialJson(serde_json::json!({
        "max_tokens": 400,
        "model": "test-model"
      })))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(
        r#"{"content":[{"type":"text","text":"  Keep a regular sleep schedule.  "}],
            "model":"test-model","stop_reason":"end_turn",
            "usage":{"input_tokens":120,"output_tokens":40}}"#,
      )
      .create_async()
      .await;

    let base = format!("{}/", server.url());
    let settings = mock_llm_settings(LlmProvider::Anthropic, &base, Some("test-key"));
    let client = LlmClient::from_settings(&settings).unwrap();

    let panel = mock_normal_panel();
    let report = assess(&panel, Locale::En).unwrap();
    let (text, usage) = client.advise(&panel, &report, Locale::En).await.unwrap();

    assert_eq!(text, "Keep a regular sleep schedule.");
    assert_eq!(usage.input_tokens, 120);
    assert_eq!(usage.output_tokens, 40);
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_openai_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", "/chat/completions")
      .match_header("authorization", "Bearer sk-test")
      .match_body(Matcher::PartialJson(serde_json::json!({
        "temperature": 0.7
      })))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(
        r#"{"choices":[{"message":{"role":"assistant","content":"Recheck FSH on day 3."}}],
            "usage":{"prompt_tokens":90,"completion_tokens":12}}"#,
      )
      .create_async()
      .await;

    let base = format!("{}/", server.url());
    let settings = mock_llm_settings(LlmProvider::OpenAi, &base, Some("sk-test"));
    let client = LlmClient::from_settings(&settings).unwrap();

    let (text, usage) = client.complete("system", "user", 100).await.unwrap();

    assert_eq!(text, "Recheck FSH on day 3.");
    assert_eq!(usage.input_tokens, 90);
    assert_eq!(usage.output_tokens, 12);
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_api_error_message_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
      .mock("POST", "/messages")
      .with_status(401)
      .with_body(r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#)
      .create_async()
      .await;

    let base = format!("{}/", server.url());
    let settings = mock_llm_settings(LlmProvider::Anthropic, &base, Some("bad"));
    let client = LlmClient::from_settings(&settings).unwrap();

    match client.complete("system", "user", 100).await {
      Err(LlmError::Api(msg)) => assert_eq!(msg, "invalid x-api-key"),
      other => panic!("expected API error, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_unparseable_error_body_keeps_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
      .mock("POST", "/chat/completions")
      .with_status(502)
      .with_body("bad gateway")
      .create_async()
      .await;

    let base = format!("{}/", server.url());
    let settings = mock_llm_settings(LlmProvider::OpenAi, &base, Some("sk-test"));
    let client = LlmClient::from_settings(&settings).unwrap();

    match client.complete("system", "user", 100).await {
      Err(LlmError::Api(msg)) => {
        assert!(msg.starts_with("HTTP 502"));
        assert!(msg.contains("bad gateway"));
      }
      other => panic!("expected API error, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_response_without_text_is_parse_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
      .mock("POST", "/messages")
      .with_status(200)
      .with_body(r#"{"content":[],"usage":{"input_tokens":1,"output_tokens":0}}"#)
      .create_async()
      .await;

    let base = format!("{}/", server.url());
    let settings = mock_llm_settings(LlmProvider::Anthropic, &base, Some("k"));
    let client = LlmClient::from_settings(&settings).unwrap();

    assert!(matches!(
      client.complete("system", "user", 100).await,
      Err(LlmError::Parse(_))
    ));
  }
}
