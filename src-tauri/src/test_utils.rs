//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Mock panels for typical clinical pictures
//! - Config and app state factories
//! - Helper assertions

use url::Url;

use crate::advisory::Locale;
use crate::config::{AppConfig, LlmProvider, LlmSettings};
use crate::models::LabPanel;
use crate::state::AppState;

/// ---------------------------------------------------------------------------
/// Mock Panels
/// ---------------------------------------------------------------------------

/// Early follicular panel with every value inside its interval
pub fn mock_normal_panel() -> LabPanel {
  LabPanel {
    fsh: Some(6.0),
    lh: Some(5.0),
    e2: Some(80.0),
    p4: Some(0.5),
    prl: Some(12.0),
    t: Some(35.0),
    amh: Some(2.5),
    age: Some(30),
    cycle_day: Some(3),
  }
}

/// Early follicular PCOS picture: LH/FSH = 3, high LH, T and AMH
pub fn mock_pcos_panel() -> LabPanel {
  LabPanel {
    fsh: Some(5.0),
    lh: Some(15.0),
    e2: Some(70.0),
    p4: None,
    prl: Some(15.0),
    t: Some(75.0),
    amh: Some(6.0),
    age: Some(27),
    cycle_day: Some(3),
  }
}

/// Luteal panel with normal gonadotropins; only progesterone varies
pub fn mock_luteal_panel(cycle_day: u32, p4: f64) -> LabPanel {
  LabPanel {
    fsh: Some(4.0),
    lh: Some(6.0),
    e2: Some(150.0),
    p4: Some(p4),
    prl: None,
    t: None,
    amh: None,
    age: Some(32),
    cycle_day: Some(cycle_day),
  }
}

/// ---------------------------------------------------------------------------
/// Config Factories
/// ---------------------------------------------------------------------------

pub fn mock_llm_settings(provider: LlmProvider, base_url: &str, api_key: Option<&str>) -> LlmSettings {
  LlmSettings {
    provider,
    api_key: api_key.map(str::to_string),
    model: "test-model".to_string(),
    base_url: Url::parse(base_url).expect("valid test base url"),
  }
}

/// Config with no API key and an unroutable endpoint
pub fn mock_config() -> AppConfig {
  AppConfig {
    locale: Locale::En,
    llm: mock_llm_settings(LlmProvider::Anthropic, "http://127.0.0.1:1/", None),
  }
}

pub fn mock_app_state() -> AppState {
  AppState::new(mock_config())
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mock_panels_are_valid() {
    assert!(mock_normal_panel().validate().is_ok());
    assert!(mock_pcos_panel().validate().is_ok());
    assert!(mock_luteal_panel(21, 12.0).validate().is_ok());
  }

  #[test]
  fn test_mock_state_has_no_key() {
    let state = mock_app_state();
    assert!(state.config.llm.api_key.is_none());
    assert_eq!(state.locale_or_default(None), Locale::En);
    assert_eq!(state.locale_or_default(Some("zh")), Locale::Zh);
    assert_eq!(state.locale_or_default(Some("xx")), Locale::En);
  }
}
