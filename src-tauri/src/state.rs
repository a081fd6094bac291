use crate::advisory::Locale;
use crate::config::AppConfig;

/// Application state shared with every command
pub struct AppState {
  pub config: AppConfig,
}

impl AppState {
  pub fn new(config: AppConfig) -> Self {
    Self { config }
  }

  /// Locale requested by the frontend, falling back to the configured default
  pub fn locale_or_default(&self, requested: Option<&str>) -> Locale {
    requested
      .and_then(Locale::parse)
      .unwrap_or(self.config.locale)
  }
}
