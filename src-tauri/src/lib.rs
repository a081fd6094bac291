pub mod advisory;
pub mod assessment;
pub mod chart;
mod commands;
pub mod config;
pub mod llm;
pub mod models;
pub mod phase;
pub mod reference;
mod state;

#[cfg(test)]
mod test_utils;

use config::AppConfig;
use state::AppState;
use std::sync::Arc;
use tauri::Manager;

fn init_logging() {
  use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hormone_panel_lib=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_target(true))
    .init();
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();
  init_logging();

  tauri::Builder::default()
    .plugin(tauri_plugin_opener::init())
    .setup(|app| {
      let config = AppConfig::from_env()?;
      tracing::info!(
        locale = ?config.locale,
        provider = config.llm.provider.as_str(),
        llm_configured = config.llm.api_key.is_some(),
        "configuration loaded"
      );
      app.manage(Arc::new(AppState::new(config)));
      Ok(())
    })
    .invoke_handler(tauri::generate_handler![
      // Rule-based assessment
      commands::assessment::assess_panel,
      commands::assessment::get_reference_ranges,
      // Optional LLM advice
      commands::advice::get_llm_status,
      commands::advice::generate_ai_advice,
    ])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}
