//! Tauri commands for the rule-based panel assessment

use serde::Serialize;
use std::sync::Arc;
use tauri::State;

use crate::assessment::{assess, AssessmentReport};
use crate::chart::{render_svg, ChartData, ChartKind};
use crate::models::LabPanel;
use crate::reference::{reference_table, ReferenceRow};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
  pub report: AssessmentReport,
  pub chart: ChartData,
  pub chart_kind: ChartKind,
  pub chart_svg: String,
}

/// Classify the panel and render the chart in one round trip
#[tauri::command]
pub async fn assess_panel(
  state: State<'_, Arc<AppState>>,
  panel: LabPanel,
  locale: Option<String>,
  chart_kind: Option<ChartKind>,
) -> Result<AssessmentResponse, String> {
  let locale = state.locale_or_default(locale.as_deref());
  let chart_kind = chart_kind.unwrap_or_default();

  let report = assess(&panel, locale).map_err(|e| {
    tracing::warn!(error = %e, "rejected panel");
    e.to_string()
  })?;

  let chart = ChartData::from_report(&report);
  let chart_svg = render_svg(&chart, chart_kind);

  tracing::info!(
    rows = report.rows.len(),
    all_normal = report.all_normal,
    "panel assessed"
  );

  Ok(AssessmentResponse {
    report,
    chart,
    chart_kind,
    chart_svg,
  })
}

/// Reference intervals that apply on a given cycle day (generic without one)
#[tauri::command]
pub async fn get_reference_ranges(cycle_day: Option<u32>) -> Result<Vec<ReferenceRow>, String> {
  let probe = LabPanel {
    cycle_day,
    ..Default::default()
  };
  probe.validate().map_err(|e| e.to_string())?;

  Ok(reference_table(cycle_day))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
