//! Deterministic assessment layer for a hormone panel
//!
//! Every value is classified against its reference interval here. The
//! language model, when used, only paraphrases what this module computed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::advisory::{collect_advice, AdviceKey, Locale};
use crate::models::{Hormone, LabPanel, Metric, PanelError, Status};
use crate::phase::CyclePhase;
use crate::reference::{
  select_interval, ReferenceInterval, MID_LUTEAL_DAYS, OVULATION_P4_THRESHOLD,
};

/// LH/FSH above this suggests PCOS
pub const LH_FSH_RATIO_THRESHOLD: f64 = 2.0;

/// Reserve is flagged only past this age
pub const RESERVE_AGE_THRESHOLD: u32 = 35;
pub const RESERVE_AMH_THRESHOLD: f64 = 1.0;

/// ---------------------------------------------------------------------------
/// Report Types
/// ---------------------------------------------------------------------------

/// One measured hormone against its interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRow {
  pub metric: Metric,
  pub label: String,
  pub value: f64,
  pub unit: String,
  pub interval: ReferenceInterval,
  pub status: Status,
}

/// A derived check that combines several inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
  pub metric: Metric,
  pub label: String,
  pub value: f64,
  pub status: Status,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
  pub assessed_at: DateTime<Utc>,

  pub cycle_day: Option<u32>,

  /// None when no cycle day was entered (generic reference profile)
  pub phase: Option<CyclePhase>,

  /// Measured hormones in panel order
  pub rows: Vec<StatusRow>,

  /// Ratio, reserve and ovulation checks that fired
  pub findings: Vec<Finding>,

  /// Deduplicated advisory strings
  pub advice: Vec<String>,

  /// No row and no finding is abnormal
  pub all_normal: bool,
}

impl AssessmentReport {
  pub fn abnormal_rows(&self) -> impl Iterator<Item = &StatusRow> {
    self.rows.iter().filter(|r| r.status.is_abnormal())
  }

  pub fn row(&self, hormone: Hormone) -> Option<&StatusRow> {
    self.rows.iter().find(|r| r.metric == Metric::Hormone(hormone))
  }

  pub fn finding(&self, metric: Metric) -> Option<&Finding> {
    self.findings.iter().find(|f| f.metric == metric)
  }
}

/// ---------------------------------------------------------------------------
/// Derived Checks
/// ---------------------------------------------------------------------------

/// LH/FSH ratio, if both were measured
pub fn lh_fsh_ratio(panel: &LabPanel) -> Option<f64> {
  match (panel.lh, panel.fsh) {
    (Some(lh), Some(fsh)) if fsh > 0.0 => Some(lh / fsh),
    _ => None,
  }
}

fn ratio_finding(panel: &LabPanel) -> Option<Finding> {
  let ratio = lh_fsh_ratio(panel)?;
  if ratio > LH_FSH_RATIO_THRESHOLD {
    Some(Finding {
      metric: Metric::LhFshRatio,
      label: Metric::LhFshRatio.label().to_string(),
      value: ratio,
      status: Status::High,
    })
  } else {
    None
  }
}

fn reserve_finding(panel: &LabPanel) -> Option<Finding> {
  match (panel.age, panel.amh) {
    (Some(age), Some(amh)) if age > RESERVE_AGE_THRESHOLD && amh < RESERVE_AMH_THRESHOLD => {
      Some(Finding {
        metric: Metric::OvarianReserve,
        label: Metric::OvarianReserve.label().to_string(),
        value: amh,
        status: Status::Low,
      })
    }
    _ => None,
  }
}

fn ovulation_finding(panel: &LabPanel) -> Option<Finding> {
  match (panel.cycle_day, panel.p4) {
    (Some(day), Some(p4)) if MID_LUTEAL_DAYS.contains(&day) && p4 < OVULATION_P4_THRESHOLD => {
      Some(Finding {
        metric: Metric::Ovulation,
        label: Metric::Ovulation.label().to_string(),
        value: p4,
        status: Status::Low,
      })
    }
    _ => None,
  }
}

/// ---------------------------------------------------------------------------
/// Assessment
/// ---------------------------------------------------------------------------

/// Classify every entered value and pick the matching advisory strings
pub fn assess(panel: &LabPanel, locale: Locale) -> Result<AssessmentReport, PanelError> {
  let panel = panel.normalized();
  panel.validate()?;

  let phase = panel.cycle_day.map(CyclePhase::from_cycle_day);

  let rows: Vec<StatusRow> = panel
    .measured()
    .map(|(hormone, value)| {
      let interval = select_interval(hormone, panel.cycle_day);
      StatusRow {
        metric: Metric::Hormone(hormone),
        label: hormone.label().to_string(),
        value,
        unit: hormone.unit().to_string(),
        interval,
        status: interval.classify(value),
      }
    })
    .collect();

  let findings: Vec<Finding> = [
    ratio_finding(&panel),
    reserve_finding(&panel),
    ovulation_finding(&panel),
  ]
  .into_iter()
  .flatten()
  .collect();

  let all_normal = rows.iter().all(|r| !r.status.is_abnormal())
    && findings.iter().all(|f| !f.status.is_abnormal());

  // Normal rows still produce a key: a few normal statuses carry a confirmation
  let keys = rows
    .iter()
    .map(|r| AdviceKey {
      metric: r.metric,
      status: r.status,
      phase,
    })
    .chain(findings.iter().map(|f| AdviceKey {
      metric: f.metric,
      status: f.status,
      phase,
    }));

  let advice = collect_advice(keys, locale);

  tracing::debug!(
    measured = rows.len(),
    findings = findings.len(),
    phase = phase.map(|p| p.as_str()),
    "assessed hormone panel"
  );

  Ok(AssessmentReport {
    assessed_at: Utc::now(),
    cycle_day: panel.cycle_day,
    phase,
    rows,
    findings,
    advice,
    all_normal,
  })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
