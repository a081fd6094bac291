//! Reference intervals for the hormone panel
//!
//! Intervals depend on the cycle phase. When no cycle day is known the
//! generic profile applies. Progesterone in the luteal phase is further
//! narrowed by day windows.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Hormone, Status};
use crate::phase::CyclePhase;

/// ---------------------------------------------------------------------------
/// Interval
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceInterval {
  pub low: f64,
  /// `None` means no upper limit: the value is never reported high
  pub high: Option<f64>,
}

impl ReferenceInterval {
  pub const fn new(low: f64, high: f64) -> Self {
    Self {
      low,
      high: Some(high),
    }
  }

  pub const fn at_least(low: f64) -> Self {
    Self { low, high: None }
  }

  /// Bounds are inclusive: a value equal to either bound is normal.
  pub fn classify(&self, value: f64) -> Status {
    if value < self.low {
      Status::Low
    } else if self.high.is_some_and(|high| value > high) {
      Status::High
    } else {
      Status::Normal
    }
  }
}

impl fmt::Display for ReferenceInterval {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.high {
      Some(high) => write!(f, "{}-{}", self.low, high),
      None => write!(f, ">= {}", self.low),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Profiles
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceProfile {
  Generic,
  EarlyFollicular,
  Ovulatory,
  Luteal,
}

impl From<Option<CyclePhase>> for ReferenceProfile {
  fn from(phase: Option<CyclePhase>) -> Self {
    match phase {
      None => ReferenceProfile::Generic,
      Some(CyclePhase::EarlyFollicular) => ReferenceProfile::EarlyFollicular,
      Some(CyclePhase::Ovulatory) => ReferenceProfile::Ovulatory,
      Some(CyclePhase::Luteal) => ReferenceProfile::Luteal,
    }
  }
}

/// Interval for a hormone under a profile
pub fn interval_for(hormone: Hormone, profile: ReferenceProfile) -> ReferenceInterval {
  use ReferenceProfile::*;

  match (hormone, profile) {
    (Hormone::Fsh, Generic) => ReferenceInterval::new(2.5, 10.2),
    (Hormone::Fsh, EarlyFollicular) => ReferenceInterval::new(2.0, 10.0),
    // Days 6-14 span the late follicular phase too, so the floor is not the surge level
    (Hormone::Fsh, Ovulatory) => ReferenceInterval::new(2.0, 33.4),
    (Hormone::Fsh, Luteal) => ReferenceInterval::new(1.5, 9.1),

    (Hormone::Lh, Generic) => ReferenceInterval::new(1.9, 12.5),
    (Hormone::Lh, EarlyFollicular) => ReferenceInterval::new(2.0, 12.0),
    (Hormone::Lh, Ovulatory) => ReferenceInterval::new(2.0, 96.0),
    (Hormone::Lh, Luteal) => ReferenceInterval::new(1.0, 11.4),

    // Generic upper bound is 5x the nominal 60.7 pg/mL: only marked elevation counts
    (Hormone::E2, Generic) => ReferenceInterval::new(25.8, 303.5),
    (Hormone::E2, EarlyFollicular) => ReferenceInterval::new(50.0, 300.0),
    (Hormone::E2, Ovulatory) => ReferenceInterval::new(50.0, 433.0),
    (Hormone::E2, Luteal) => ReferenceInterval::new(48.0, 309.0),

    // Without a cycle day only luteal insufficiency is flagged
    (Hormone::P4, Generic) => ReferenceInterval::at_least(1.5),
    (Hormone::P4, EarlyFollicular) => ReferenceInterval::new(0.0, 3.0),
    (Hormone::P4, Ovulatory) => ReferenceInterval::new(0.0, 1.5),
    (Hormone::P4, Luteal) => ReferenceInterval::new(10.0, 20.0),

    (Hormone::Prl, Generic) => ReferenceInterval::new(3.0, 25.0),
    (Hormone::Prl, _) => ReferenceInterval::new(5.0, 25.0),

    (Hormone::T, Generic) => ReferenceInterval::new(15.0, 70.0),
    (Hormone::T, _) => ReferenceInterval::new(20.0, 60.0),

    (Hormone::Amh, _) => ReferenceInterval::new(1.0, 4.0),
  }
}

/// ---------------------------------------------------------------------------
/// Progesterone day windows
/// ---------------------------------------------------------------------------

/// A luteal day window that overrides the progesterone phase interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgesteroneWindow {
  pub first_day: u32,
  pub last_day: u32,
  pub interval: ReferenceInterval,
}

/// Windows are ordered and non-overlapping; the first match wins.
pub const PROGESTERONE_WINDOWS: [ProgesteroneWindow; 3] = [
  // Corpus luteum still forming
  ProgesteroneWindow {
    first_day: 15,
    last_day: 18,
    interval: ReferenceInterval::new(3.0, 20.0),
  },
  // Mid-luteal: the phase interval itself
  ProgesteroneWindow {
    first_day: 19,
    last_day: 23,
    interval: ReferenceInterval::new(10.0, 20.0),
  },
  // Luteolysis
  ProgesteroneWindow {
    first_day: 24,
    last_day: 30,
    interval: ReferenceInterval::new(2.0, 20.0),
  },
];

/// Mid-luteal window used to confirm ovulation
pub const MID_LUTEAL_DAYS: std::ops::RangeInclusive<u32> = 19..=23;

/// Below this mid-luteal progesterone the cycle was likely anovulatory
pub const OVULATION_P4_THRESHOLD: f64 = 3.0;

fn progesterone_window(day: u32) -> Option<&'static ProgesteroneWindow> {
  PROGESTERONE_WINDOWS
    .iter()
    .find(|w| (w.first_day..=w.last_day).contains(&day))
}

/// Interval for a hormone given the cycle day, if known
pub fn select_interval(hormone: Hormone, cycle_day: Option<u32>) -> ReferenceInterval {
  let phase = cycle_day.map(CyclePhase::from_cycle_day);

  if let (Hormone::P4, Some(day), Some(CyclePhase::Luteal)) = (hormone, cycle_day, phase) {
    if let Some(window) = progesterone_window(day) {
      return window.interval;
    }
  }

  interval_for(hormone, ReferenceProfile::from(phase))
}

/// ---------------------------------------------------------------------------
/// Reference table (for display)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRow {
  pub hormone: Hormone,
  pub label: String,
  pub unit: String,
  pub interval: ReferenceInterval,
}

pub fn reference_table(cycle_day: Option<u32>) -> Vec<ReferenceRow> {
  Hormone::ALL
    .iter()
    .map(|h| ReferenceRow {
      hormone: *h,
      label: h.label().to_string(),
      unit: h.unit().to_string(),
      interval: select_interval(*h, cycle_day),
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_bounds_are_inclusive() {
    let interval = ReferenceInterval::new(2.0, 10.0);
    assert_eq!(interval.classify(2.0), Status::Normal);
    assert_eq!(interval.classify(10.0), Status::Normal);
    assert_eq!(interval.classify(1.99), Status::Low);
    assert_eq!(interval.classify(10.01), Status::High);
  }

  #[test]
  fn test_open_interval_is_never_high() {
    let interval = ReferenceInterval::at_least(1.5);
    assert_eq!(interval.classify(1.0), Status::Low);
    assert_eq!(interval.classify(1.5), Status::Normal);
    assert_eq!(interval.classify(80.0), Status::Normal);
    assert_eq!(interval.to_string(), ">= 1.5");
    assert_eq!(ReferenceInterval::new(2.0, 12.0).to_string(), "2-12");
  }

  #[test]
  fn test_generic_progesterone_flags_only_low_values() {
    let p4 = select_interval(Hormone::P4, None);
    assert_eq!(p4.classify(1.0), Status::Low);
    assert_eq!(p4.classify(5.0), Status::Normal);
    assert_eq!(p4.classify(40.0), Status::Normal);
  }

  #[test]
  fn test_ovulatory_floor_covers_late_follicular_days() {
    assert_eq!(select_interval(Hormone::Lh, Some(8)).classify(6.0), Status::Normal);
    assert_eq!(select_interval(Hormone::Fsh, Some(8)).classify(6.0), Status::Normal);
    assert_eq!(select_interval(Hormone::E2, Some(8)).classify(80.0), Status::Normal);
    assert_eq!(select_interval(Hormone::Lh, Some(8)).classify(1.5), Status::Low);
  }

  #[test]
  fn test_profile_follows_phase() {
    assert_eq!(ReferenceProfile::from(None), ReferenceProfile::Generic);
    assert_eq!(
      ReferenceProfile::from(Some(CyclePhase::Ovulatory)),
      ReferenceProfile::Ovulatory
    );
  }

  #[test]
  fn test_lh_interval_widens_at_ovulation() {
    let early = select_interval(Hormone::Lh, Some(3));
    let ovulatory = select_interval(Hormone::Lh, Some(13));

    assert_eq!(early.classify(30.0), Status::High);
    assert_eq!(ovulatory.classify(30.0), Status::Normal);
  }

  #[test]
  fn test_generic_profile_without_cycle_day() {
    let fsh = select_interval(Hormone::Fsh, None);
    assert_eq!(fsh, ReferenceInterval::new(2.5, 10.2));

    let e2 = select_interval(Hormone::E2, None);
    assert_eq!(e2.classify(200.0), Status::Normal);
    assert_eq!(e2.classify(310.0), Status::High);
  }

  #[test]
  fn test_progesterone_day_windows() {
    assert_eq!(select_interval(Hormone::P4, Some(16)), ReferenceInterval::new(3.0, 20.0));
    assert_eq!(select_interval(Hormone::P4, Some(21)), ReferenceInterval::new(10.0, 20.0));
    assert_eq!(select_interval(Hormone::P4, Some(27)), ReferenceInterval::new(2.0, 20.0));

    // 5 ng/mL is adequate early and late in the luteal phase but low mid-luteal
    assert_eq!(select_interval(Hormone::P4, Some(16)).classify(5.0), Status::Normal);
    assert_eq!(select_interval(Hormone::P4, Some(21)).classify(5.0), Status::Low);
    assert_eq!(select_interval(Hormone::P4, Some(27)).classify(5.0), Status::Normal);
  }

  #[test]
  fn test_progesterone_windows_do_not_overlap() {
    for pair in PROGESTERONE_WINDOWS.windows(2) {
      assert!(pair[0].last_day < pair[1].first_day);
    }
  }

  #[test]
  fn test_progesterone_outside_luteal_ignores_windows() {
    assert_eq!(select_interval(Hormone::P4, Some(4)), ReferenceInterval::new(0.0, 3.0));
    assert_eq!(select_interval(Hormone::P4, Some(10)), ReferenceInterval::new(0.0, 1.5));
  }

  #[test]
  fn test_reference_table_covers_every_hormone() {
    let table = reference_table(Some(20));
    assert_eq!(table.len(), Hormone::ALL.len());
    assert_eq!(table[0].label, "FSH");
    assert_eq!(table[6].unit, "ng/mL");
  }
}
