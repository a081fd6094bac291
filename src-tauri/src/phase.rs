//! Menstrual cycle phase derived from the cycle day

use serde::{Deserialize, Serialize};

const EARLY_FOLLICULAR_LAST_DAY: u32 = 5;
const OVULATORY_LAST_DAY: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
  EarlyFollicular, // days 1-5
  Ovulatory,       // days 6-14
  Luteal,          // day 15 onwards
}

impl CyclePhase {
  pub fn from_cycle_day(day: u32) -> Self {
    match day {
      d if d <= EARLY_FOLLICULAR_LAST_DAY => CyclePhase::EarlyFollicular,
      d if d <= OVULATORY_LAST_DAY => CyclePhase::Ovulatory,
      _ => CyclePhase::Luteal,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      CyclePhase::EarlyFollicular => "early_follicular",
      CyclePhase::Ovulatory => "ovulatory",
      CyclePhase::Luteal => "luteal",
    }
  }
}
