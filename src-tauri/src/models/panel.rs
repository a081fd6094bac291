use serde::{Deserialize, Serialize};

use super::hormone::Hormone;

pub const MIN_CYCLE_DAY: u32 = 1;
pub const MAX_CYCLE_DAY: u32 = 30;
pub const MAX_AGE: u32 = 120;

/// Lab values as entered on the form. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabPanel {
  pub fsh: Option<f64>,
  pub lh: Option<f64>,
  pub e2: Option<f64>,
  pub p4: Option<f64>,
  pub prl: Option<f64>,
  pub t: Option<f64>,
  pub amh: Option<f64>,
  pub age: Option<u32>,
  pub cycle_day: Option<u32>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PanelError {
  #[error("{0} must be a finite, non-negative number (got {1})")]
  InvalidValue(&'static str, f64),

  #[error("Cycle day must be between 1 and 30 (got {0})")]
  CycleDayOutOfRange(u32),

  #[error("Age must be at most 120 (got {0})")]
  AgeOutOfRange(u32),
}

impl Serialize for PanelError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

impl LabPanel {
  pub fn value(&self, hormone: Hormone) -> Option<f64> {
    match hormone {
      Hormone::Fsh => self.fsh,
      Hormone::Lh => self.lh,
      Hormone::E2 => self.e2,
      Hormone::P4 => self.p4,
      Hormone::Prl => self.prl,
      Hormone::T => self.t,
      Hormone::Amh => self.amh,
    }
  }

  /// Zero means "not entered": the form widgets start at 0.
  pub fn normalized(&self) -> Self {
    let entered = |v: Option<f64>| v.filter(|x| *x != 0.0);
    Self {
      fsh: entered(self.fsh),
      lh: entered(self.lh),
      e2: entered(self.e2),
      p4: entered(self.p4),
      prl: entered(self.prl),
      t: entered(self.t),
      amh: entered(self.amh),
      age: self.age.filter(|a| *a > 0),
      cycle_day: self.cycle_day,
    }
  }

  pub fn validate(&self) -> Result<(), PanelError> {
    for hormone in Hormone::ALL {
      if let Some(v) = self.value(hormone) {
        if !v.is_finite() || v < 0.0 {
          return Err(PanelError::InvalidValue(hormone.label(), v));
        }
      }
    }

    if let Some(day) = self.cycle_day {
      if !(MIN_CYCLE_DAY..=MAX_CYCLE_DAY).contains(&day) {
        return Err(PanelError::CycleDayOutOfRange(day));
      }
    }

    if let Some(age) = self.age {
      if age > MAX_AGE {
        return Err(PanelError::AgeOutOfRange(age));
      }
    }

    Ok(())
  }

  /// Measured hormones in panel order
  pub fn measured(&self) -> impl Iterator<Item = (Hormone, f64)> + '_ {
    Hormone::ALL
      .into_iter()
      .filter_map(move |h| self.value(h).map(|v| (h, v)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_zero_values_are_not_entered() {
    let panel = LabPanel {
      fsh: Some(0.0),
      lh: Some(5.0),
      age: Some(0),
      ..Default::default()
    }
    .normalized();

    assert_eq!(panel.fsh, None);
    assert_eq!(panel.lh, Some(5.0));
    assert_eq!(panel.age, None);
  }

  #[test]
  fn test_validate_rejects_negative_and_nan() {
    let panel = LabPanel {
      e2: Some(-1.0),
      ..Default::default()
    };
    assert_eq!(panel.validate(), Err(PanelError::InvalidValue("E2", -1.0)));

    let panel = LabPanel {
      prl: Some(f64::NAN),
      ..Default::default()
    };
    assert!(matches!(panel.validate(), Err(PanelError::InvalidValue("PRL", _))));
  }

  #[test]
  fn test_validate_cycle_day_bounds() {
    for day in [1, 14, 30] {
      let panel = LabPanel {
        cycle_day: Some(day),
        ..Default::default()
      };
      assert!(panel.validate().is_ok(), "day {} should be accepted", day);
    }

    for day in [0, 31] {
      let panel = LabPanel {
        cycle_day: Some(day),
        ..Default::default()
      };
      assert_eq!(panel.validate(), Err(PanelError::CycleDayOutOfRange(day)));
    }
  }

  #[test]
  fn test_validate_age() {
    let panel = LabPanel {
      age: Some(121),
      ..Default::default()
    };
    assert_eq!(panel.validate(), Err(PanelError::AgeOutOfRange(121)));
  }

  #[test]
  fn test_measured_keeps_panel_order() {
    let panel = LabPanel {
      amh: Some(2.0),
      fsh: Some(6.0),
      prl: Some(12.0),
      ..Default::default()
    };
    let order: Vec<Hormone> = panel.measured().map(|(h, _)| h).collect();
    assert_eq!(order, vec![Hormone::Fsh, Hormone::Prl, Hormone::Amh]);
  }

  #[test]
  fn test_error_serializes_as_message() {
    let json = serde_json::to_string(&PanelError::AgeOutOfRange(130)).unwrap();
    assert_eq!(json, "\"Age must be at most 120 (got 130)\"");
  }
}
