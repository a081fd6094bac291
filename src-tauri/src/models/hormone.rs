use serde::{Deserialize, Serialize};

/// Analytes on the reproductive hormone panel, in panel order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hormone {
  Fsh,
  Lh,
  E2,
  P4,
  Prl,
  T,
  Amh,
}

impl Hormone {
  pub const ALL: [Hormone; 7] = [
    Hormone::Fsh,
    Hormone::Lh,
    Hormone::E2,
    Hormone::P4,
    Hormone::Prl,
    Hormone::T,
    Hormone::Amh,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      Hormone::Fsh => "FSH",
      Hormone::Lh => "LH",
      Hormone::E2 => "E2",
      Hormone::P4 => "P4",
      Hormone::Prl => "PRL",
      Hormone::T => "T",
      Hormone::Amh => "AMH",
    }
  }

  pub fn unit(&self) -> &'static str {
    match self {
      Hormone::Fsh | Hormone::Lh => "mIU/mL",
      Hormone::E2 => "pg/mL",
      Hormone::T => "ng/dL",
      Hormone::P4 | Hormone::Prl | Hormone::Amh => "ng/mL",
    }
  }
}

/// Classification of a value against its reference interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  Low,
  Normal,
  High,
}

impl Status {
  pub fn is_abnormal(&self) -> bool {
    !matches!(self, Status::Normal)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Status::Low => "low",
      Status::Normal => "normal",
      Status::High => "high",
    }
  }
}

/// Anything that can carry a status and therefore an advisory string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "hormone", rename_all = "snake_case")]
pub enum Metric {
  Hormone(Hormone),
  /// LH divided by FSH
  LhFshRatio,
  /// Age combined with AMH
  OvarianReserve,
  /// Mid-luteal progesterone as evidence of ovulation
  Ovulation,
}

impl Metric {
  pub fn label(&self) -> &'static str {
    match self {
      Metric::Hormone(h) => h.label(),
      Metric::LhFshRatio => "LH/FSH",
      Metric::OvarianReserve => "Ovarian reserve",
      Metric::Ovulation => "Ovulation",
    }
  }
}
