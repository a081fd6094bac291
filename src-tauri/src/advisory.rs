//! Static advisory text keyed by (metric, status)
//!
//! An entry may be restricted to one cycle phase. Lookup tries the
//! phase-specific entry first and then the phase-agnostic one, so each key
//! resolves to at most one string.

use serde::{Deserialize, Serialize};

use crate::models::{Hormone, Metric, Status};
use crate::phase::CyclePhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
  #[default]
  En,
  Zh,
}

impl Locale {
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "en" | "en-us" | "en-gb" => Some(Locale::En),
      "zh" | "zh-cn" | "zh-hans" => Some(Locale::Zh),
      _ => None,
    }
  }
}

/// What the classifier produced for one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdviceKey {
  pub metric: Metric,
  pub status: Status,
  pub phase: Option<CyclePhase>,
}

struct Entry {
  metric: Metric,
  status: Status,
  phase: Option<CyclePhase>,
  en: &'static str,
  zh: &'static str,
}

impl Entry {
  fn text(&self, locale: Locale) -> &'static str {
    match locale {
      Locale::En => self.en,
      Locale::Zh => self.zh,
    }
  }
}

const fn entry(
  metric: Metric,
  status: Status,
  phase: Option<CyclePhase>,
  en: &'static str,
  zh: &'static str,
) -> Entry {
  Entry { metric, status, phase, en, zh }
}

const FSH: Metric = Metric::Hormone(Hormone::Fsh);
const LH: Metric = Metric::Hormone(Hormone::Lh);
const E2: Metric = Metric::Hormone(Hormone::E2);
const P4: Metric = Metric::Hormone(Hormone::P4);
const PRL: Metric = Metric::Hormone(Hormone::Prl);
const T: Metric = Metric::Hormone(Hormone::T);
const AMH: Metric = Metric::Hormone(Hormone::Amh);

const EARLY: Option<CyclePhase> = Some(CyclePhase::EarlyFollicular);
const OVULATORY: Option<CyclePhase> = Some(CyclePhase::Ovulatory);
const LUTEAL: Option<CyclePhase> = Some(CyclePhase::Luteal);

static DICTIONARY: &[Entry] = &[
  // FSH
  entry(
    FSH,
    Status::High,
    EARLY,
    "FSH is elevated in the early follicular phase, suggesting diminished ovarian reserve. Consider an AMH test and an antral follicle count.",
    "卵泡早期 FSH 偏高：提示卵巢储备下降，建议检查 AMH 并做窦卵泡计数。",
  ),
  entry(
    FSH,
    Status::High,
    None,
    "FSH is above the reference range, which can indicate declining ovarian reserve or premature ovarian insufficiency. Repeat on cycle day 2-5 for a reliable reading.",
    "FSH 高于参考范围：可能提示卵巢储备下降或卵巢早衰，建议在月经第 2-5 天复查。",
  ),
  entry(
    FSH,
    Status::Low,
    None,
    "FSH is below the reference range, which may reflect hypothalamic-pituitary suppression. A repeat test is recommended.",
    "FSH 偏低：可能存在下丘脑-垂体抑制（低促性腺激素状态），建议复查。",
  ),
  // LH
  entry(
    LH,
    Status::High,
    None,
    "LH is elevated. Together with an irregular cycle this may point to PCOS; an insulin resistance work-up is advised.",
    "LH 偏高：结合月经不规律需考虑多囊卵巢综合征，建议评估胰岛素抵抗。",
  ),
  entry(
    LH,
    Status::Low,
    None,
    "LH is low, consistent with hypothalamic-pituitary suppression. Review stress, recent weight change and hormonal medication.",
    "LH 偏低：符合下丘脑-垂体抑制表现，建议回顾压力、体重变化及激素类药物使用情况。",
  ),
  // E2
  entry(
    E2,
    Status::High,
    EARLY,
    "E2 is high for the early follicular phase, suggesting several developing follicles or a high ovarian response. Close monitoring is advised.",
    "卵泡早期 E2 偏高：提示多卵泡发育或卵巢高反应，需密切监测。",
  ),
  entry(
    E2,
    Status::High,
    None,
    "E2 is markedly elevated. Rule out ovarian hyperstimulation (OHSS) or another source of excess estrogen.",
    "E2 明显偏高：警惕卵巢过度刺激综合征（OHSS）或其他雌激素来源。",
  ),
  entry(
    E2,
    Status::Low,
    None,
    "E2 is low, suggesting insufficient follicular development. Follicle monitoring by ultrasound is recommended.",
    "E2 偏低：提示卵泡发育不良，建议超声监测卵泡。",
  ),
  // P4
  entry(
    P4,
    Status::High,
    EARLY,
    "Progesterone is elevated in the follicular phase, possibly from a residual corpus luteum. Recheck early in the next cycle.",
    "卵泡期孕酮偏高：可能存在黄体残留，建议下个周期早期复查。",
  ),
  entry(
    P4,
    Status::High,
    OVULATORY,
    "Progesterone is rising before the luteal phase, which can indicate premature luteinisation.",
    "排卵前孕酮升高：可能提示卵泡提前黄素化。",
  ),
  entry(
    P4,
    Status::High,
    LUTEAL,
    "Progesterone is above the usual luteal range. Confirm pregnancy status and any progesterone supplementation.",
    "黄体期孕酮高于常见范围：请确认是否妊娠或正在补充孕酮。",
  ),
  entry(
    P4,
    Status::Low,
    LUTEAL,
    "Luteal progesterone is low, suggesting luteal phase insufficiency. Luteal support may be considered.",
    "黄体期孕酮偏低：提示黄体功能不足，可考虑黄体支持。",
  ),
  entry(
    P4,
    Status::Low,
    None,
    "Progesterone is low, suggesting luteal phase insufficiency. Recheck in the mid-luteal phase (about day 21).",
    "孕酮偏低：提示黄体功能不足，建议在黄体中期（约第 21 天）复查。",
  ),
  entry(
    P4,
    Status::Normal,
    LUTEAL,
    "Luteal progesterone is within the normal range.",
    "黄体期孕酮正常。",
  ),
  // PRL
  entry(
    PRL,
    Status::High,
    None,
    "Prolactin is elevated. Rule out stress and medication effects; a pituitary MRI is advised if it stays high.",
    "泌乳素偏高：需排查压力和药物影响，持续升高建议垂体 MRI 检查。",
  ),
  entry(
    PRL,
    Status::Low,
    None,
    "Prolactin is low. This is uncommon and can be observed if there are no symptoms.",
    "泌乳素偏低（少见）：如无症状可观察。",
  ),
  // T
  entry(
    T,
    Status::High,
    None,
    "Testosterone is elevated, indicating a hyperandrogenic state that may relate to PCOS or the adrenal glands. A DHEA-S test is advised.",
    "睾酮偏高：提示高雄激素状态，可能与多囊卵巢综合征或肾上腺有关，建议检查 DHEA-S。",
  ),
  entry(
    T,
    Status::Low,
    None,
    "Testosterone is low, which can accompany reduced ovarian reserve.",
    "睾酮偏低：可能与卵巢储备较差有关。",
  ),
  // AMH
  entry(
    AMH,
    Status::Low,
    None,
    "AMH is low, indicating reduced ovarian reserve.",
    "AMH 偏低：提示卵巢储备下降。",
  ),
  entry(
    AMH,
    Status::High,
    None,
    "AMH is high, a pattern common in PCOS.",
    "AMH 偏高：常见于多囊卵巢综合征。",
  ),
  // Derived metrics
  entry(
    Metric::LhFshRatio,
    Status::High,
    None,
    "The LH/FSH ratio is above 2. Screen for polycystic ovary syndrome (PCOS).",
    "LH/FSH > 2：需排查多囊卵巢综合征（PCOS）。",
  ),
  entry(
    Metric::OvarianReserve,
    Status::Low,
    None,
    "Age over 35 with AMH below 1.0 ng/mL indicates significantly diminished ovarian reserve. A fertility assessment is recommended.",
    "年龄 > 35 且 AMH < 1.0：卵巢储备显著下降，建议尽早进行助孕评估。",
  ),
  entry(
    Metric::Ovulation,
    Status::Low,
    None,
    "Mid-luteal progesterone below 3 ng/mL suggests this cycle was anovulatory.",
    "黄体中期孕酮 < 3 ng/mL：提示本周期可能未排卵。",
  ),
];

const NORMAL_EN: &str =
  "All measured values are within their reference ranges. Maintain a healthy lifestyle.";
const NORMAL_ZH: &str = "各项指标均在参考范围内，未发现显著异常，请保持健康的生活方式。";

pub fn normal_text(locale: Locale) -> &'static str {
  match locale {
    Locale::En => NORMAL_EN,
    Locale::Zh => NORMAL_ZH,
  }
}

/// Look up the advisory string for a key, preferring a phase-specific entry
pub fn advisory_text(
  metric: Metric,
  status: Status,
  phase: Option<CyclePhase>,
  locale: Locale,
) -> Option<&'static str> {
  let find = |p: Option<CyclePhase>| {
    DICTIONARY
      .iter()
      .find(|e| e.metric == metric && e.status == status && e.phase == p)
  };

  phase
    .and_then(|p| find(Some(p)))
    .or_else(|| find(None))
    .map(|e| e.text(locale))
}

/// Resolve keys to strings, drop duplicates, and fall back to the generic
/// normal message when nothing matched
pub fn collect_advice<I>(keys: I, locale: Locale) -> Vec<String>
where
  I: IntoIterator<Item = AdviceKey>,
{
  let mut advice: Vec<String> = Vec::new();

  for key in keys {
    if let Some(text) = advisory_text(key.metric, key.status, key.phase, locale) {
      if !advice.iter().any(|a| a == text) {
        advice.push(text.to_string());
      }
    }
  }

  if advice.is_empty() {
    advice.push(normal_text(locale).to_string());
  }

  advice
}
