//! Chart data and SVG rendering for an assessment
//!
//! Hormones use different units, so every value is scaled against the upper
//! bound of its own reference interval: the band always ends at 1.0 and the
//! measured value lands relative to it. An interval with no upper bound is
//! drawn up to twice its lower bound.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::assessment::AssessmentReport;
use crate::models::Status;

/// Normalised values are clipped here when drawn
const MAX_SCALE: f64 = 2.0;

/// Band ceiling for an open-ended interval, as a multiple of its lower bound
const OPEN_BAND_SCALE: f64 = 2.0;

const COLOR_NORMAL: &str = "#2e7d32";
const COLOR_LOW: &str = "#1565c0";
const COLOR_HIGH: &str = "#c62828";
const COLOR_BAND: &str = "#c8e6c9";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
  #[default]
  Bar,
  Radar,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPoint {
  pub label: String,
  pub unit: String,
  pub value: f64,
  pub low: f64,
  pub high: Option<f64>,
  /// Printable interval, e.g. "2-12" or ">= 1.5"
  pub range: String,
  pub status: Status,
  /// value / high
  pub normalized_value: f64,
  /// low / high
  pub normalized_low: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartData {
  pub points: Vec<ChartPoint>,
}

impl ChartData {
  pub fn from_report(report: &AssessmentReport) -> Self {
    let points = report
      .rows
      .iter()
      .map(|row| {
        let ceiling = row
          .interval
          .high
          .unwrap_or(row.interval.low * OPEN_BAND_SCALE);
        let scale = |v: f64| if ceiling > 0.0 { v / ceiling } else { 0.0 };
        ChartPoint {
          label: row.label.clone(),
          unit: row.unit.clone(),
          value: row.value,
          low: row.interval.low,
          high: row.interval.high,
          range: row.interval.to_string(),
          status: row.status,
          normalized_value: scale(row.value),
          normalized_low: scale(row.interval.low),
        }
      })
      .collect();

    Self { points }
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }
}

fn status_color(status: Status) -> &'static str {
  match status {
    Status::Low => COLOR_LOW,
    Status::Normal => COLOR_NORMAL,
    Status::High => COLOR_HIGH,
  }
}

fn clip(v: f64) -> f64 {
  v.clamp(0.0, MAX_SCALE)
}

/// Render the chart as a standalone SVG document
pub fn render_svg(data: &ChartData, kind: ChartKind) -> String {
  match kind {
    ChartKind::Radar if data.points.len() >= 3 => render_radar(data),
    _ => render_bar(data),
  }
}

/// ---------------------------------------------------------------------------
/// Bar
/// ---------------------------------------------------------------------------

const BAR_WIDTH: f64 = 640.0;
const BAR_ROW: f64 = 36.0;
const BAR_LEFT: f64 = 70.0;
const BAR_RIGHT: f64 = 150.0;
const BAR_TOP: f64 = 20.0;

fn render_bar(data: &ChartData) -> String {
  let plot_width = BAR_WIDTH - BAR_LEFT - BAR_RIGHT;
  let height = BAR_TOP * 2.0 + BAR_ROW * data.points.len().max(1) as f64;
  let x_of = |norm: f64| BAR_LEFT + clip(norm) / MAX_SCALE * plot_width;

  let mut svg = format!(
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#,
    w = BAR_WIDTH,
    h = height
  );

  for (i, p) in data.points.iter().enumerate() {
    let y = BAR_TOP + BAR_ROW * i as f64;
    let band_x = x_of(p.normalized_low);
    let band_w = x_of(1.0) - band_x;

    svg.push_str(&format!(
      r#"<text x="{}" y="{:.1}" text-anchor="end">{}</text>"#,
      BAR_LEFT - 8.0,
      y + 18.0,
      p.label
    ));
    svg.push_str(&format!(
      r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="24" fill="{}"/>"#,
      band_x,
      y + 4.0,
      band_w.max(1.0),
      COLOR_BAND
    ));
    svg.push_str(&format!(
      r#"<rect class="bar" x="{:.1}" y="{:.1}" width="{:.1}" height="14" fill="{}"/>"#,
      BAR_LEFT,
      y + 9.0,
      x_of(p.normalized_value) - BAR_LEFT,
      status_color(p.status)
    ));
    svg.push_str(&format!(
      r#"<text x="{:.1}" y="{:.1}">{} {} ({})</text>"#,
      BAR_WIDTH - BAR_RIGHT + 8.0,
      y + 18.0,
      p.value,
      p.unit,
      p.range.replace('>', "&gt;")
    ));
  }

  svg.push_str("</svg>");
  svg
}

/// ---------------------------------------------------------------------------
/// Radar
/// ---------------------------------------------------------------------------

const RADAR_SIZE: f64 = 420.0;
const RADAR_RADIUS: f64 = 150.0;

fn radar_point(index: usize, count: usize, norm: f64) -> (f64, f64) {
  let center = RADAR_SIZE / 2.0;
  let angle = -PI / 2.0 + 2.0 * PI * index as f64 / count as f64;
  let r = clip(norm) / MAX_SCALE * RADAR_RADIUS;
  (center + r * angle.cos(), center + r * angle.sin())
}

fn polygon<F>(count: usize, norm_of: F) -> String
where
  F: Fn(usize) -> f64,
{
  (0..count)
    .map(|i| {
      let (x, y) = radar_point(i, count, norm_of(i));
      format!("{:.1},{:.1}", x, y)
    })
    .collect::<Vec<_>>()
    .join(" ")
}

fn render_radar(data: &ChartData) -> String {
  let n = data.points.len();
  let center = RADAR_SIZE / 2.0;

  let mut svg = format!(
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="{s}" height="{s}" viewBox="0 0 {s} {s}" font-family="sans-serif" font-size="12">"#,
    s = RADAR_SIZE
  );

  // Band: high polygon filled, low polygon punched out in white
  svg.push_str(&format!(
    r#"<polygon points="{}" fill="{}"/>"#,
    polygon(n, |_| 1.0),
    COLOR_BAND
  ));
  svg.push_str(&format!(
    r##"<polygon points="{}" fill="#ffffff"/>"##,
    polygon(n, |i| data.points[i].normalized_low)
  ));

  for (i, p) in data.points.iter().enumerate() {
    let (ax, ay) = radar_point(i, n, MAX_SCALE);
    svg.push_str(&format!(
      r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#9e9e9e"/>"##,
      center, center, ax, ay
    ));
    let (lx, ly) = radar_point(i, n, MAX_SCALE * 1.12);
    svg.push_str(&format!(
      r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
      lx, ly, p.label
    ));
  }

  svg.push_str(&format!(
    r##"<polygon class="measured" points="{}" fill="none" stroke="#424242" stroke-width="2"/>"##,
    polygon(n, |i| data.points[i].normalized_value)
  ));

  for (i, p) in data.points.iter().enumerate() {
    let (x, y) = radar_point(i, n, p.normalized_value);
    svg.push_str(&format!(
      r#"<circle cx="{:.1}" cy="{:.1}" r="4" fill="{}"/>"#,
      x,
      y,
      status_color(p.status)
    ));
  }

  svg.push_str("</svg>");
  svg
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
