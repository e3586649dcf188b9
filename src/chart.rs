//! Chart series
//!
//! Point series in the `{x, y}` shape a time-axis charting front-end
//! consumes, plus a plain-text bar rendering for the terminal.

use serde::{Deserialize, Serialize};

/// A single chart point; `x` is a date string any Date parser accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: String,
    pub y: f64,
}

/// How a series should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// A labelled point series with a time-typed x axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub kind: ChartKind,
    pub unit: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn new(label: impl Into<String>, kind: ChartKind, unit: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind,
            unit: unit.into(),
            points: Vec::new(),
        }
    }

    /// Builder: append a point
    pub fn point(mut self, x: impl Into<String>, y: f64) -> Self {
        self.points.push(ChartPoint { x: x.into(), y });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest y value, if any
    pub fn max_y(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.y)
            .fold(None, |acc, y| Some(acc.map_or(y, |m: f64| m.max(y))))
    }
}

/// Draw a series as horizontal text bars, one row per point
///
/// Bars are scaled so the largest value spans `width` cells.
pub fn render_bars(series: &ChartSeries, width: usize) -> String {
    if series.is_empty() {
        return format!("{}: no data\n", series.label);
    }

    let max = series.max_y().unwrap_or(0.0);
    let label_width = series
        .points
        .iter()
        .map(|p| p.x.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("{} ({})\n", series.label, series.unit);
    for point in &series.points {
        let cells = if max > 0.0 && point.y > 0.0 {
            ((point.y / max) * width as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{:<label_width$} | {:<width$} {:.2}\n",
            point.x,
            "█".repeat(cells),
            point.y,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_serialization() {
        let series = ChartSeries::new("Sleep", ChartKind::Bar, "hours").point("2024-01-02", 8.0);
        let json = serde_json::to_value(&series).unwrap();

        assert_eq!(json["kind"], "bar");
        assert_eq!(json["points"][0]["x"], "2024-01-02");
        assert_eq!(json["points"][0]["y"], 8.0);
    }

    #[test]
    fn test_max_y() {
        let series = ChartSeries::new("s", ChartKind::Line, "u")
            .point("a", 2.0)
            .point("b", 7.5)
            .point("c", 3.0);
        assert_eq!(series.max_y(), Some(7.5));
        assert_eq!(ChartSeries::new("s", ChartKind::Line, "u").max_y(), None);
    }

    #[test]
    fn test_render_bars_scales_to_width() {
        let series = ChartSeries::new("Sleep", ChartKind::Bar, "hours")
            .point("2024-01-01", 4.0)
            .point("2024-01-02", 8.0);

        let out = render_bars(&series, 10);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Sleep (hours)");
        assert_eq!(lines[1].matches('█').count(), 5);
        assert_eq!(lines[2].matches('█').count(), 10);
        assert!(lines[2].ends_with("8.00"));
    }

    #[test]
    fn test_render_bars_empty() {
        let series = ChartSeries::new("Sleep", ChartKind::Bar, "hours");
        assert_eq!(render_bars(&series, 10), "Sleep: no data\n");
    }
}
