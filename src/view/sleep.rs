//! Sleep view

use serde::Serialize;

use crate::chart::{render_bars, ChartSeries};
use crate::sleep::{to_chart_series, NightlySleep, SleepStats};

const DISPLAY_PLACES: i32 = 2;
const BAR_WIDTH: usize = 40;

/// Everything the sleep page shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepView {
    /// Nights with hours rounded for display
    pub nights: Vec<NightlySleep>,
    /// Stats over the unrounded series
    pub stats: Option<SleepStats>,
    pub chart: ChartSeries,
}

impl SleepView {
    /// Build from an unrounded aggregator result
    pub fn new(nights: &[NightlySleep]) -> Self {
        let rounded: Vec<NightlySleep> = nights.iter().map(|n| n.rounded(DISPLAY_PLACES)).collect();

        Self {
            stats: SleepStats::from_nights(nights),
            chart: to_chart_series(&rounded),
            nights: rounded,
        }
    }
}

pub fn render_sleep(view: &SleepView) -> String {
    let Some(stats) = &view.stats else {
        return "No sleep data found.\n".to_string();
    };

    let mut out = format!("{:<12} {:>6}\n", "Night", "Hours");
    out.push_str(&format!("{}\n", "-".repeat(19)));
    for night in &view.nights {
        out.push_str(&format!("{:<12} {:>6.2}\n", night.date_key(), night.hours));
    }

    out.push('\n');
    out.push_str(&format!(
        "Average: {:.2} h over {} nights\n",
        stats.average_hours, stats.nights
    ));
    out.push_str(&format!(
        "Shortest: {} ({:.2} h)\n",
        stats.shortest.date_key(),
        stats.shortest.hours
    ));
    out.push_str(&format!(
        "Longest: {} ({:.2} h)\n",
        stats.longest.date_key(),
        stats.longest.hours
    ));

    out.push('\n');
    out.push_str(&render_bars(&view.chart, BAR_WIDTH));
    out
}
