//! Heart health view

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::client::{HeartInsights, PersonalInsight, TimeseriesImage};
use crate::records::{parse_timestamp, ReportZone};

/// Risk colour, normalized: anything not green or yellow is red
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Green,
    Yellow,
    Red,
}

impl RiskLevel {
    pub fn from_color(color: &str) -> Self {
        match color {
            "green" => RiskLevel::Green,
            "yellow" => RiskLevel::Yellow,
            _ => RiskLevel::Red,
        }
    }

    fn marker(&self) -> &'static str {
        match self {
            RiskLevel::Green => "(green)",
            RiskLevel::Yellow => "(yellow)",
            RiskLevel::Red => "(red)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskPanel {
    pub score: String,
    pub category: String,
    pub level: RiskLevel,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightCard {
    pub positive: bool,
    pub title: String,
    pub message: String,
    pub recommendation: String,
}

impl From<&PersonalInsight> for InsightCard {
    fn from(insight: &PersonalInsight) -> Self {
        Self {
            positive: insight.is_positive(),
            title: insight.title.clone(),
            message: insight.message.clone(),
            recommendation: insight.recommendation.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryPanel {
    pub fitness_level: String,
    pub data_completeness: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingPanel {
    pub recommendation: String,
    pub intensity: String,
    pub frequency: String,
    pub duration: String,
    pub focus_zones: Vec<String>,
}

/// Everything the heart health page shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartView {
    pub risk: RiskPanel,
    pub summary_paragraphs: Vec<String>,
    pub insights: Vec<InsightCard>,
    pub summary: SummaryPanel,
    pub training: TrainingPanel,
    #[serde(serialize_with = "serialize_image")]
    pub heart_rate_image: TimeseriesImage,
    #[serde(serialize_with = "serialize_image")]
    pub resting_heart_rate_image: TimeseriesImage,
}

impl HeartView {
    /// Build the view from the three heart health responses
    pub fn build(
        insights: HeartInsights,
        heart_rate_image: TimeseriesImage,
        resting_heart_rate_image: TimeseriesImage,
        zone: ReportZone,
    ) -> Self {
        let risk = &insights.risk_assessment;
        let summary = &insights.summary;
        let training = &insights.training_recommendations;

        Self {
            risk: RiskPanel {
                score: risk
                    .risk_score
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                category: risk.risk_category.clone(),
                level: RiskLevel::from_color(&risk.risk_color),
                recommendations: risk.recommendations.clone(),
            },
            summary_paragraphs: split_paragraphs(&insights.ai_explanation),
            insights: insights
                .personalized_insights
                .insights
                .iter()
                .map(InsightCard::from)
                .collect(),
            summary: SummaryPanel {
                fitness_level: summary.current_fitness_level.clone(),
                data_completeness: format!("{}%", summary.data_completeness),
                last_updated: format_local(&summary.last_updated, zone),
            },
            training: TrainingPanel {
                recommendation: training.recommendation.clone(),
                intensity: training.intensity.clone(),
                frequency: training.frequency.clone(),
                duration: training.duration.clone(),
                focus_zones: training
                    .zones_to_focus
                    .iter()
                    .map(|zone| zone.replace('_', " "))
                    .collect(),
            },
            heart_rate_image,
            resting_heart_rate_image,
        }
    }
}

/// `{"available": bool, "image_base64": ...}`
fn serialize_image<S: Serializer>(image: &TimeseriesImage, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("TimeseriesImage", 2)?;
    state.serialize_field("available", &image.is_available())?;
    state.serialize_field("image_base64", &image.image_base64)?;
    state.end()
}

/// Non-blank lines of an explanation
fn split_paragraphs(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Timestamp in the report zone, or the raw text if it does not parse
fn format_local(timestamp: &str, zone: ReportZone) -> String {
    parse_timestamp(timestamp, zone)
        .map(|instant| zone.to_local(instant).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

pub fn render_heart(view: &HeartView) -> String {
    let mut out = String::new();

    out.push_str("Risk Assessment\n");
    out.push_str(&format!(
        "  {}  {} {}\n",
        view.risk.score,
        view.risk.category,
        view.risk.level.marker()
    ));
    if !view.risk.recommendations.is_empty() {
        out.push_str("  Recommendations:\n");
        for rec in &view.risk.recommendations {
            out.push_str(&format!("    - {}\n", rec));
        }
    }

    out.push_str("\nAI Summary\n");
    for paragraph in &view.summary_paragraphs {
        out.push_str(&format!("  {}\n", paragraph));
    }

    if !view.insights.is_empty() {
        out.push_str("\nPersonalized Insights\n");
        for card in &view.insights {
            let mark = if card.positive { "+" } else { "!" };
            out.push_str(&format!("  [{}] {}\n", mark, card.title));
            out.push_str(&format!("      {}\n", card.message));
            out.push_str(&format!("      Recommendation: {}\n", card.recommendation));
        }
    }

    out.push_str("\nData Summary\n");
    out.push_str(&format!("  Fitness Level: {}\n", view.summary.fitness_level));
    out.push_str(&format!("  Data Completeness: {}\n", view.summary.data_completeness));
    out.push_str(&format!("  Last Updated: {}\n", view.summary.last_updated));

    out.push_str("\nTraining Recommendations\n");
    out.push_str(&format!("  Recommendation: {}\n", view.training.recommendation));
    out.push_str(&format!("  Intensity: {}\n", view.training.intensity));
    out.push_str(&format!("  Frequency: {}\n", view.training.frequency));
    out.push_str(&format!("  Duration: {}\n", view.training.duration));
    out.push_str(&format!("  Focus Zones: {}\n", view.training.focus_zones.join(", ")));

    out.push_str("\nTimeseries\n");
    out.push_str(&image_line("Heart rate", &view.heart_rate_image));
    out.push_str(&image_line("Resting heart rate", &view.resting_heart_rate_image));

    out
}

fn image_line(label: &str, image: &TimeseriesImage) -> String {
    if image.is_available() {
        format!("  {}: chart available (use --save-images to write it)\n", label)
    } else {
        format!("  {}: no image available\n", label)
    }
}
