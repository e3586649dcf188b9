//! Response types for the insights and timeseries endpoints

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Body of `GET /metrics/insights`
#[derive(Debug, Clone, Deserialize)]
pub struct InsightsResponse {
    pub insights: HeartInsights,
}

/// Heart health insights computed by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeartInsights {
    pub risk_assessment: RiskAssessment,
    /// Newline-separated paragraphs
    pub ai_explanation: String,
    pub personalized_insights: PersonalizedInsights,
    pub summary: DataSummary,
    pub training_recommendations: TrainingRecommendations,
}

/// A risk score as sent by the backend, number or label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RiskScore {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for RiskScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskScore::Number(n) if n.fract() == 0.0 => write!(f, "{:.0}", n),
            RiskScore::Number(n) => write!(f, "{}", n),
            RiskScore::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskAssessment {
    pub risk_score: Option<RiskScore>,
    pub risk_category: String,
    /// "green", "yellow" or anything else (treated as red)
    pub risk_color: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PersonalizedInsights {
    pub insights: Vec<PersonalInsight>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PersonalInsight {
    /// "positive" or a warning kind
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub recommendation: String,
}

impl PersonalInsight {
    pub fn is_positive(&self) -> bool {
        self.kind == "positive"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataSummary {
    pub current_fitness_level: String,
    /// Percentage, 0-100
    pub data_completeness: f64,
    /// ISO-8601 timestamp
    pub last_updated: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingRecommendations {
    pub recommendation: String,
    pub intensity: String,
    pub frequency: String,
    pub duration: String,
    /// Zone identifiers such as `zone_2_aerobic`
    pub zones_to_focus: Vec<String>,
}

/// Body of `GET /metrics/timeseries`: a rendered chart as base64 PNG
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeseriesImage {
    pub image_base64: Option<String>,
}

impl TimeseriesImage {
    /// Whether an image was returned
    pub fn is_available(&self) -> bool {
        self.image_base64.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    /// Decoded PNG bytes, `Ok(None)` when no image was returned
    pub fn png_bytes(&self) -> Result<Option<Vec<u8>>, base64::DecodeError> {
        match self.image_base64.as_deref().map(str::trim) {
            Some(encoded) if !encoded.is_empty() => base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map(Some),
            _ => Ok(None),
        }
    }
}
