//! Backend Gateways
//!
//! The upload, insights and records endpoints behind one async trait so
//! page controllers can run against the real backend or a test double.
//!
//! - **api**: `ApiClient`, the `reqwest` implementation
//! - **dto**: response bodies for insights and timeseries
//! - **error**: error types

mod api;
mod dto;
mod error;

pub use api::ApiClient;
pub use dto::{
    DataSummary, HeartInsights, InsightsResponse, PersonalInsight, PersonalizedInsights,
    RiskAssessment, RiskScore, TimeseriesImage, TrainingRecommendations,
};
pub use error::{ClientError, ClientResult};

use async_trait::async_trait;
use std::path::Path;

use crate::records::{HealthRecord, UploadSummary};

/// Metrics group requested for the heart health page
pub const HEART_HEALTH: &str = "HeartHealth";

/// Operations the client needs from the backend
#[async_trait]
pub trait HealthGateway: Send + Sync {
    /// Upload a health export file
    async fn upload(&self, path: &Path) -> ClientResult<UploadSummary>;

    /// Fetch precomputed insights for a metrics group
    async fn insights(&self, metrics: &str) -> ClientResult<HeartInsights>;

    /// Fetch a rendered timeseries chart for one metric
    async fn timeseries(&self, metric: &str, decompose: bool) -> ClientResult<TimeseriesImage>;

    /// Fetch parsed records, optionally of one type
    async fn records(&self, record_type: Option<&str>) -> ClientResult<Vec<HealthRecord>>;
}
