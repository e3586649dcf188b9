//! Backend REST API Client
//!
//! HTTP client for the OwnMyHealth backend:
//!
//! - `POST /upload` - multipart health export upload
//! - `GET /metrics/insights?metrics=...` - heart health insights
//! - `GET /metrics/timeseries?metric=...&decompose=...` - chart image
//! - `GET /records` - parsed records

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use super::dto::{HeartInsights, InsightsResponse, TimeseriesImage};
use super::error::{ClientError, ClientResult};
use super::HealthGateway;
use crate::config::ApiConfig;
use crate::records::{normalize_records, HealthRecord, UploadSummary};

const UNKNOWN_UPLOAD_ERROR: &str = "An unknown error occurred during upload.";

/// REST client for the backend
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client from the `[api]` config section
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client for `base_url` with default settings
    pub fn with_base_url(base_url: &str) -> ClientResult<Self> {
        Self::new(&ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_connect() {
            ClientError::Unavailable(self.base_url.clone())
        } else {
            ClientError::Request(e)
        }
    }

    /// GET a JSON body, surfacing non-success statuses and `error` fields
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> ClientResult<Value> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: Value = response.json().await.map_err(|e| self.transport_error(e))?;

        if let Some(message) = body.get("error").and_then(body_error) {
            return Err(ClientError::Backend(message));
        }

        Ok(body)
    }
}

/// Message for a truthy `error` field; `null`, `false`, `0` and `""` are not errors
fn body_error(error: &Value) -> Option<String> {
    match error {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Build an `Api` error from a non-success response
///
/// Uses the body's `message` (or `error`) field when present.
async fn error_from_response(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("message")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP error! status: {}", status));

    ClientError::Api { status, message }
}

#[async_trait]
impl HealthGateway for ApiClient {
    async fn upload(&self, path: &Path) -> ClientResult<UploadSummary> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "export".to_string());

        tracing::info!(file = %file_name, size = bytes.len(), "Uploading health export");

        let part = multipart::Part::bytes(bytes).file_name(file_name);
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            // An unreadable error body gets a generic message; a readable
            // one without `message` falls back to the status.
            let message = match response.json::<Value>().await {
                Ok(body) => body
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP error! status: {}", status)),
                Err(_) => UNKNOWN_UPLOAD_ERROR.to_string(),
            };
            return Err(ClientError::Api { status, message });
        }

        let summary: UploadSummary = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            records_loaded = summary.records_loaded,
            records_returned = summary.records.len(),
            "Upload accepted"
        );

        Ok(summary)
    }

    async fn insights(&self, metrics: &str) -> ClientResult<HeartInsights> {
        let body = self
            .get_json("/metrics/insights", &[("metrics", metrics.to_string())])
            .await?;

        let response: InsightsResponse = serde_json::from_value(body)
            .map_err(|e| ClientError::InvalidResponse(format!("insights: {}", e)))?;
        Ok(response.insights)
    }

    async fn timeseries(&self, metric: &str, decompose: bool) -> ClientResult<TimeseriesImage> {
        let body = self
            .get_json(
                "/metrics/timeseries",
                &[
                    ("metric", metric.to_string()),
                    ("decompose", decompose.to_string()),
                ],
            )
            .await?;

        serde_json::from_value(body)
            .map_err(|e| ClientError::InvalidResponse(format!("timeseries: {}", e)))
    }

    async fn records(&self, record_type: Option<&str>) -> ClientResult<Vec<HealthRecord>> {
        let query: Vec<(&str, String)> = record_type
            .map(|t| vec![("type", t.to_string())])
            .unwrap_or_default();

        let body = self.get_json("/records", &query).await?;
        let records = normalize_records(body)?;

        tracing::debug!(count = records.len(), record_type = ?record_type, "Fetched records");
        Ok(records)
    }
}
