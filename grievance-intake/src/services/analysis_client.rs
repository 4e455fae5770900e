//! Direct analysis client
//!
//! One request per complaint to `POST {base}/analyze/single`. No retries at
//! this layer; the orchestrator falls back to the CSV path instead.

use async_trait::async_trait;
use grievance_common::AnalysisData;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{build_http_client, AnalysisError, Analyzer};

/// Body of `POST /analyze/single`
#[derive(Debug, Serialize)]
struct SingleAnalysisRequest<'a> {
    raw_text: &'a str,
}

/// Body of the analysis service's `GET /health`
#[derive(Debug, Default, Deserialize)]
struct HealthBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Analysis service health as seen from this service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub reachable: bool,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Why the service is considered unreachable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Client for the single-text classification endpoint
#[derive(Clone)]
pub struct AnalysisClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl AnalysisClient {
    /// `base_url` without trailing slash, e.g. `http://localhost:8000`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AnalysisError> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            base_url: base_url.into(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Classify one complaint
    ///
    /// Network failures, timeouts and any non-2xx status all surface as
    /// [`AnalysisError`].
    pub async fn analyze_single(&self, text: &str) -> Result<AnalysisData, AnalysisError> {
        let url = format!("{}/analyze/single", self.base_url);
        tracing::debug!(url = %url, chars = text.len(), "Requesting direct analysis");

        let response = self
            .http_client
            .post(&url)
            .json(&SingleAnalysisRequest { raw_text: text })
            .send()
            .await
            .map_err(|e| AnalysisError::from_reqwest(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(AnalysisError::from_status(response).await);
        }

        let data: AnalysisData = response
            .json()
            .await
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;

        tracing::info!(
            category = %data.category,
            sentiment = %data.sentiment,
            urgency = %data.urgency,
            "Direct analysis successful"
        );

        Ok(data)
    }

    /// Read-only health probe of the analysis service; never fails
    pub async fn check_status(&self) -> ServiceStatus {
        let url = format!("{}/health", self.base_url);

        let unreachable = |error: String| ServiceStatus {
            reachable: false,
            base_url: self.base_url.clone(),
            status: None,
            message: None,
            error: Some(error),
        };

        let response = match self.http_client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return unreachable(AnalysisError::from_reqwest(e, self.timeout).to_string()),
        };

        if !response.status().is_success() {
            return unreachable(AnalysisError::from_status(response).await.to_string());
        }

        // A 2xx with an unexpected body still means the service is up
        let body: HealthBody = response.json().await.unwrap_or_default();

        ServiceStatus {
            reachable: true,
            base_url: self.base_url.clone(),
            status: body.status,
            message: body.message,
            error: None,
        }
    }
}

#[async_trait]
impl Analyzer for AnalysisClient {
    fn source_id(&self) -> &'static str {
        "direct"
    }

    async fn analyze(&self, text: &str) -> Result<AnalysisData, AnalysisError> {
        self.analyze_single(text).await
    }
}
