//! CSV fallback analysis path
//!
//! Wraps one complaint into a single-row CSV upload for the batch endpoint
//! `POST {base}/analyze/csv` and takes the first record of the response.
//! Only used after the direct path has failed.

use async_trait::async_trait;
use grievance_common::AnalysisData;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

use super::{build_http_client, AnalysisError, Analyzer};

const CSV_HEADER: &str = "raw_text";
const CSV_FILE_NAME: &str = "grievance.csv";

/// Batch endpoint response; only `processed_complaints` is read
#[derive(Debug, Deserialize)]
struct BatchEnvelope {
    #[serde(default)]
    processed_complaints: Option<Vec<AnalysisData>>,
}

/// Single-row CSV document: header `raw_text`, one quoted value
///
/// Internal double quotes are doubled (RFC 4180), so commas, quotes and
/// newlines in the text survive a standard CSV parser unchanged.
pub fn single_row_csv(text: &str) -> String {
    format!("{}\n\"{}\"\n", CSV_HEADER, text.replace('"', "\"\""))
}

/// Client for the batch CSV analysis endpoint
#[derive(Clone)]
pub struct CsvAnalysisAdapter {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl CsvAnalysisAdapter {
    /// `base_url` without trailing slash, e.g. `http://localhost:8000`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AnalysisError> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            base_url: base_url.into(),
            timeout,
        })
    }

    /// Classify one complaint through the batch pipeline
    pub async fn analyze_via_csv(&self, text: &str) -> Result<AnalysisData, AnalysisError> {
        let url = format!("{}/analyze/csv", self.base_url);
        let payload = single_row_csv(text);
        tracing::debug!(url = %url, bytes = payload.len(), "Submitting single-row CSV for analysis");

        let part = Part::text(payload)
            .file_name(CSV_FILE_NAME)
            .mime_str("text/csv")
            .map_err(|e| AnalysisError::Network(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AnalysisError::from_reqwest(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(AnalysisError::from_status(response).await);
        }

        let envelope: BatchEnvelope = response
            .json()
            .await
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;

        // One row was sent, but never assume one record came back
        let records = envelope.processed_complaints.unwrap_or_default();
        let record_count = records.len();
        let data = records.into_iter().next().ok_or(AnalysisError::EmptyBatch)?;

        tracing::info!(
            category = %data.category,
            records = record_count,
            "CSV analysis successful"
        );

        Ok(data)
    }
}

#[async_trait]
impl Analyzer for CsvAnalysisAdapter {
    fn source_id(&self) -> &'static str {
        "csv"
    }

    async fn analyze(&self, text: &str) -> Result<AnalysisData, AnalysisError> {
        self.analyze_via_csv(text).await
    }
}
