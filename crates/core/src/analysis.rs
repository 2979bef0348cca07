use serde_json::Value;

use crate::{
    config::Config,
    error::{PinocchioError, Result},
    types::{AnalysisRequest, AnalysisResult},
};

pub const ANALYZE_PATH: &str = "/api/analyze";

/// Client for the misinformation scoring service.
#[derive(Debug, Clone)]
pub struct ScoringClient {
    client: reqwest::Client,
    api_base_url: String,
}

impl ScoringClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, &config.api_base_url))
    }

    pub fn with_client(client: reqwest::Client, api_base_url: &str) -> Self {
        Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.api_base_url, ANALYZE_PATH)
    }

    /// Submit content for scoring.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let url = self.analyze_url();
        tracing::debug!(%url, title = %request.title, chars = request.content.len(), "POST");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // The service reports failures as `{"error": "..."}`, with or without
        // an error status.
        let parsed = serde_json::from_str::<Value>(&body);
        if let Some(reason) = parsed
            .as_ref()
            .ok()
            .and_then(|v| v.get("error"))
            .and_then(Value::as_str)
        {
            return Err(PinocchioError::AnalysisRejected {
                reason: reason.to_string(),
            });
        }

        if !status.is_success() {
            return Err(PinocchioError::ApiStatus {
                url,
                status: status.as_u16(),
            });
        }

        let result: AnalysisResult = serde_json::from_value(parsed?)?;
        Ok(result)
    }
}
