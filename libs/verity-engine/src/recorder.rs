/// Submission Recorder - Client for the Recording Service
///
/// Only fully passing submissions are recorded. Identity travels explicitly
/// with each call; the client holds no session state.
use crate::error::RecorderError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};
use verity_common::config::EngineConfig;
use verity_common::language::Language;
use verity_common::types::{GradingReport, TestResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    pub challenge_id: String,
    pub code: String,
    pub language: Language,
    pub results: Vec<TestResult>,
    pub passed: bool,
    pub execution_time: u64,
}

impl RecordRequest {
    /// Build a request from a report; refuses reports that did not pass
    pub fn from_report(
        challenge_id: &str,
        code: &str,
        language: Language,
        report: &GradingReport,
    ) -> Result<Self, RecorderError> {
        if !report.all_passed {
            return Err(RecorderError::NotAllPassed);
        }

        Ok(Self {
            challenge_id: challenge_id.to_string(),
            code: code.to_string(),
            language,
            results: report.results.clone(),
            passed: true,
            execution_time: report.execution_time,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub success: bool,
    #[serde(default)]
    pub badge_awarded: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubmissionRecorder {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl SubmissionRecorder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `None` when no recorder URL is configured
    pub fn from_config(config: &EngineConfig) -> Option<Self> {
        config
            .recorder_url
            .as_ref()
            .map(|url| Self::new(url).with_timeout(config.recorder_timeout))
    }

    #[instrument(skip(self, request, auth_token), fields(challenge = %request.challenge_id))]
    pub async fn record(
        &self,
        request: &RecordRequest,
        auth_token: Option<&str>,
    ) -> Result<RecordResponse, RecorderError> {
        if !request.passed {
            return Err(RecorderError::NotAllPassed);
        }

        let url = format!("{}/submissions", self.base_url);
        let mut builder = self.client.post(&url).json(request).timeout(self.timeout);
        if let Some(token) = auth_token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RecorderError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RecorderError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(RecorderError::Http {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: RecordResponse =
            serde_json::from_str(&body).map_err(|e| RecorderError::Decode(e.to_string()))?;

        info!(
            success = parsed.success,
            badge = parsed.badge_awarded.as_deref().unwrap_or("none"),
            "Submission recorded"
        );

        Ok(parsed)
    }
}
