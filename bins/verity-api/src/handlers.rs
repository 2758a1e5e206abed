// HTTP route handlers for the Verity API

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use verity_common::language::Language;
use verity_common::types::{Challenge, Difficulty, GradingReport, Submission, TestCase};
use verity_engine::recorder::RecordRequest;
use verity_engine::{GradingError, RecorderError};

use crate::metrics;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub code: String,
    /// Defaults to the challenge's language
    #[serde(default)]
    pub language: Option<Language>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeSummary {
    pub slug: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub language: Language,
    pub tags: Vec<String>,
}

/// A challenge as shown in the editor: hidden test cases never leave the
/// server
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeView {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub language: Language,
    pub starter_code: String,
    pub test_cases: Vec<TestCase>,
    pub hidden_test_count: usize,
    pub tags: Vec<String>,
}

impl From<&Challenge> for ChallengeView {
    fn from(challenge: &Challenge) -> Self {
        let visible: Vec<TestCase> = challenge
            .test_cases
            .iter()
            .filter(|tc| !tc.is_hidden)
            .cloned()
            .collect();
        let hidden_test_count = challenge.test_cases.len() - visible.len();

        Self {
            slug: challenge.slug.clone(),
            title: challenge.title.clone(),
            description: challenge.description.clone(),
            difficulty: challenge.difficulty,
            language: challenge.language,
            starter_code: challenge.starter_code.clone(),
            test_cases: visible,
            hidden_test_count,
            tags: challenge.tags.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub report: GradingReport,
    pub recorded: bool,
    pub badge_awarded: Option<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

fn not_found(slug: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("Unknown challenge: {}", slug))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Grade `payload` against `challenge`, recording metrics for `action`
async fn grade(
    state: &AppState,
    challenge: &Challenge,
    payload: CodeRequest,
    action: &'static str,
) -> Result<(Submission, GradingReport), Response> {
    let language = payload.language.unwrap_or(challenge.language);
    let submission = Submission::new(payload.code, language);
    let language_label = challenge.language.to_string();

    match state.grader.grade(&submission, challenge).await {
        Ok(report) => {
            metrics::GRADING_RUNS
                .with_label_values(&[
                    action,
                    language_label.as_str(),
                    metrics::outcome_label(report.all_passed),
                ])
                .inc();
            metrics::GRADING_DURATION
                .with_label_values(&[language_label.as_str()])
                .observe(report.execution_time as f64 / 1000.0);
            Ok((submission, report))
        }
        Err(GradingError::Unsafe(veto)) => {
            metrics::GRADING_RUNS
                .with_label_values(&[action, language_label.as_str(), "rejected"])
                .inc();
            info!(slug = %challenge.slug, rule = %veto.rule, "Submission rejected");
            Err(error_response(StatusCode::UNPROCESSABLE_ENTITY, veto.to_string()))
        }
    }
}

/// GET /health - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus exposition
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather(),
    )
}

/// GET /challenges - Catalog listing
pub async fn list_challenges(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let summaries: Vec<ChallengeSummary> = state
        .catalog
        .iter()
        .map(|c| ChallengeSummary {
            slug: c.slug.clone(),
            title: c.title.clone(),
            difficulty: c.difficulty,
            language: c.language,
            tags: c.tags.clone(),
        })
        .collect();

    Json(summaries)
}

/// GET /challenges/{slug} - One challenge, visible test cases only
pub async fn get_challenge(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    match state.catalog.get(&slug) {
        Some(challenge) => Json(ChallengeView::from(challenge)).into_response(),
        None => not_found(&slug),
    }
}

/// POST /challenges/{slug}/run - Grade without recording
pub async fn run_challenge(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(payload): Json<CodeRequest>,
) -> Response {
    let Some(challenge) = state.catalog.get(&slug) else {
        return not_found(&slug);
    };

    match grade(&state, challenge, payload, "run").await {
        Ok((_, report)) => {
            info!(
                slug = %slug,
                passed_tests = report.passed_tests,
                total_tests = report.total_tests,
                "Run completed"
            );
            (StatusCode::OK, Json(report.redact_hidden())).into_response()
        }
        Err(response) => response,
    }
}

/// POST /challenges/{slug}/submit - Grade, and record when every test passed
pub async fn submit_challenge(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CodeRequest>,
) -> Response {
    let Some(challenge) = state.catalog.get(&slug) else {
        return not_found(&slug);
    };

    let (submission, report) = match grade(&state, challenge, payload, "submit").await {
        Ok(graded) => graded,
        Err(response) => return response,
    };

    if !report.all_passed {
        info!(
            slug = %slug,
            passed_tests = report.passed_tests,
            total_tests = report.total_tests,
            "Submission not recorded: not all tests passed"
        );
        return Json(SubmitResponse {
            report: report.redact_hidden(),
            recorded: false,
            badge_awarded: None,
        })
        .into_response();
    }

    let Some(recorder) = state.recorder.as_ref() else {
        warn!(slug = %slug, "Passing submission but no recorder configured");
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            RecorderError::NotConfigured.to_string(),
        );
    };

    let request = match RecordRequest::from_report(
        &challenge.slug,
        &submission.code,
        submission.language,
        &report,
    ) {
        Ok(request) => request,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    // Caller's session wins over the service token
    let token = bearer_token(&headers).or(state.recorder_token.as_deref());

    match recorder.record(&request, token).await {
        Ok(recorded) => Json(SubmitResponse {
            report: report.redact_hidden(),
            recorded: recorded.success,
            badge_awarded: recorded.badge_awarded,
        })
        .into_response(),
        Err(e) => {
            error!(slug = %slug, error = %e, "Failed to record submission");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}
