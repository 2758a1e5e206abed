/// Remote Executor - Delegated Execution
///
/// Every language without an in-host runtime is forwarded to the external
/// execution service. Its per-test answers are normalized onto the same
/// `TestResult` shape the local executor produces, so callers never need to
/// know which path ran.
///
/// Transport failures degrade: every test case is reported failed with an
/// Internal Error status instead of aborting the run.
use crate::error::RemoteError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use verity_common::config::EngineConfig;
use verity_common::language::Language;
use verity_common::types::{GradingReport, StatusId, TestCase, TestResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteExecutionRequest<'a> {
    pub code: &'a str,
    pub language: Language,
    pub test_cases: &'a [TestCase],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTestResult {
    /// Index into the submitted test cases
    pub test_case: usize,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub expected_output: String,
    #[serde(default)]
    pub actual_output: String,
    pub passed: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteExecutionResponse {
    pub results: Vec<RemoteTestResult>,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub passed_tests: usize,
    #[serde(default)]
    pub total_tests: usize,
    #[serde(default)]
    pub execution_time: u64,
}

#[derive(Debug, Clone)]
pub struct RemoteExecutor {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RemoteExecutor {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.remote_url.clone(), config.remote_timeout)
    }

    /// Submit the whole batch to the service and normalize its answer
    #[instrument(skip(self, source, test_cases), fields(language = %language, test_cases = test_cases.len()))]
    pub async fn run(
        &self,
        source: &str,
        language: Language,
        test_cases: &[TestCase],
    ) -> Result<GradingReport, RemoteError> {
        let url = format!("{}/execute", self.base_url);
        let request = RemoteExecutionRequest {
            code: source,
            language,
            test_cases,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(RemoteError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::ServiceUnavailable(format!(
                "HTTP {} {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let body: RemoteExecutionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::ServiceTimeout
            } else {
                RemoteError::ServiceUnavailable(format!("invalid response: {}", e))
            }
        })?;

        debug!(
            passed_tests = body.passed_tests,
            total_tests = body.total_tests,
            execution_ms = body.execution_time,
            "Execution service responded"
        );

        Ok(normalize(test_cases, body))
    }

    /// Like [`RemoteExecutor::run`], but a transport failure becomes a report
    /// in which every test case failed
    pub async fn run_or_degrade(
        &self,
        source: &str,
        language: Language,
        test_cases: &[TestCase],
    ) -> GradingReport {
        match self.run(source, language, test_cases).await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Remote execution failed; marking all tests failed");
                degraded_report(test_cases, &e.to_string())
            }
        }
    }
}

/// Map the service's results onto the catalog's test cases, in catalog order
fn normalize(test_cases: &[TestCase], response: RemoteExecutionResponse) -> GradingReport {
    let results = test_cases
        .iter()
        .enumerate()
        .map(|(idx, tc)| {
            match response.results.iter().find(|r| r.test_case == idx) {
                Some(remote) => {
                    let status = if remote.passed {
                        StatusId::Accepted
                    } else if remote.error.is_some() {
                        StatusId::RuntimeError
                    } else {
                        StatusId::WrongAnswer
                    };
                    let mut result =
                        TestResult::new(idx, tc, status, Duration::ZERO).with_output(remote.actual_output.clone());
                    result.error = remote.error.clone();
                    result
                }
                None => TestResult::new(idx, tc, StatusId::InternalError, Duration::ZERO)
                    .with_error("Execution service returned no result for this test"),
            }
        })
        .collect();

    GradingReport::from_results(results, Duration::from_millis(response.execution_time))
}

fn degraded_report(test_cases: &[TestCase], message: &str) -> GradingReport {
    let results = test_cases
        .iter()
        .enumerate()
        .map(|(idx, tc)| {
            TestResult::new(idx, tc, StatusId::InternalError, Duration::ZERO).with_error(message)
        })
        .collect();

    GradingReport::from_results(results, Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    fn make_test_case(input: &str, expected_output: &str) -> TestCase {
        TestCase {
            input: input.to_string(),
            expected_output: expected_output.to_string(),
            description: String::new(),
            is_hidden: false,
        }
    }

    /// Serve `app` on an ephemeral port and return its base URL
    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn echo_service(Json(request): Json<Value>) -> Json<Value> {
        // Second test passes, first fails with an error, third missing
        assert_eq!(request["language"], "python");
        assert_eq!(request["code"], "def solve(n): return n");
        assert_eq!(request["testCases"][0]["expectedOutput"], "1");
        Json(json!({
            "results": [
                {"testCase": 1, "input": "2", "expectedOutput": "2", "actualOutput": "2", "passed": true},
                {"testCase": 0, "input": "1", "expectedOutput": "1", "actualOutput": "", "passed": false,
                 "error": "ZeroDivisionError: division by zero"}
            ],
            "passed": false,
            "passedTests": 1,
            "totalTests": 3,
            "executionTime": 87
        }))
    }

    #[tokio::test]
    async fn test_normalizes_service_results() {
        let url = serve(Router::new().route("/execute", post(echo_service))).await;
        let executor = RemoteExecutor::new(url, Duration::from_secs(5));
        let cases = vec![
            make_test_case("1", "1"),
            make_test_case("2", "2"),
            make_test_case("3", "3"),
        ];

        let report = executor
            .run("def solve(n): return n", Language::Python, &cases)
            .await
            .unwrap();

        assert_eq!(report.total_tests, 3);
        assert_eq!(report.passed_tests, 1);
        assert!(!report.all_passed);
        assert_eq!(report.execution_time, 87);

        assert_eq!(report.results[0].status_id, StatusId::RuntimeError);
        assert_eq!(
            report.results[0].error.as_deref(),
            Some("ZeroDivisionError: division by zero")
        );
        assert_eq!(report.results[1].status_id, StatusId::Accepted);
        assert_eq!(report.results[1].actual_output, "2");
        assert_eq!(report.results[2].status_id, StatusId::InternalError);
    }

    #[tokio::test]
    async fn test_wrong_answer_without_error() {
        let app = Router::new().route(
            "/execute",
            post(|| async {
                Json(json!({
                    "results": [{"testCase": 0, "actualOutput": "4", "passed": false}]
                }))
            }),
        );
        let url = serve(app).await;
        let executor = RemoteExecutor::new(url, Duration::from_secs(5));

        let report = executor
            .run("x", Language::Java, &[make_test_case("2", "5")])
            .await
            .unwrap();

        assert_eq!(report.results[0].status_id, StatusId::WrongAnswer);
        assert_eq!(report.results[0].actual_output, "4");
        assert_eq!(report.results[0].expected_output, "5");
    }

    #[tokio::test]
    async fn test_service_unavailable_degrades() {
        // Grab a free port, then close it so the connection is refused
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let executor = RemoteExecutor::new(format!("http://{}", addr), Duration::from_secs(2));
        let cases = vec![make_test_case("1", "1"), make_test_case("2", "2")];

        let err = executor.run("x", Language::Cpp, &cases).await.unwrap_err();
        assert!(matches!(err, RemoteError::ServiceUnavailable(_)));

        let report = executor.run_or_degrade("x", Language::Cpp, &cases).await;
        assert_eq!(report.total_tests, 2);
        assert_eq!(report.passed_tests, 0);
        for result in &report.results {
            assert!(!result.passed);
            assert_eq!(result.status_id, StatusId::InternalError);
            assert!(result.error.as_deref().unwrap().contains("unavailable"));
        }
    }

    #[tokio::test]
    async fn test_http_error_status_is_unavailable() {
        let app = Router::new().route(
            "/execute",
            post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let url = serve(app).await;
        let executor = RemoteExecutor::new(url, Duration::from_secs(5));

        let err = executor
            .run("x", Language::Go, &[make_test_case("", "1")])
            .await
            .unwrap_err();

        match err {
            RemoteError::ServiceUnavailable(msg) => assert!(msg.contains("502")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let app = Router::new().route(
            "/execute",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"results": []}))
            }),
        );
        let url = serve(app).await;
        let executor = RemoteExecutor::new(url, Duration::from_millis(200));

        let err = executor
            .run("x", Language::Rust, &[make_test_case("", "1")])
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::ServiceTimeout));

        let report = executor
            .run_or_degrade("x", Language::Rust, &[make_test_case("", "1")])
            .await;
        assert_eq!(report.results[0].status_id, StatusId::InternalError);
        assert_eq!(report.results[0].error.as_deref(), Some("Execution service timed out"));
    }
}
