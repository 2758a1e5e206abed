use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Immutable catalog entry for one coding challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: Difficulty,
    pub language: Language,
    #[serde(default)]
    pub starter_code: String,
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Empty, a bare scalar, or a JSON array/object literal
    #[serde(default)]
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_hidden: bool,
}

impl TestCase {
    /// Human label, falling back to the 1-based position
    pub fn display_name(&self, index: usize) -> String {
        if self.description.trim().is_empty() {
            format!("Test case {}", index + 1)
        } else {
            self.description.clone()
        }
    }
}

/// A learner's editor buffer paired with the language it targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub code: String,
    pub language: Language,
}

impl Submission {
    pub fn new(code: impl Into<String>, language: Language) -> Self {
        Self {
            code: code.into(),
            language,
        }
    }
}

/// Status taxonomy shared by the local and remote executors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StatusId {
    Queued,
    Processing,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    RuntimeError,
    /// Executor infrastructure failed; the submission was not judged
    InternalError,
}

impl StatusId {
    pub fn code(&self) -> u8 {
        match self {
            StatusId::Queued => 1,
            StatusId::Processing => 2,
            StatusId::Accepted => 3,
            StatusId::WrongAnswer => 4,
            StatusId::TimeLimitExceeded => 5,
            StatusId::CompilationError => 6,
            StatusId::RuntimeError => 7,
            StatusId::InternalError => 13,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StatusId::Queued => "In Queue",
            StatusId::Processing => "Processing",
            StatusId::Accepted => "Accepted",
            StatusId::WrongAnswer => "Wrong Answer",
            StatusId::TimeLimitExceeded => "Time Limit Exceeded",
            StatusId::CompilationError => "Compilation Error",
            StatusId::RuntimeError => "Runtime Error",
            StatusId::InternalError => "Internal Error",
        }
    }
}

impl From<StatusId> for u8 {
    fn from(status: StatusId) -> u8 {
        status.code()
    }
}

impl TryFrom<u8> for StatusId {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(StatusId::Queued),
            2 => Ok(StatusId::Processing),
            3 => Ok(StatusId::Accepted),
            4 => Ok(StatusId::WrongAnswer),
            5 => Ok(StatusId::TimeLimitExceeded),
            6 => Ok(StatusId::CompilationError),
            7 => Ok(StatusId::RuntimeError),
            13 => Ok(StatusId::InternalError),
            other => Err(format!("unknown status id: {}", other)),
        }
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Outcome of one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_name: String,
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub passed: bool,
    pub status_id: StatusId,
    pub status_description: String,
    /// Seconds, formatted with millisecond precision
    pub time: String,
    pub memory: Option<u64>,
    pub error: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl TestResult {
    /// Start a result for `test_case` with the given status; callers fill in
    /// the output and error
    pub fn new(index: usize, test_case: &TestCase, status: StatusId, elapsed: Duration) -> Self {
        Self {
            test_name: test_case.display_name(index),
            input: test_case.input.clone(),
            expected_output: test_case.expected_output.clone(),
            actual_output: String::new(),
            passed: status == StatusId::Accepted,
            status_id: status,
            status_description: status.description().to_string(),
            time: format_seconds(elapsed),
            memory: None,
            error: None,
            hidden: test_case.is_hidden,
        }
    }

    pub fn with_output(mut self, actual_output: impl Into<String>) -> Self {
        self.actual_output = actual_output.into();
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

pub fn format_seconds(elapsed: Duration) -> String {
    format!("{:.3}", elapsed.as_secs_f64())
}

/// Aggregate of every test-case verdict for one run or submit action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingReport {
    pub results: Vec<TestResult>,
    pub total_tests: usize,
    pub passed_tests: usize,
    pub all_passed: bool,
    /// Wall-clock duration of the whole batch in milliseconds
    pub execution_time: u64,
}

impl GradingReport {
    pub fn from_results(results: Vec<TestResult>, elapsed: Duration) -> Self {
        let total_tests = results.len();
        let passed_tests = results.iter().filter(|r| r.passed).count();

        Self {
            results,
            total_tests,
            passed_tests,
            // An empty batch proves nothing
            all_passed: total_tests > 0 && passed_tests == total_tests,
            execution_time: elapsed.as_millis() as u64,
        }
    }

    /// Blank the inputs, outputs and errors of hidden test cases before the
    /// report leaves the server
    pub fn redact_hidden(mut self) -> Self {
        for result in self.results.iter_mut().filter(|r| r.hidden) {
            result.input = String::new();
            result.expected_output = String::new();
            result.actual_output = String::new();
            // Fault messages can quote the input
            result.error = None;
        }
        self
    }
}
