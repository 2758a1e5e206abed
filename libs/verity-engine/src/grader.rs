/// Grading Orchestrator
///
/// **Responsibility:**
/// Sanitize a submission, run it against every test case of a challenge via
/// the executor its language selects, and aggregate the verdicts.
///
/// **Guarantees:**
/// - A sanitizer veto rejects the run before anything executes
/// - Every other failure stays inside its own `TestResult`
/// - A full report is always returned; gating a "submit" on `all_passed` is
///   the caller's job
///
/// Per attempt: Idle → Sanitizing → Executing → Comparing → Aggregated, or
/// Rejected on a veto.
use crate::error::GradingError;
use crate::executor::ExecutorSet;
use crate::sanitizer;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use verity_common::config::EngineConfig;
use verity_common::types::{Challenge, GradingReport, Submission};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingPhase {
    Idle,
    Sanitizing,
    Executing,
    Comparing,
    Aggregated,
    Rejected,
}

impl fmt::Display for GradingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GradingPhase::Idle => "idle",
            GradingPhase::Sanitizing => "sanitizing",
            GradingPhase::Executing => "executing",
            GradingPhase::Comparing => "comparing",
            GradingPhase::Aggregated => "aggregated",
            GradingPhase::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

fn enter(phase: &mut GradingPhase, next: GradingPhase) {
    debug!(from = %phase, to = %next, "Grading phase");
    *phase = next;
}

/// Stateless between runs: every call to [`Grader::grade`] is independent
#[derive(Debug, Clone)]
pub struct Grader {
    executors: ExecutorSet,
    max_source_bytes: usize,
}

impl Grader {
    pub fn new(executors: ExecutorSet, max_source_bytes: usize) -> Self {
        Self {
            executors,
            max_source_bytes,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(ExecutorSet::from_config(config), config.max_source_bytes)
    }

    #[instrument(
        skip_all,
        fields(
            run_id = %uuid::Uuid::new_v4(),
            slug = %challenge.slug,
            language = %challenge.language,
        )
    )]
    pub async fn grade(
        &self,
        submission: &Submission,
        challenge: &Challenge,
    ) -> Result<GradingReport, GradingError> {
        let mut phase = GradingPhase::Idle;

        if submission.language != challenge.language {
            warn!(
                submitted = %submission.language,
                expected = %challenge.language,
                "Submission language differs from challenge; grading as challenge language"
            );
        }

        enter(&mut phase, GradingPhase::Sanitizing);
        if let Err(veto) = sanitizer::check(&submission.code, challenge.language, self.max_source_bytes) {
            enter(&mut phase, GradingPhase::Rejected);
            warn!(rule = %veto.rule, "Submission rejected by sanitizer");
            return Err(veto.into());
        }

        enter(&mut phase, GradingPhase::Executing);
        let executor = self.executors.for_language(challenge.language);
        let start = Instant::now();
        let results = executor
            .run(&submission.code, challenge.language, &challenge.test_cases)
            .await;
        let elapsed = start.elapsed();

        enter(&mut phase, GradingPhase::Comparing);
        let report = GradingReport::from_results(results, elapsed);

        enter(&mut phase, GradingPhase::Aggregated);
        info!(
            executor = executor.kind(),
            passed_tests = report.passed_tests,
            total_tests = report.total_tests,
            execution_ms = report.execution_time,
            "Grading completed"
        );

        Ok(report)
    }
}
