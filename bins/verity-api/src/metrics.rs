// Prometheus metrics for grading runs
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    pub static ref GRADING_RUNS: IntCounterVec = register_int_counter_vec!(
        "verity_grading_runs_total",
        "Grading runs by action, language and outcome",
        &["action", "language", "outcome"]
    )
    .expect("register verity_grading_runs_total");

    pub static ref GRADING_DURATION: HistogramVec = register_histogram_vec!(
        "verity_grading_duration_seconds",
        "Wall-clock duration of a grading batch",
        &["language"]
    )
    .expect("register verity_grading_duration_seconds");
}

/// Outcome label for a finished run
pub fn outcome_label(all_passed: bool) -> &'static str {
    if all_passed {
        "all_passed"
    } else {
        "failed"
    }
}

/// Render every registered metric in the text exposition format
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
