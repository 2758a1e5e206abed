/// Output Evaluator - Language-Agnostic Verdicts
///
/// **Core Responsibility:**
/// Decide whether an actual output matches the expected output, and turn a
/// single execution outcome into a `TestResult`.
///
/// **Critical Properties:**
/// - Knows nothing about child processes or HTTP
/// - Pure function: (execution outcome, test case) → verdict
///
/// **Equivalence Rules (first match wins):**
/// 1. Exact match after trimming surrounding whitespace
/// 2. Both sides are finite decimal numbers within 1e-4 of each other
/// 3. Case-insensitive match ("True" vs "true")
///
/// Line endings are normalized (`\r\n` → `\n`) before any rule applies.
use crate::error::ExecutionError;
use std::time::Duration;
use verity_common::types::{StatusId, TestCase, TestResult};

/// Absolute tolerance for numeric equivalence
pub const NUMERIC_TOLERANCE: f64 = 1e-4;

fn normalize_output(output: &str) -> String {
    output.replace("\r\n", "\n").trim().to_string()
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Compare actual against expected output
pub fn compare(actual: &str, expected: &str) -> bool {
    let actual = normalize_output(actual);
    let expected = normalize_output(expected);

    if actual == expected {
        return true;
    }

    if let (Some(a), Some(e)) = (parse_finite(&actual), parse_finite(&expected)) {
        return (a - e).abs() <= NUMERIC_TOLERANCE;
    }

    actual.to_lowercase() == expected.to_lowercase()
}

/// Build the `TestResult` for one local execution
///
/// Failures take priority over comparison: a timed-out or faulted run can
/// never pass, whatever partial output it produced.
pub fn evaluate_test(
    index: usize,
    test_case: &TestCase,
    outcome: Result<String, ExecutionError>,
    elapsed: Duration,
) -> TestResult {
    match outcome {
        Ok(actual) => {
            let status = if compare(&actual, &test_case.expected_output) {
                StatusId::Accepted
            } else {
                StatusId::WrongAnswer
            };
            TestResult::new(index, test_case, status, elapsed).with_output(actual)
        }
        Err(e) => TestResult::new(index, test_case, e.status(), elapsed).with_error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_case(expected_output: &str) -> TestCase {
        TestCase {
            input: "input".to_string(),
            expected_output: expected_output.to_string(),
            description: String::new(),
            is_hidden: false,
        }
    }

    #[test]
    fn test_normalize_output() {
        assert_eq!(normalize_output("hello"), "hello");
        assert_eq!(normalize_output("  hello  "), "hello");
        assert_eq!(normalize_output("hello\n"), "hello");
        assert_eq!(normalize_output("a\r\nb\r\n"), "a\nb");
        assert_eq!(normalize_output("   "), "");
    }

    #[test]
    fn test_exact_match() {
        assert!(compare("120", "120"));
        assert!(compare("  hello  \n", "hello"));
        assert!(compare("line1\r\nline2", "line1\nline2"));
        assert!(!compare("expected", "actual"));
    }

    #[test]
    fn test_numeric_tolerance() {
        assert!(compare("3", "3.00"));
        assert!(compare("3", "3.0"));
        assert!(compare("0.30000000000000004", "0.3"));
        assert!(compare("1e3", "1000"));
        assert!(compare("2.00005", "2"));
    }

    #[test]
    fn test_distinct_integers_stay_distinct() {
        assert!(!compare("3", "4"));
        assert!(!compare("100000", "100001"));
        assert!(!compare("2.001", "2"));
    }

    #[test]
    fn test_non_finite_numbers_are_not_numeric() {
        // Falls through to the case-insensitive rule
        assert!(compare("Infinity", "infinity"));
        assert!(!compare("NaN", "0"));
    }

    #[test]
    fn test_case_insensitive_fallback() {
        assert!(compare("True", "true"));
        assert!(compare("FALSE", "false"));
        assert!(compare("FizzBuzz", "fizzbuzz"));
        assert!(!compare("Fizz", "Buzz"));
    }

    #[test]
    fn test_evaluate_accepted() {
        let tc = make_test_case("120");
        let result = evaluate_test(0, &tc, Ok("120".to_string()), Duration::from_millis(42));

        assert!(result.passed);
        assert_eq!(result.status_id, StatusId::Accepted);
        assert_eq!(result.status_description, "Accepted");
        assert_eq!(result.actual_output, "120");
        assert_eq!(result.time, "0.042");
        assert!(result.error.is_none());
        assert!(result.memory.is_none());
    }

    #[test]
    fn test_evaluate_wrong_answer() {
        let tc = make_test_case("FizzBuzz");
        let result = evaluate_test(0, &tc, Ok("15".to_string()), Duration::ZERO);

        assert!(!result.passed);
        assert_eq!(result.status_id, StatusId::WrongAnswer);
        assert_eq!(result.actual_output, "15");
    }

    #[test]
    fn test_evaluate_timeout() {
        let tc = make_test_case("output");
        let result = evaluate_test(
            2,
            &tc,
            Err(ExecutionError::Timeout(Duration::from_millis(1000))),
            Duration::from_millis(1001),
        );

        assert!(!result.passed);
        assert_eq!(result.status_id, StatusId::TimeLimitExceeded);
        assert_eq!(result.test_name, "Test case 3");
        assert!(result.error.unwrap().contains("timed out"));
    }

    #[test]
    fn test_evaluate_runtime_fault() {
        let tc = make_test_case("output");
        let result = evaluate_test(
            0,
            &tc,
            Err(ExecutionError::RuntimeFault("TypeError: x is undefined".to_string())),
            Duration::from_millis(5),
        );

        assert!(!result.passed);
        assert_eq!(result.status_id, StatusId::RuntimeError);
        assert_eq!(result.error.as_deref(), Some("TypeError: x is undefined"));
        assert_eq!(result.actual_output, "");
    }

    #[test]
    fn test_evaluate_compile_fault() {
        let tc = make_test_case("output");
        let result = evaluate_test(
            0,
            &tc,
            Err(ExecutionError::CompileFault("SyntaxError: Unexpected token".to_string())),
            Duration::ZERO,
        );

        assert_eq!(result.status_id, StatusId::CompilationError);
    }
}
