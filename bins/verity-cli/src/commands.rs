// CLI commands for working with the challenge catalog
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use verity_common::catalog::Catalog;
use verity_common::config::EngineConfig;
use verity_common::language::Language;
use verity_common::types::{Challenge, GradingReport, Submission};
use verity_engine::marshal::validate_fixtures;
use verity_engine::recorder::{RecordRequest, SubmissionRecorder};
use verity_engine::{Grader, GradingError, RecorderError};

/// Challenges in slug order, optionally restricted to one language
pub fn select_challenges(catalog: &Catalog, language: Option<Language>) -> Vec<&Challenge> {
    catalog
        .iter()
        .filter(|c| language.map_or(true, |lang| c.language == lang))
        .collect()
}

/// List the challenges in the catalog
pub fn list_challenges(config: &EngineConfig, language: Option<Language>) -> Result<()> {
    let catalog = Catalog::load(&config.catalog_path)?;
    let challenges = select_challenges(&catalog, language);

    if challenges.is_empty() {
        println!("⚠️  No matching challenges in {}", config.catalog_path.display());
        return Ok(());
    }

    println!("📚 {} challenges:\n", challenges.len());
    for challenge in challenges {
        let hidden = challenge.test_cases.iter().filter(|tc| tc.is_hidden).count();
        println!(
            "  {:<24} {:<10} {:<8} {} tests ({} hidden)  {}",
            challenge.slug,
            challenge.language.to_string(),
            format!("{:?}", challenge.difficulty),
            challenge.test_cases.len(),
            hidden,
            challenge.title
        );
    }

    Ok(())
}

/// Render a report the way a learner reads it in a terminal
pub fn format_report(report: &GradingReport) -> String {
    let mut out = String::new();

    for result in &report.results {
        let mark = if result.passed { "✅" } else { "❌" };
        out.push_str(&format!(
            "{} {} [{}] {}s\n",
            mark, result.test_name, result.status_description, result.time
        ));

        if result.passed || result.hidden {
            continue;
        }
        if !result.input.is_empty() {
            out.push_str(&format!("     input:    {}\n", result.input));
        }
        out.push_str(&format!("     expected: {}\n", result.expected_output));
        out.push_str(&format!("     actual:   {}\n", result.actual_output));
        if let Some(error) = &result.error {
            out.push_str(&format!("     error:    {}\n", error));
        }
    }

    out.push_str(&format!(
        "\n{}/{} passed in {}ms",
        report.passed_tests, report.total_tests, report.execution_time
    ));
    out
}

/// Terminal or JSON rendering of a report, hidden cases redacted either way
pub fn render_report(
    title: &str,
    language: Language,
    report: &GradingReport,
    json: bool,
) -> Result<String> {
    let redacted = report.clone().redact_hidden();
    if json {
        Ok(serde_json::to_string_pretty(&redacted)?)
    } else {
        Ok(format!("🧪 {} ({})\n\n{}", title, language, format_report(&redacted)))
    }
}

/// Grade a source file against one challenge, optionally recording it
pub async fn grade_file(
    config: &EngineConfig,
    slug: &str,
    file: &Path,
    submit: bool,
    token: Option<&str>,
    json: bool,
) -> Result<()> {
    let catalog = Catalog::load(&config.catalog_path)?;
    let Some(challenge) = catalog.get(slug) else {
        bail!("Unknown challenge: {}", slug);
    };

    let code = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let grader = Grader::from_config(config);
    let submission = Submission::new(code, challenge.language);

    let report = match grader.grade(&submission, challenge).await {
        Ok(report) => report,
        Err(GradingError::Unsafe(veto)) => bail!("{}", veto),
    };

    println!("{}", render_report(&challenge.title, challenge.language, &report, json)?);

    if !submit {
        return Ok(());
    }

    if !report.all_passed {
        println!("\n⚠️  Not every test passed; submission not recorded");
        return Ok(());
    }

    let Some(recorder) = SubmissionRecorder::from_config(config) else {
        return Err(RecorderError::NotConfigured).context("Set RECORDER_URL to record submissions");
    };

    let request = RecordRequest::from_report(
        &challenge.slug,
        &submission.code,
        submission.language,
        &report,
    )?;
    let token = token.or(config.recorder_token.as_deref());
    let response = recorder.record(&request, token).await?;

    if response.success {
        println!("\n📝 Submission recorded");
    } else {
        println!("\n⚠️  Recorder did not accept the submission");
    }
    if let Some(badge) = response.badge_awarded {
        println!("🏅 Badge awarded: {}", badge);
    }

    Ok(())
}

/// Check every test-case input in the catalog
pub fn validate_catalog(config: &EngineConfig) -> Result<()> {
    let catalog = Catalog::load(&config.catalog_path)?;
    println!("🔍 Validating {} challenges...", catalog.len());

    for challenge in catalog.iter().filter(|c| c.test_cases.is_empty()) {
        println!("⚠️  {} has no test cases and can never pass", challenge.slug);
    }

    let issues = validate_fixtures(&catalog);
    for issue in &issues {
        println!(
            "❌ {} test case {}: malformed input {:?}",
            issue.slug,
            issue.test_index + 1,
            issue.input
        );
    }

    if !issues.is_empty() {
        bail!("{} malformed test-case inputs", issues.len());
    }

    println!("✅ Catalog is valid");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use verity_common::types::{StatusId, TestCase, TestResult};

    fn config_for(catalog_json: &str) -> (tempfile::NamedTempFile, EngineConfig) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(catalog_json.as_bytes()).unwrap();
        let config = EngineConfig {
            catalog_path: file.path().to_path_buf(),
            ..EngineConfig::default()
        };
        (file, config)
    }

    #[test]
    fn test_format_report_shows_failure_detail() {
        let tc = TestCase {
            input: "15".to_string(),
            expected_output: "FizzBuzz".to_string(),
            description: "Multiple of 15".to_string(),
            is_hidden: false,
        };
        let results = vec![
            TestResult::new(0, &tc, StatusId::WrongAnswer, Duration::from_millis(3)).with_output("15"),
        ];
        let report = GradingReport::from_results(results, Duration::from_millis(5));

        let text = format_report(&report);

        assert!(text.contains("Multiple of 15 [Wrong Answer]"));
        assert!(text.contains("expected: FizzBuzz"));
        assert!(text.contains("actual:   15"));
        assert!(text.ends_with("0/1 passed in 5ms"));
    }

    #[test]
    fn test_json_output_is_redacted() {
        let tc = TestCase {
            input: "[\"secret-input\"]".to_string(),
            expected_output: "secret-expected".to_string(),
            description: String::new(),
            is_hidden: true,
        };
        let results = vec![
            TestResult::new(0, &tc, StatusId::RuntimeError, Duration::from_millis(1))
                .with_output("secret-actual")
                .with_error("Error: secret-input"),
        ];
        let report = GradingReport::from_results(results, Duration::from_millis(1));

        let json = render_report("Hidden", Language::JavaScript, &report, true).unwrap();

        assert!(!json.contains("secret"));
        assert!(json.contains("\"totalTests\": 1"));
    }

    #[test]
    fn test_select_challenges_by_language() {
        let catalog = Catalog::from_json(
            r#"{"challenges":[
                {"slug":"a","title":"A","difficulty":"Easy","language":"javascript","testCases":[]},
                {"slug":"b","title":"B","difficulty":"Easy","language":"python","testCases":[]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(select_challenges(&catalog, None).len(), 2);
        let python = select_challenges(&catalog, Some("PY".parse().unwrap()));
        assert_eq!(python.len(), 1);
        assert_eq!(python[0].slug, "b");
    }

    #[test]
    fn test_validate_flags_malformed_input() {
        let (_file, config) = config_for(
            r#"{"challenges":[{"slug":"bad","title":"Bad","difficulty":"Easy","language":"javascript",
                "testCases":[{"input":"[1, 2","expectedOutput":"3"}]}]}"#,
        );

        let err = validate_catalog(&config).unwrap_err();
        assert!(err.to_string().contains("1 malformed"));
    }

    #[test]
    fn test_validate_accepts_good_catalog() {
        let (_file, config) = config_for(
            r#"{"challenges":[{"slug":"ok","title":"Ok","difficulty":"Easy","language":"javascript",
                "testCases":[{"input":"[1, 2]","expectedOutput":"3"},{"input":"7","expectedOutput":"7"}]}]}"#,
        );

        assert!(validate_catalog(&config).is_ok());
    }

    #[tokio::test]
    async fn test_grade_unknown_slug() {
        let (_file, config) = config_for(r#"{"challenges":[]}"#);
        let err = grade_file(&config, "missing", Path::new("/dev/null"), false, None, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown challenge"));
    }
}
