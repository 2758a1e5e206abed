/// Local Executor - JavaScript in a Killable Child Process
///
/// **Execution Rules:**
/// 1. Sniff the entry-point function name from the raw source
/// 2. Spawn the interpreter with the fixed harness (`harness.js`)
/// 3. Send `{source, entry, args, timeoutMs}` on stdin
/// 4. The harness evaluates the submission in a fresh vm context with its own
///    synchronous timeout and reports one JSON line on stdout
/// 5. The host races the child against a hard timer; on expiry the child is
///    killed, so a synchronous infinite loop cannot starve the host
///
/// Test cases run strictly one after another.
use crate::error::ExecutionError;
use crate::evaluator;
use crate::marshal;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, instrument, warn};
use verity_common::config::EngineConfig;
use verity_common::types::{TestCase, TestResult};

const HARNESS: &str = include_str!("harness.js");

/// Headroom past the harness's own limit before the host kills the child;
/// covers interpreter start-up
const HARD_KILL_GRACE: Duration = Duration::from_millis(500);

/// Cap on captured stdout/stderr per run
const MAX_OUTPUT_BYTES: u64 = 1024 * 1024;

lazy_static! {
    static ref ENTRY_POINT_PATTERNS: Vec<Regex> = vec![
        // function name(...) / async function name(...) / function* name(...)
        Regex::new(r"\bfunction\s*\*?\s*([A-Za-z_$][\w$]*)\s*\(").expect("valid entry-point pattern"),
        // const name = function / const name = async (...) => / let name = x =>
        Regex::new(
            r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>)"
        )
        .expect("valid entry-point pattern"),
    ];
}

/// Name of the first function defined in `source`, by position
///
/// Lenient on purpose: whichever definition appears first is taken as the
/// entry point, matching how existing challenge fixtures are written.
pub fn find_entry_point(source: &str) -> Option<String> {
    ENTRY_POINT_PATTERNS
        .iter()
        .filter_map(|re| re.captures(source))
        .filter_map(|caps| caps.get(1))
        .min_by_key(|m| m.start())
        .map(|m| m.as_str().to_string())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HarnessRequest<'a> {
    source: &'a str,
    entry: &'a str,
    args: &'a [Value],
    timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
struct HarnessReply {
    ok: bool,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LocalExecutor {
    /// Interpreter program followed by its leading arguments
    command: Vec<String>,
    timeout: Duration,
}

impl LocalExecutor {
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.node_command.clone(), config.timeout)
    }

    /// Run every test case in order; each one's failure is recorded and the
    /// batch continues
    pub async fn run_tests(&self, source: &str, test_cases: &[TestCase]) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(test_cases.len());

        for (idx, test_case) in test_cases.iter().enumerate() {
            let args = marshal::marshal(&test_case.input);

            let start = Instant::now();
            let outcome = self.run(source, &args, self.timeout).await;
            let elapsed = start.elapsed();

            if let Err(e) = &outcome {
                debug!(test_num = idx + 1, error = %e, "Test execution failed");
            }

            let result = evaluator::evaluate_test(idx, test_case, outcome, elapsed);
            debug!(
                test_num = idx + 1,
                status = ?result.status_id,
                execution_ms = elapsed.as_millis() as u64,
                "Test evaluated"
            );
            results.push(result);
        }

        results
    }

    /// Invoke the submission's entry point with `args` and return its
    /// rendered result
    #[instrument(skip(self, source, args), fields(arg_count = args.len(), timeout_ms = timeout.as_millis() as u64))]
    pub async fn run(
        &self,
        source: &str,
        args: &[Value],
        timeout: Duration,
    ) -> Result<String, ExecutionError> {
        let entry = find_entry_point(source).ok_or_else(|| {
            ExecutionError::CompileFault("No function definition found in submission".to_string())
        })?;

        let request = serde_json::to_vec(&HarnessRequest {
            source,
            entry: &entry,
            args,
            timeout_ms: timeout.as_millis() as u64,
        })
        .map_err(|e| ExecutionError::Protocol(e.to_string()))?;

        let (program, leading_args) = self
            .command
            .split_first()
            .ok_or_else(|| ExecutionError::Protocol("empty interpreter command".to_string()))?;

        let mut child = Command::new(program)
            .args(leading_args)
            .arg("-e")
            .arg(HARNESS)
            .env_clear()
            .env("PATH", std::env::var_os("PATH").unwrap_or_default())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExecutionError::Protocol("child stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExecutionError::Protocol("child stdout unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExecutionError::Protocol("child stderr unavailable".to_string()))?;

        let execution = async {
            if let Err(e) = stdin.write_all(&request).await {
                // The child may exit without reading; its output still decides
                debug!(error = %e, "Failed to write harness request");
            }
            drop(stdin);

            let mut stdout = stdout.take(MAX_OUTPUT_BYTES);
            let mut stderr = stderr.take(MAX_OUTPUT_BYTES);
            let mut out = Vec::new();
            let mut err = Vec::new();
            let (read_out, read_err) =
                tokio::join!(stdout.read_to_end(&mut out), stderr.read_to_end(&mut err));
            read_out?;
            read_err?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, out, err))
        };

        let outcome = tokio::time::timeout(timeout + HARD_KILL_GRACE, execution).await;
        let (status, out, err) = match outcome {
            Ok(result) => result.map_err(|e| ExecutionError::Protocol(e.to_string()))?,
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Execution exceeded hard limit - killing interpreter");
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill timed-out interpreter");
                }
                return Err(ExecutionError::Timeout(timeout));
            }
        };

        let stdout = String::from_utf8_lossy(&out);
        let stderr = String::from_utf8_lossy(&err);

        let reply = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(serde_json::from_str::<HarnessReply>);

        match reply {
            Some(Ok(reply)) => interpret_reply(reply, timeout),
            Some(Err(e)) => Err(ExecutionError::Protocol(e.to_string())),
            None if !status.success() => {
                let message = stderr
                    .lines()
                    .rev()
                    .find(|line| !line.trim().is_empty())
                    .unwrap_or("Interpreter exited abnormally")
                    .trim()
                    .to_string();
                Err(ExecutionError::RuntimeFault(message))
            }
            None => Err(ExecutionError::Protocol("interpreter produced no result".to_string())),
        }
    }
}

fn interpret_reply(reply: HarnessReply, timeout: Duration) -> Result<String, ExecutionError> {
    if reply.ok {
        return Ok(reply.output.unwrap_or_default());
    }

    let message = reply.message.unwrap_or_else(|| "Unknown error".to_string());
    match reply.kind.as_deref() {
        Some("timeout") => Err(ExecutionError::Timeout(timeout)),
        Some("compile") => Err(ExecutionError::CompileFault(message)),
        Some("runtime") => Err(ExecutionError::RuntimeFault(message)),
        _ => Err(ExecutionError::Protocol(message)),
    }
}
