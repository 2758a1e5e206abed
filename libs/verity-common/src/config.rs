// Engine configuration, read from the environment
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 64 * 1024;
pub const DEFAULT_RECORDER_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Per-test wall-clock limit for local execution
    pub timeout: Duration,
    /// Interpreter program followed by any leading arguments
    pub node_command: Vec<String>,
    pub max_source_bytes: usize,
    pub remote_url: String,
    pub remote_timeout: Duration,
    pub recorder_url: Option<String>,
    pub recorder_token: Option<String>,
    pub recorder_timeout: Duration,
    pub catalog_path: PathBuf,
    pub bind_addr: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            node_command: vec!["node".to_string()],
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            remote_url: "http://127.0.0.1:2358".to_string(),
            remote_timeout: Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS),
            recorder_url: None,
            recorder_token: None,
            recorder_timeout: Duration::from_millis(DEFAULT_RECORDER_TIMEOUT_MS),
            catalog_path: PathBuf::from("config/challenges.json"),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; unset keys keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = lookup("GRADER_TIMEOUT_MS") {
            let ms: u64 = ms.trim().parse().context("GRADER_TIMEOUT_MS must be an integer")?;
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(cmd) = lookup("NODE_BINARY") {
            let parts: Vec<String> = cmd.split_whitespace().map(str::to_string).collect();
            if !parts.is_empty() {
                config.node_command = parts;
            }
        }
        if let Some(bytes) = lookup("MAX_SOURCE_BYTES") {
            config.max_source_bytes = bytes
                .trim()
                .parse()
                .context("MAX_SOURCE_BYTES must be an integer")?;
        }
        if let Some(url) = lookup("REMOTE_EXECUTOR_URL") {
            config.remote_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = lookup("REMOTE_TIMEOUT_MS") {
            let ms: u64 = ms.trim().parse().context("REMOTE_TIMEOUT_MS must be an integer")?;
            config.remote_timeout = Duration::from_millis(ms);
        }
        config.recorder_url = lookup("RECORDER_URL")
            .filter(|u| !u.trim().is_empty())
            .map(|u| u.trim_end_matches('/').to_string());
        config.recorder_token = lookup("RECORDER_TOKEN").filter(|t| !t.is_empty());
        if let Some(ms) = lookup("RECORDER_TIMEOUT_MS") {
            let ms: u64 = ms.trim().parse().context("RECORDER_TIMEOUT_MS must be an integer")?;
            config.recorder_timeout = Duration::from_millis(ms);
        }
        if let Some(path) = lookup("CATALOG_PATH") {
            config.catalog_path = PathBuf::from(path);
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }

        Ok(config)
    }
}
