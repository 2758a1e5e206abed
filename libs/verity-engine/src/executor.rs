/// Executor - language-tagged dispatch
///
/// A closed set of execution backends behind one `run` operation. The
/// orchestrator picks a variant from the challenge's language and never looks
/// at the language again.
use crate::local::LocalExecutor;
use crate::remote::RemoteExecutor;
use verity_common::config::EngineConfig;
use verity_common::language::{ExecutionMode, Language};
use verity_common::types::{TestCase, TestResult};

#[derive(Debug, Clone)]
pub enum Executor {
    Local(LocalExecutor),
    Remote(RemoteExecutor),
}

impl Executor {
    /// Run `source` against every test case, one result per case, in order
    pub async fn run(&self, source: &str, language: Language, test_cases: &[TestCase]) -> Vec<TestResult> {
        match self {
            Executor::Local(local) => local.run_tests(source, test_cases).await,
            Executor::Remote(remote) => {
                remote
                    .run_or_degrade(source, language, test_cases)
                    .await
                    .results
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Executor::Local(_) => "local",
            Executor::Remote(_) => "remote",
        }
    }
}

/// The pair of backends a grading engine chooses between
#[derive(Debug, Clone)]
pub struct ExecutorSet {
    local: Executor,
    remote: Executor,
}

impl ExecutorSet {
    pub fn new(local: LocalExecutor, remote: RemoteExecutor) -> Self {
        Self {
            local: Executor::Local(local),
            remote: Executor::Remote(remote),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            LocalExecutor::from_config(config),
            RemoteExecutor::from_config(config),
        )
    }

    pub fn for_language(&self, language: Language) -> &Executor {
        match language.execution_mode() {
            ExecutionMode::Local => &self.local,
            ExecutionMode::Remote => &self.remote,
        }
    }
}
