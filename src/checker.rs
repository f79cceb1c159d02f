use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::check::{CheckInput, FILE_EXISTS, SUITE};
use crate::config::CheckerConfig;
use crate::exec::CommandRunner;
use crate::types::CheckResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteOutcome {
    pub passed: bool,
    pub results: Vec<CheckResult>,
}

impl SuiteOutcome {
    fn from_results(results: Vec<CheckResult>) -> Self {
        let passed = results.iter().all(|r| r.passed);
        Self { passed, results }
    }

    pub fn valid_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }
}

pub struct Checker {
    config: Arc<CheckerConfig>,
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl Checker {
    pub fn new(config: CheckerConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let timeout = config.timeout();
        Self {
            config: Arc::new(config),
            runner,
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the full checklist against `path`.
    ///
    /// A missing file yields a single failed result and nothing else runs.
    /// Otherwise every check runs, concurrently, and results come back in suite order.
    /// External tools that outlive the timeout are killed and fail their check.
    pub async fn run(&self, path: &Path) -> anyhow::Result<SuiteOutcome> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "target missing, skipping checks");
            return Ok(SuiteOutcome::from_results(vec![CheckResult::fail(
                FILE_EXISTS,
                "file does not exist",
            )]));
        }

        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        let input = CheckInput {
            path: path.to_path_buf(),
            text: String::from_utf8_lossy(&bytes).into_owned(),
            config: Arc::clone(&self.config),
            runner: Arc::clone(&self.runner),
            timeout: self.timeout,
        };

        let results = futures::future::join_all(SUITE.iter().map(|check| {
            let input = &input;
            async move {
                let result = check.evaluate(input).await;
                tracing::debug!(check = check.name, passed = result.passed, "check done");
                result
            }
        }))
        .await;

        Ok(SuiteOutcome::from_results(results))
    }
}
