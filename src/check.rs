use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CheckerConfig, ToolConfig};
use crate::exec::{CommandRunner, ExecResult};
use crate::types::CheckResult;

pub const FILE_EXISTS: &str = "File exists";
pub const LINTER: &str = "ShellCheck";
pub const SYNTAX: &str = "Bash syntax";
pub const SHEBANG: &str = "Shebang";
pub const STRICT_MODE: &str = "set -e";
pub const MANIFEST_GUARD: &str = "package.json guard";
pub const FRAMEWORKS: &str = "Framework detection";
pub const NPM_COMMANDS: &str = "npm commands";
pub const EXEC_USAGE: &str = "exec usage";
pub const FAILURE_EXIT: &str = "Error handling";

/// Everything a check may look at. Shared read-only by every check of a run.
pub struct CheckInput {
    pub path: PathBuf,
    pub text: String,
    pub config: Arc<CheckerConfig>,
    pub runner: Arc<dyn CommandRunner>,
    /// Deadline for each external tool.
    pub timeout: Duration,
}

pub enum CheckKind {
    /// Pure scan of the script text.
    Text(fn(&CheckInput) -> CheckResult),
    /// Runs an external tool on the script and judges the finished run.
    /// A tool that is missing or times out fails the check with the runner's error.
    Tool {
        tool: fn(&CheckerConfig) -> &ToolConfig,
        verdict: fn(&ToolConfig, ExecResult) -> CheckResult,
    },
}

pub struct Check {
    pub name: &'static str,
    pub kind: CheckKind,
}

impl Check {
    pub async fn evaluate(&self, input: &CheckInput) -> CheckResult {
        match &self.kind {
            CheckKind::Text(scan) => scan(input),
            CheckKind::Tool { tool, verdict } => {
                let tool = tool(&*input.config);
                match run_tool(input, tool).await {
                    Ok(exec) => verdict(tool, exec),
                    Err(e) => CheckResult::fail(self.name, format!("{e:#}")),
                }
            }
        }
    }
}

/// The checklist, in report order.
pub static SUITE: [Check; 10] = [
    Check {
        name: FILE_EXISTS,
        kind: CheckKind::Text(file_exists),
    },
    Check {
        name: LINTER,
        kind: CheckKind::Tool {
            tool: linter_tool,
            verdict: linter,
        },
    },
    Check {
        name: SYNTAX,
        kind: CheckKind::Tool {
            tool: syntax_tool,
            verdict: syntax,
        },
    },
    Check {
        name: SHEBANG,
        kind: CheckKind::Text(shebang),
    },
    Check {
        name: STRICT_MODE,
        kind: CheckKind::Text(strict_mode),
    },
    Check {
        name: MANIFEST_GUARD,
        kind: CheckKind::Text(manifest_guard),
    },
    Check {
        name: FRAMEWORKS,
        kind: CheckKind::Text(frameworks),
    },
    Check {
        name: NPM_COMMANDS,
        kind: CheckKind::Text(npm_commands),
    },
    Check {
        name: EXEC_USAGE,
        kind: CheckKind::Text(exec_usage),
    },
    Check {
        name: FAILURE_EXIT,
        kind: CheckKind::Text(failure_exit),
    },
];

fn file_exists(input: &CheckInput) -> CheckResult {
    if input.path.exists() {
        CheckResult::pass(FILE_EXISTS, "file found")
    } else {
        CheckResult::fail(FILE_EXISTS, "file does not exist")
    }
}

/// Run `tool` with the script path appended to its configured args.
async fn run_tool(input: &CheckInput, tool: &ToolConfig) -> anyhow::Result<ExecResult> {
    let path = input.path.to_string_lossy();
    let mut args: Vec<&str> = tool.args.iter().map(String::as_str).collect();
    args.push(&path);
    input.runner.run(&tool.program, &args, input.timeout).await
}

fn linter_tool(config: &CheckerConfig) -> &ToolConfig {
    &config.linter
}

fn syntax_tool(config: &CheckerConfig) -> &ToolConfig {
    &config.syntax
}

fn linter(tool: &ToolConfig, exec: ExecResult) -> CheckResult {
    if exec.exit_code == 0 {
        CheckResult::pass(LINTER, format!("{} passed", tool.program))
    } else {
        CheckResult::fail(
            LINTER,
            format!("{} findings: {}", tool.program, exec.diagnostics()),
        )
    }
}

fn syntax(_tool: &ToolConfig, exec: ExecResult) -> CheckResult {
    if exec.exit_code == 0 {
        CheckResult::pass(SYNTAX, "syntax is valid")
    } else {
        CheckResult::fail(SYNTAX, format!("syntax error: {}", exec.diagnostics()))
    }
}

fn shebang(input: &CheckInput) -> CheckResult {
    let expected = &input.config.patterns.shebang;
    if input.text.starts_with(expected.as_str()) {
        CheckResult::pass(SHEBANG, "shebang present")
    } else {
        CheckResult::fail(SHEBANG, format!("missing {expected}"))
    }
}

fn strict_mode(input: &CheckInput) -> CheckResult {
    let expected = &input.config.patterns.strict_mode;
    if input.text.contains(expected.as_str()) {
        CheckResult::pass(STRICT_MODE, format!("{expected} enabled"))
    } else {
        CheckResult::fail(STRICT_MODE, format!("missing {expected} to abort on errors"))
    }
}

fn contains_any(text: &str, literals: &[String]) -> bool {
    literals.iter().any(|l| text.contains(l.as_str()))
}

fn manifest_guard(input: &CheckInput) -> CheckResult {
    if contains_any(&input.text, &input.config.patterns.manifest_guards) {
        CheckResult::pass(MANIFEST_GUARD, "package.json existence check present")
    } else {
        CheckResult::fail(MANIFEST_GUARD, "no check that package.json exists")
    }
}

fn frameworks(input: &CheckInput) -> CheckResult {
    let missing: Vec<&str> = input
        .config
        .frameworks
        .iter()
        .filter(|f| !input.text.contains(&format!("\"{f}\"")))
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        CheckResult::pass(FRAMEWORKS, "all expected frameworks are detected")
    } else {
        CheckResult::fail(FRAMEWORKS, format!("missing checks for: {}", missing.join(", ")))
    }
}

fn npm_commands(input: &CheckInput) -> CheckResult {
    let patterns = &input.config.patterns;
    let has_install = contains_any(&input.text, &patterns.install_commands);
    let has_build = contains_any(&input.text, &patterns.build_commands);

    if has_install && has_build {
        return CheckResult::pass(NPM_COMMANDS, "install and build commands present");
    }
    let mut missing = Vec::new();
    if !has_install {
        missing.push(patterns.install_commands.join(" / "));
    }
    if !has_build {
        missing.push("build command".to_string());
    }
    CheckResult::fail(NPM_COMMANDS, format!("missing: {}", missing.join(", ")))
}

fn exec_usage(input: &CheckInput) -> CheckResult {
    let keyword = &input.config.patterns.process_replacement;
    if keyword.is_empty() {
        return CheckResult::fail(EXEC_USAGE, "no process-replacement keyword configured");
    }
    let count = input.text.matches(&format!("{keyword} ")).count();
    let message = format!("found {count} {keyword} usages (process replacement)");
    if count > 0 {
        CheckResult::pass(EXEC_USAGE, message)
    } else {
        CheckResult::fail(EXEC_USAGE, message)
    }
}

fn failure_exit(input: &CheckInput) -> CheckResult {
    let expected = &input.config.patterns.failure_exit;
    if input.text.contains(expected.as_str()) {
        CheckResult::pass(FAILURE_EXIT, format!("explicit failure exit present ({expected})"))
    } else {
        CheckResult::fail(FAILURE_EXIT, format!("no explicit failure exit ({expected})"))
    }
}


#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Returns a canned result for every program. Honors the timeout like the
    /// system runner does.
    pub(crate) struct FakeRunner {
        pub exit_code: i32,
        pub stdout: &'static str,
        pub stderr: &'static str,
        pub delay: Duration,
    }

    impl FakeRunner {
        pub(crate) fn ok() -> Self {
            Self {
                exit_code: 0,
                stdout: "",
                stderr: "",
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(
            &self,
            program: &str,
            _args: &[&str],
            timeout: Duration,
        ) -> anyhow::Result<ExecResult> {
            if self.delay > timeout {
                tokio::time::sleep(timeout).await;
                anyhow::bail!("{program} timed out after {}s", timeout.as_secs_f64());
            }
            tokio::time::sleep(self.delay).await;
            Ok(ExecResult {
                exit_code: self.exit_code,
                stdout: self.stdout.to_string(),
                stderr: self.stderr.to_string(),
                duration: self.delay,
            })
        }
    }

    struct MissingRunner;

    #[async_trait]
    impl CommandRunner for MissingRunner {
        async fn run(
            &self,
            program: &str,
            _args: &[&str],
            _timeout: Duration,
        ) -> anyhow::Result<ExecResult> {
            anyhow::bail!("{program} not found on PATH")
        }
    }

    /// Records the argv it was asked to run.
    struct RecordingRunner(std::sync::Mutex<Vec<String>>);

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(
            &self,
            program: &str,
            args: &[&str],
            timeout: Duration,
        ) -> anyhow::Result<ExecResult> {
            let mut argv = vec![program.to_string()];
            argv.extend(args.iter().map(|a| a.to_string()));
            *self.0.lock().unwrap() = argv;
            FakeRunner::ok().run(program, args, timeout).await
        }
    }

    pub(crate) const GOOD_SCRIPT: &str = r#"#!/bin/bash
set -e

if [ ! -f package.json ]; then
    echo "package.json not found"
    exit 1
fi

for fw in "next" "nuxt" "@angular/core" "vue" "react"; do
    grep -q "\"$fw\"" package.json && FRAMEWORK="$fw"
done

npm install
npm run build
exec npm start
"#;

    fn input_with(
        text: &str,
        config: CheckerConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> CheckInput {
        CheckInput {
            path: PathBuf::from("/tmp/java_script_run.sh"),
            text: text.to_string(),
            config: Arc::new(config),
            runner,
            timeout: Duration::from_secs(5),
        }
    }

    fn input(text: &str, runner: Arc<dyn CommandRunner>) -> CheckInput {
        input_with(text, CheckerConfig::default(), runner)
    }

    fn text_input(text: &str) -> CheckInput {
        input(text, Arc::new(FakeRunner::ok()))
    }

    #[test]
    fn test_suite_order_and_names() {
        let names: Vec<&str> = SUITE.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                FILE_EXISTS,
                LINTER,
                SYNTAX,
                SHEBANG,
                STRICT_MODE,
                MANIFEST_GUARD,
                FRAMEWORKS,
                NPM_COMMANDS,
                EXEC_USAGE,
                FAILURE_EXIT,
            ]
        );
    }

    #[tokio::test]
    async fn test_good_script_passes_text_checks() {
        let input = text_input(GOOD_SCRIPT);
        for check in &SUITE[3..] {
            let result = check.evaluate(&input).await;
            assert!(result.passed, "{} failed: {}", result.name, result.message);
            assert_eq!(result.name, check.name);
        }
    }

    #[test]
    fn test_shebang_must_be_first() {
        let result = shebang(&text_input("\n#!/bin/bash\n"));
        assert!(!result.passed);
        assert_eq!(result.message, "missing #!/bin/bash");
        assert!(shebang(&text_input("#!/bin/bash\necho hi\n")).passed);
    }

    #[test]
    fn test_strict_mode_missing() {
        let result = strict_mode(&text_input("#!/bin/bash\nnpm install\n"));
        assert!(!result.passed);
        assert!(result.message.contains("set -e"));
    }

    #[test]
    fn test_manifest_guard_bare_condition() {
        let result = manifest_guard(&text_input("[ ! -f package.json ] && exit 1\n"));
        assert!(result.passed);
    }

    #[test]
    fn test_manifest_guard_missing() {
        let result = manifest_guard(&text_input("test -f package.json || exit 1\n"));
        assert!(!result.passed);
    }

    #[test]
    fn test_frameworks_reports_missing_in_list_order() {
        let text = r#"case "$x" in "react") ;; "next") ;; "vue") ;; esac"#;
        let result = frameworks(&text_input(text));
        assert!(!result.passed);
        assert_eq!(result.message, "missing checks for: nuxt, @angular/core");
    }

    #[test]
    fn test_frameworks_requires_quotes() {
        let result = frameworks(&text_input("next nuxt @angular/core vue react"));
        assert!(!result.passed);
        assert_eq!(
            result.message,
            "missing checks for: next, nuxt, @angular/core, vue, react"
        );
    }

    #[test]
    fn test_npm_commands_yarn_build_accepted() {
        assert!(npm_commands(&text_input("npm install\nyarn build\n")).passed);
    }

    #[test]
    fn test_npm_commands_missing_both() {
        let result = npm_commands(&text_input("echo nothing\n"));
        assert!(!result.passed);
        assert_eq!(result.message, "missing: npm install, build command");
    }

    #[test]
    fn test_npm_commands_missing_build_only() {
        let result = npm_commands(&text_input("npm install\n"));
        assert_eq!(result.message, "missing: build command");
    }

    #[test]
    fn test_exec_usage_counts_occurrences() {
        let result = exec_usage(&text_input("exec npm start\nelse\n  exec node server.js\n"));
        assert!(result.passed);
        assert_eq!(result.message, "found 2 exec usages (process replacement)");
    }

    #[test]
    fn test_exec_usage_requires_trailing_space() {
        let result = exec_usage(&text_input("exec\nexecute\n"));
        assert!(!result.passed);
        assert!(result.message.contains("found 0"));
    }

    #[test]
    fn test_exec_usage_empty_keyword_fails() {
        let mut config = CheckerConfig::default();
        config.patterns.process_replacement = String::new();
        let input = input_with("a b c d\n", config, Arc::new(FakeRunner::ok()));
        let result = exec_usage(&input);
        assert!(!result.passed);
        assert_eq!(result.message, "no process-replacement keyword configured");
    }

    #[test]
    fn test_failure_exit() {
        assert!(failure_exit(&text_input("exit 1\n")).passed);
        assert!(!failure_exit(&text_input("exit 0\n")).passed);
    }

    #[tokio::test]
    async fn test_linter_failure_surfaces_output() {
        let runner = FakeRunner {
            exit_code: 1,
            stdout: "In run.sh line 4:\nSC2086: Double quote to prevent globbing\n",
            stderr: "",
            delay: Duration::ZERO,
        };
        let result = SUITE[1].evaluate(&input(GOOD_SCRIPT, Arc::new(runner))).await;
        assert_eq!(result.name, LINTER);
        assert!(!result.passed);
        assert!(result.message.starts_with("shellcheck findings:"));
        assert!(result.message.contains("SC2086"));
    }

    #[tokio::test]
    async fn test_syntax_failure_surfaces_stderr() {
        let runner = FakeRunner {
            exit_code: 2,
            stdout: "",
            stderr: "run.sh: line 9: syntax error: unexpected end of file\n",
            delay: Duration::ZERO,
        };
        let result = SUITE[2].evaluate(&input(GOOD_SCRIPT, Arc::new(runner))).await;
        assert_eq!(result.name, SYNTAX);
        assert!(!result.passed);
        assert!(result.message.contains("unexpected end of file"));
    }

    #[tokio::test]
    async fn test_tool_missing_is_a_failed_check() {
        let result = SUITE[1].evaluate(&input(GOOD_SCRIPT, Arc::new(MissingRunner))).await;
        assert_eq!(result.name, LINTER);
        assert!(!result.passed);
        assert_eq!(result.message, "shellcheck not found on PATH");
    }

    #[tokio::test]
    async fn test_syntax_invocation_appends_path() {
        let runner = Arc::new(RecordingRunner(std::sync::Mutex::new(Vec::new())));
        let result = SUITE[2].evaluate(&input(GOOD_SCRIPT, runner.clone())).await;
        assert!(result.passed);
        assert_eq!(
            *runner.0.lock().unwrap(),
            vec!["bash", "-n", "/tmp/java_script_run.sh"]
        );
    }
}
