use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

/// External tool invocation; the script path is appended after `args`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolConfig {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Literals the text checks look for. Lists are allow-lists: any entry matches.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Patterns {
    pub shebang: String,
    pub strict_mode: String,
    pub manifest_guards: Vec<String>,
    pub install_commands: Vec<String>,
    pub build_commands: Vec<String>,
    /// Counted when followed by a single space.
    pub process_replacement: String,
    pub failure_exit: String,
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            shebang: "#!/bin/bash".to_string(),
            strict_mode: "set -e".to_string(),
            manifest_guards: vec![
                "[ ! -f package.json ]".to_string(),
                "if [ ! -f package.json ]".to_string(),
            ],
            install_commands: vec!["npm install".to_string()],
            build_commands: vec!["npm run build".to_string(), "yarn build".to_string()],
            process_replacement: "exec".to_string(),
            failure_exit: "exit 1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    /// Package names that must appear as double-quoted literals, in report order.
    pub frameworks: Vec<String>,
    /// Deadline for each external tool run; the tool is killed when it passes.
    pub timeout_secs: u64,
    pub linter: ToolConfig,
    pub syntax: ToolConfig,
    pub patterns: Patterns,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            frameworks: ["next", "nuxt", "@angular/core", "vue", "react"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
            timeout_secs: 120,
            linter: ToolConfig::new("shellcheck", &[]),
            syntax: ToolConfig::new("bash", &["-n"]),
            patterns: Patterns::default(),
        }
    }
}

impl CheckerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject values that would make a check pass or fail regardless of the script.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }
        for (key, tool) in [("linter", &self.linter), ("syntax", &self.syntax)] {
            if tool.program.trim().is_empty() {
                bail!("{key}.program must not be empty");
            }
        }
        if self.frameworks.iter().any(|f| f.is_empty()) {
            bail!("frameworks must not contain an empty name");
        }

        let p = &self.patterns;
        for (key, literal) in [
            ("shebang", &p.shebang),
            ("strict_mode", &p.strict_mode),
            ("process_replacement", &p.process_replacement),
            ("failure_exit", &p.failure_exit),
        ] {
            if literal.is_empty() {
                bail!("patterns.{key} must not be empty");
            }
        }
        for (key, list) in [
            ("manifest_guards", &p.manifest_guards),
            ("install_commands", &p.install_commands),
            ("build_commands", &p.build_commands),
        ] {
            if list.is_empty() || list.iter().any(|l| l.is_empty()) {
                bail!("patterns.{key} needs at least one non-empty entry");
            }
        }
        Ok(())
    }
}

/// Load checker configuration from a TOML file. Missing keys keep their defaults.
pub fn load_config(path: &Path) -> anyhow::Result<CheckerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: CheckerConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    Ok(config)
}
