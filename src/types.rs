/// Verdict of a single check. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
}

impl CheckResult {
    pub fn pass(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.into(),
        }
    }

    pub fn fail(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.into(),
        }
    }
}
