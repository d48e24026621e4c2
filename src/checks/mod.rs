//! Individual pre-flight checks.
//!
//! Every check returns a [`CheckResult`]; API failures are folded into a
//! failing result at the check boundary and never escape as errors.

mod inventory;
mod reachability;

pub use inventory::{
    TargetAvailability, TemplateLookup, evaluate_storage, evaluate_targets, evaluate_template,
    lookup_template, partition_targets, permissions, storage, suggest_free_ids, target_ids,
    template,
};
pub use reachability::{api_liveness, authentication, connectivity};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    Connectivity,
    ApiLiveness,
    Authentication,
    Permissions,
    Template,
    TargetIds,
    Storage,
}

impl CheckKind {
    /// Stable short identifier, used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Connectivity => "connectivity",
            Self::ApiLiveness => "api",
            Self::Authentication => "authentication",
            Self::Permissions => "permissions",
            Self::Template => "template",
            Self::TargetIds => "target-ids",
            Self::Storage => "storage",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Connectivity => "Testing Basic Connectivity",
            Self::ApiLiveness => "Testing API Endpoint",
            Self::Authentication => "Testing Authentication",
            Self::Permissions => "Testing Permissions",
            Self::Template => "Testing Template",
            Self::TargetIds => "Checking Target VM IDs",
            Self::Storage => "Testing Storage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Passed,
    /// Advisory: surfaced distinctly but counts as a pass.
    Warning,
    Failed,
}

impl CheckStatus {
    pub fn is_pass(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// One diagnostic line under a check heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Ok(String),
    Fail(String),
    Warn(String),
    Info(String),
}

impl Line {
    pub fn text(&self) -> &str {
        match self {
            Self::Ok(t) | Self::Fail(t) | Self::Warn(t) | Self::Info(t) => t,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub kind: CheckKind,
    pub status: CheckStatus,
    /// One-line summary, repeated in the final report for failures and warnings.
    pub message: String,
    pub lines: Vec<Line>,
    /// Remediation steps, rendered under "ACTION REQUIRED".
    pub actions: Vec<String>,
}

impl CheckResult {
    pub fn new(kind: CheckKind) -> Self {
        Self {
            kind,
            status: CheckStatus::Passed,
            message: String::new(),
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.status.is_pass()
    }

    pub fn ok(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Ok(text.into()));
    }

    pub fn fail(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Fail(text.into()));
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Warn(text.into()));
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Info(text.into()));
    }

    pub fn action(&mut self, text: impl Into<String>) {
        self.actions.push(text.into());
    }

    pub fn pass_with(mut self, message: impl Into<String>) -> Self {
        self.status = CheckStatus::Passed;
        self.message = message.into();
        self
    }

    pub fn warn_with(mut self, message: impl Into<String>) -> Self {
        self.status = CheckStatus::Warning;
        self.message = message.into();
        self
    }

    pub fn fail_with(mut self, message: impl Into<String>) -> Self {
        self.status = CheckStatus::Failed;
        self.message = message.into();
        self
    }

    /// Fold an unexpected API failure into this result.
    pub fn error(mut self, context: &str, err: &ApiError) -> Self {
        let message = format!("{context}: {err}");
        tracing::debug!(check = self.kind.name(), error = %err, "{context}");
        self.fail(message.clone());
        self.fail_with(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_counts_as_pass() {
        assert!(CheckStatus::Passed.is_pass());
        assert!(CheckStatus::Warning.is_pass());
        assert!(!CheckStatus::Failed.is_pass());
    }

    #[test]
    fn error_folds_into_failure() {
        let err = ApiError::Status {
            url: "https://pve:8006/api2/json/nodes".into(),
            status: 403,
        };
        let result = CheckResult::new(CheckKind::Permissions).error("Cannot list nodes", &err);
        assert_eq!(result.status, CheckStatus::Failed);
        assert!(result.message.starts_with("Cannot list nodes:"));
        assert!(result.message.contains("403"));
        assert!(matches!(result.lines.last(), Some(Line::Fail(_))));
    }
}
