//! Requests and outcomes for issue and pull request submissions.

use std::path::Path;

use serde::Serialize;
use serde_yaml::Value;

use super::AppError;

/// Marker in issue templates that receives the caller-supplied body.
pub const TEMPLATE_PLACEHOLDER: &str = "<!-- Add your content here -->";

/// Base branch used when the caller does not name one.
pub const DEFAULT_BASE_BRANCH: &str = "main";

/// Substitute `body` into the template placeholder.
pub fn apply_template(template: &str, body: &str) -> String {
    template.replace(TEMPLATE_PLACEHOLDER, body)
}

/// Split a comma-separated list, trimming entries and dropping blanks and duplicates.
pub fn parse_name_list(raw: &str) -> Vec<String> {
    dedupe_names(raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from))
}

/// Keep the first occurrence of each name, in input order.
pub fn dedupe_names<I: IntoIterator<Item = String>>(names: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct IssueRequest {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub template: Option<String>,
    pub assignees: Vec<String>,
    pub milestone: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct PullRequestRequest {
    pub title: String,
    pub body: String,
    pub branch: String,
    pub changes: ChangeSet,
    pub base: String,
    pub assignees: Vec<String>,
    pub milestone: Option<u64>,
    /// Delete the new branch if any step after its creation fails.
    pub rollback_on_failure: bool,
}

/// Ordered `path -> content` pairs. Iteration follows the caller's order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    entries: Vec<FileChange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub content: String,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a change; a repeated path replaces the earlier content in place.
    /// Paths are repository-relative, so a leading `/` is dropped.
    pub fn push(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into().trim_start_matches('/').to_string();
        let content = content.into();
        match self.entries.iter_mut().find(|entry| entry.path == path) {
            Some(existing) => existing.content = content,
            None => self.entries.push(FileChange { path, content }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileChange> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a YAML mapping of `path: content`. Mapping order is kept.
    pub fn from_yaml(text: &str) -> Result<Self, AppError> {
        let value: Value = serde_yaml::from_str(text)?;
        let mapping = match value {
            Value::Mapping(mapping) => mapping,
            Value::Null => return Ok(Self::new()),
            _ => {
                return Err(AppError::invalid_argument(
                    "Change file must be a mapping of file paths to contents",
                ));
            }
        };

        let mut changes = Self::new();
        for (key, value) in mapping {
            let path = key.as_str().ok_or_else(|| {
                AppError::invalid_argument("Change file keys must be file paths")
            })?;
            let content = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                Value::Bool(_) | Value::Number(_) => {
                    serde_yaml::to_string(&value)?.trim_end().to_string()
                }
                _ => {
                    return Err(AppError::invalid_argument(format!(
                        "Content for '{}' must be a string",
                        path
                    )));
                }
            };
            changes.push(path, content);
        }
        Ok(changes)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }
}

/// How a single file landed on the pull request branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedChange {
    pub path: String,
    pub action: ChangeAction,
}

/// Flat status record returned by issue and pull request creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmissionOutcome {
    Success {
        number: u64,
        url: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        applied_files: Vec<AppliedChange>,
        #[serde(skip_serializing_if = "Option::is_none")]
        rolled_back: Option<bool>,
    },
}

impl SubmissionOutcome {
    pub fn success(number: u64, url: impl Into<String>) -> Self {
        SubmissionOutcome::Success { number, url: url.into(), warnings: Vec::new() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        SubmissionOutcome::Error {
            message: message.into(),
            branch: None,
            applied_files: Vec::new(),
            rolled_back: None,
        }
    }

    /// Error that left `branch` and `applied_files` behind on the remote.
    pub fn partial_error(
        message: impl Into<String>,
        branch: &str,
        applied_files: Vec<AppliedChange>,
        rolled_back: bool,
    ) -> Self {
        SubmissionOutcome::Error {
            message: message.into(),
            branch: Some(branch.to_string()),
            applied_files,
            rolled_back: Some(rolled_back),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success { .. })
    }

    pub fn to_yaml(&self) -> Result<String, AppError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
