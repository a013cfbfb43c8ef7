use std::fmt;
use std::str::FromStr;

use super::AppError;

/// Repository used when neither the command line nor the config names one.
pub const DEFAULT_REPOSITORY: &str = "Quasimondo/OpenMender";

/// Owner and name of a remote repository.
///
/// Guarantees:
/// - Both parts are non-empty
/// - Neither part contains `/` or whitespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryHandle {
    owner: String,
    name: String,
}

impl RepositoryHandle {
    pub fn new(owner: &str, name: &str) -> Result<Self, AppError> {
        if !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(AppError::invalid_argument(format!(
                "Invalid repository '{}/{}': expected owner/name",
                owner, name
            )));
        }
        Ok(Self { owner: owner.to_string(), name: name.to_string() })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains('/') && !segment.chars().any(char::is_whitespace)
}

impl FromStr for RepositoryHandle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
        match trimmed.split_once('/') {
            Some((owner, name)) => RepositoryHandle::new(owner, name),
            None => Err(AppError::invalid_argument(format!(
                "Invalid repository '{}': expected owner/name",
                s
            ))),
        }
    }
}

impl Default for RepositoryHandle {
    fn default() -> Self {
        Self { owner: "Quasimondo".to_string(), name: "OpenMender".to_string() }
    }
}

impl fmt::Display for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
