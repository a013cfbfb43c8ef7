use chrono::{DateTime, Utc};

use crate::domain::ForgeError;

/// Repository metadata shown in the basic view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    pub path: String,
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    pub sha: String,
}

/// A file fetched with its decoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub sha: String,
    pub size: u64,
    pub content: Vec<u8>,
}

impl RemoteFile {
    /// Content as UTF-8, or `None` for binary files.
    pub fn text(&self) -> Option<String> {
        String::from_utf8(self.content.clone()).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSummary {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    pub message: String,
    pub date: DateTime<Utc>,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discussion {
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub comments: Vec<String>,
}

/// Payload for creating an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub milestone: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueInfo {
    pub number: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestInfo {
    pub number: u64,
    pub url: String,
    pub head: String,
    pub base: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
}

/// Remote operations against a single repository.
///
/// Every call blocks until the forge answers. Implementations never retry.
pub trait ForgePort {
    fn repository_info(&self) -> Result<RepositoryInfo, ForgeError>;

    fn topics(&self) -> Result<Vec<String>, ForgeError>;

    /// List a directory. `path` is relative to the repository root; `""` is the root.
    fn list_directory(
        &self,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Vec<ContentEntry>, ForgeError>;

    fn get_file(&self, path: &str, git_ref: Option<&str>) -> Result<RemoteFile, ForgeError>;

    /// Open issues, excluding pull requests.
    fn list_open_issues(&self) -> Result<Vec<IssueSummary>, ForgeError>;

    fn list_issue_comments(&self, number: u64) -> Result<Vec<String>, ForgeError>;

    /// Pull requests in any state, most recently updated first.
    fn list_recent_pull_requests(
        &self,
        limit: usize,
    ) -> Result<Vec<PullRequestSummary>, ForgeError>;

    /// Most recent commits touching `path`, with their changed files.
    fn list_recent_commits(
        &self,
        path: &str,
        limit: usize,
    ) -> Result<Vec<CommitRecord>, ForgeError>;

    /// Discussion threads. Returns `ForgeError::Unsupported` when the client
    /// cannot issue GraphQL queries.
    fn list_discussions(&self, limit: usize) -> Result<Vec<Discussion>, ForgeError>;

    /// Tip commit SHA of `branch`.
    fn branch_head(&self, branch: &str) -> Result<String, ForgeError>;

    fn create_branch(&self, branch: &str, sha: &str) -> Result<(), ForgeError>;

    fn delete_branch(&self, branch: &str) -> Result<(), ForgeError>;

    /// Commit a new file on `branch`; returns the commit SHA.
    fn create_file(
        &self,
        path: &str,
        message: &str,
        content: &str,
        branch: &str,
    ) -> Result<String, ForgeError>;

    /// Commit a new version of an existing file whose blob SHA is `sha`.
    fn update_file(
        &self,
        path: &str,
        message: &str,
        content: &str,
        sha: &str,
        branch: &str,
    ) -> Result<String, ForgeError>;

    fn create_issue(&self, issue: &NewIssue) -> Result<IssueInfo, ForgeError>;

    fn create_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequestInfo, ForgeError>;

    fn get_milestone(&self, number: u64) -> Result<Milestone, ForgeError>;

    fn add_assignees(&self, issue_number: u64, assignees: &[String]) -> Result<(), ForgeError>;

    fn set_milestone(&self, issue_number: u64, milestone: u64) -> Result<(), ForgeError>;
}
