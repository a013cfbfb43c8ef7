use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};

use crate::domain::ForgeError;
use crate::ports::{
    CommitRecord, ContentEntry, Discussion, EntryKind, ForgePort, IssueInfo, IssueSummary,
    Milestone, NewIssue, PullRequestInfo, PullRequestSummary, RemoteFile, RepositoryInfo,
};

/// In-memory forge that records every call.
///
/// Failures are injected per operation (`"create_file"`) or per operation and
/// argument (`"create_file:docs/a.md"`).
pub struct FakeForge {
    pub info: Mutex<RepositoryInfo>,
    pub topics: Mutex<Vec<String>>,
    pub listings: Mutex<HashMap<String, Vec<ContentEntry>>>,
    pub files: Mutex<HashMap<String, RemoteFile>>,
    pub issues: Mutex<Vec<IssueSummary>>,
    pub comments: Mutex<HashMap<u64, Vec<String>>>,
    pub pulls: Mutex<Vec<PullRequestSummary>>,
    pub commits: Mutex<Vec<CommitRecord>>,
    pub discussions: Mutex<Vec<Discussion>>,
    pub branches: Mutex<HashMap<String, String>>,
    pub milestones: Mutex<HashMap<u64, Milestone>>,
    pub created_issues: Mutex<Vec<NewIssue>>,
    pub created_pulls: Mutex<Vec<PullRequestInfo>>,
    pub commits_made: Mutex<Vec<String>>,
    pub assigned: Mutex<Vec<(u64, Vec<String>)>>,
    pub milestones_set: Mutex<Vec<(u64, u64)>>,
    pub deleted_branches: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, ForgeError>>,
    next_number: Mutex<u64>,
}

impl Default for FakeForge {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeForge {
    pub fn new() -> Self {
        let mut branches = HashMap::new();
        branches.insert("main".to_string(), "base-sha".to_string());
        Self {
            info: Mutex::new(RepositoryInfo {
                name: "OpenMender".into(),
                description: Some("Test Description".into()),
            }),
            topics: Mutex::new(vec!["ai".into(), "automation".into()]),
            listings: Mutex::new(HashMap::new()),
            files: Mutex::new(HashMap::new()),
            issues: Mutex::new(Vec::new()),
            comments: Mutex::new(HashMap::new()),
            pulls: Mutex::new(Vec::new()),
            commits: Mutex::new(Vec::new()),
            discussions: Mutex::new(Vec::new()),
            branches: Mutex::new(branches),
            milestones: Mutex::new(HashMap::new()),
            created_issues: Mutex::new(Vec::new()),
            created_pulls: Mutex::new(Vec::new()),
            commits_made: Mutex::new(Vec::new()),
            assigned: Mutex::new(Vec::new()),
            milestones_set: Mutex::new(Vec::new()),
            deleted_branches: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            next_number: Mutex::new(1),
        }
    }

    /// Fake mirroring a small OpenMender checkout.
    pub fn open_mender() -> Self {
        let forge = Self::new();
        forge.add_listing("", &["README.md", "bootstrap/", "agent/"]);
        forge.add_listing("bootstrap", &["README.md", "tools/"]);
        forge.add_listing("bootstrap/tools", &["gather.py"]);
        forge.add_listing("agent", &["core.py"]);
        forge.add_file("README.md", "# OpenMender\nTest readme");
        forge.add_file("bootstrap/README.md", "# Bootstrap\nTest bootstrap readme");
        forge.add_file("bootstrap/tools/gather.py", "print('gather')\n");
        forge.add_file("agent/core.py", "def run():\n    pass\n");
        forge.add_file("CONTRIBUTING.md", "# Contributing\nTest guide");
        forge.add_file("CODE_OF_CONDUCT.md", "# Code of Conduct\nTest conduct");
        forge.add_listing(".github/ISSUE_TEMPLATE", &["bug.yml", "feature.md"]);
        forge.add_file(".github/ISSUE_TEMPLATE/bug.yml", "name: Bug Report\nfields: []\n");
        forge.add_file(
            ".github/ISSUE_TEMPLATE/feature.md",
            "## Request\n<!-- Add your content here -->\n",
        );
        forge.commits.lock().unwrap().push(CommitRecord {
            sha: "c1".into(),
            message: "Test commit".into(),
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            files: vec!["test.py".into()],
        });
        forge
    }

    /// Register a directory listing. Names ending in `/` are directories.
    pub fn add_listing(&self, dir: &str, names: &[&str]) {
        let entries = names
            .iter()
            .map(|raw| {
                let (name, kind) = match raw.strip_suffix('/') {
                    Some(name) => (name, EntryKind::Dir),
                    None => (*raw, EntryKind::File),
                };
                let path =
                    if dir.is_empty() { name.to_string() } else { format!("{}/{}", dir, name) };
                let sha = format!("sha-{}", path);
                ContentEntry { path, name: name.to_string(), kind, size: 0, sha }
            })
            .collect();
        self.listings.lock().unwrap().insert(dir.to_string(), entries);
    }

    pub fn add_file(&self, path: &str, content: &str) {
        let file = RemoteFile {
            path: path.to_string(),
            sha: format!("sha-{}", path),
            size: content.len() as u64,
            content: content.as_bytes().to_vec(),
        };
        self.files.lock().unwrap().insert(path.to_string(), file);
    }

    pub fn add_milestone(&self, number: u64, title: &str) {
        self.milestones
            .lock()
            .unwrap()
            .insert(number, Milestone { number, title: title.to_string() });
    }

    /// Make `key` (`"op"` or `"op:arg"`) fail with `error`.
    pub fn fail(&self, key: &str, error: ForgeError) {
        self.failures.lock().unwrap().insert(key.to_string(), error);
    }

    /// Number of recorded calls whose key starts with `prefix`.
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, op: &str, arg: &str) -> Result<(), ForgeError> {
        let key = format!("{}:{}", op, arg);
        self.calls.lock().unwrap().push(key.clone());
        let failures = self.failures.lock().unwrap();
        match failures.get(&key).or_else(|| failures.get(op)) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn take_number(&self) -> u64 {
        let mut next = self.next_number.lock().unwrap();
        let number = *next;
        *next += 1;
        number
    }

    fn commit(&self, op: &str, path: &str, content: &str) -> String {
        self.add_file(path, content);
        let mut made = self.commits_made.lock().unwrap();
        made.push(format!("{}:{}", op, path));
        format!("commit-{}", made.len())
    }
}

impl ForgePort for FakeForge {
    fn repository_info(&self) -> Result<RepositoryInfo, ForgeError> {
        self.record("repository_info", "")?;
        Ok(self.info.lock().unwrap().clone())
    }

    fn topics(&self) -> Result<Vec<String>, ForgeError> {
        self.record("topics", "")?;
        Ok(self.topics.lock().unwrap().clone())
    }

    fn list_directory(
        &self,
        path: &str,
        _git_ref: Option<&str>,
    ) -> Result<Vec<ContentEntry>, ForgeError> {
        self.record("list_directory", path)?;
        self.listings
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ForgeError::not_found(path))
    }

    fn get_file(&self, path: &str, _git_ref: Option<&str>) -> Result<RemoteFile, ForgeError> {
        self.record("get_file", path)?;
        self.files.lock().unwrap().get(path).cloned().ok_or_else(|| ForgeError::not_found(path))
    }

    fn list_open_issues(&self) -> Result<Vec<IssueSummary>, ForgeError> {
        self.record("list_open_issues", "")?;
        Ok(self.issues.lock().unwrap().clone())
    }

    fn list_issue_comments(&self, number: u64) -> Result<Vec<String>, ForgeError> {
        self.record("list_issue_comments", &number.to_string())?;
        Ok(self.comments.lock().unwrap().get(&number).cloned().unwrap_or_default())
    }

    fn list_recent_pull_requests(
        &self,
        limit: usize,
    ) -> Result<Vec<PullRequestSummary>, ForgeError> {
        self.record("list_recent_pull_requests", &limit.to_string())?;
        Ok(self.pulls.lock().unwrap().iter().take(limit).cloned().collect())
    }

    fn list_recent_commits(
        &self,
        path: &str,
        limit: usize,
    ) -> Result<Vec<CommitRecord>, ForgeError> {
        self.record("list_recent_commits", path)?;
        Ok(self.commits.lock().unwrap().iter().take(limit).cloned().collect())
    }

    fn list_discussions(&self, limit: usize) -> Result<Vec<Discussion>, ForgeError> {
        self.record("list_discussions", &limit.to_string())?;
        Ok(self.discussions.lock().unwrap().iter().take(limit).cloned().collect())
    }

    fn branch_head(&self, branch: &str) -> Result<String, ForgeError> {
        self.record("branch_head", branch)?;
        self.branches
            .lock()
            .unwrap()
            .get(branch)
            .cloned()
            .ok_or_else(|| ForgeError::not_found(format!("branch {}", branch)))
    }

    fn create_branch(&self, branch: &str, sha: &str) -> Result<(), ForgeError> {
        self.record("create_branch", branch)?;
        let mut branches = self.branches.lock().unwrap();
        if branches.contains_key(branch) {
            return Err(ForgeError::Api {
                status: 422,
                message: "Reference already exists".into(),
            });
        }
        branches.insert(branch.to_string(), sha.to_string());
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> Result<(), ForgeError> {
        self.record("delete_branch", branch)?;
        self.branches.lock().unwrap().remove(branch);
        self.deleted_branches.lock().unwrap().push(branch.to_string());
        Ok(())
    }

    fn create_file(
        &self,
        path: &str,
        _message: &str,
        content: &str,
        _branch: &str,
    ) -> Result<String, ForgeError> {
        self.record("create_file", path)?;
        Ok(self.commit("create", path, content))
    }

    fn update_file(
        &self,
        path: &str,
        _message: &str,
        content: &str,
        _sha: &str,
        _branch: &str,
    ) -> Result<String, ForgeError> {
        self.record("update_file", path)?;
        Ok(self.commit("update", path, content))
    }

    fn create_issue(&self, issue: &NewIssue) -> Result<IssueInfo, ForgeError> {
        self.record("create_issue", &issue.title)?;
        self.created_issues.lock().unwrap().push(issue.clone());
        let number = self.take_number();
        Ok(IssueInfo { number, url: format!("https://github.com/octo/widgets/issues/{}", number) })
    }

    fn create_pull_request(
        &self,
        head: &str,
        base: &str,
        _title: &str,
        _body: &str,
    ) -> Result<PullRequestInfo, ForgeError> {
        self.record("create_pull_request", head)?;
        let number = self.take_number();
        let info = PullRequestInfo {
            number,
            url: format!("https://github.com/octo/widgets/pull/{}", number),
            head: head.to_string(),
            base: base.to_string(),
        };
        self.created_pulls.lock().unwrap().push(info.clone());
        Ok(info)
    }

    fn get_milestone(&self, number: u64) -> Result<Milestone, ForgeError> {
        self.record("get_milestone", &number.to_string())?;
        self.milestones
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .ok_or_else(|| ForgeError::not_found(format!("milestone {}", number)))
    }

    fn add_assignees(&self, issue_number: u64, assignees: &[String]) -> Result<(), ForgeError> {
        self.record("add_assignees", &issue_number.to_string())?;
        self.assigned.lock().unwrap().push((issue_number, assignees.to_vec()));
        Ok(())
    }

    fn set_milestone(&self, issue_number: u64, milestone: u64) -> Result<(), ForgeError> {
        self.record("set_milestone", &issue_number.to_string())?;
        self.milestones_set.lock().unwrap().push((issue_number, milestone));
        Ok(())
    }
}
