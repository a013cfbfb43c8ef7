//! GitHub REST and GraphQL client using reqwest.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, HeaderMap, LINK};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::domain::{AppError, ForgeConfig, ForgeError, RepositoryHandle};
use crate::ports::{
    CommitRecord, ContentEntry, Discussion, EntryKind, ForgePort, IssueInfo, IssueSummary,
    Milestone, NewIssue, PullRequestInfo, PullRequestSummary, RemoteFile, RepositoryInfo,
};

const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const PAGE_SIZE: usize = 100;
const DEFAULT_STATUS_MESSAGE: &str = "GitHub API request failed";

/// HTTP transport for one GitHub repository.
///
/// Each call issues its requests in order and returns on the first failure.
/// There is no retry layer.
#[derive(Clone)]
pub struct HttpForgeClient {
    repo: RepositoryHandle,
    token: Option<String>,
    api_url: Url,
    graphql_url: Url,
    client: Client,
}

impl std::fmt::Debug for HttpForgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpForgeClient")
            .field("repo", &self.repo)
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpForgeClient {
    /// Create a client for `repo`. Without a token only public reads work
    /// and discussions are unavailable.
    pub fn new(
        repo: RepositoryHandle,
        token: Option<String>,
        config: &ForgeConfig,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::config_error(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            repo,
            token: token.filter(|t| !t.trim().is_empty()),
            api_url: config.api_url.clone(),
            graphql_url: config.graphql_endpoint()?,
            client,
        })
    }

    fn repo_url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["repos", self.repo.owner(), self.repo.name()])
                .extend(segments);
        }
        url
    }

    /// `repos/{owner}/{name}/{prefix}/{path...}` with each path segment encoded.
    fn nested_url(&self, prefix: &[&str], path: &str) -> Url {
        let mut url = self.repo_url(prefix);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(path.split('/'));
        }
        url
    }

    fn contents_url(&self, path: &str, git_ref: Option<&str>) -> Url {
        let mut url = self.nested_url(&["contents"], path.trim_start_matches('/'));
        if let Some(git_ref) = git_ref {
            url.query_pairs_mut().append_pair("ref", git_ref);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "forge request");
        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, GITHUB_JSON)
            .header(API_VERSION_HEADER, API_VERSION);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn execute(&self, builder: RequestBuilder, resource: &str) -> Result<Response, ForgeError> {
        let response = builder.send().map_err(|e| ForgeError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body_text = response.text().unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(ForgeError::not_found(resource));
        }

        let message = extract_error_message(&body_text).unwrap_or_else(|| {
            if !body_text.trim().is_empty() {
                body_text.clone()
            } else if status == StatusCode::TOO_MANY_REQUESTS {
                "Rate limited".to_string()
            } else if status.is_server_error() {
                "Server error".to_string()
            } else {
                DEFAULT_STATUS_MESSAGE.to_string()
            }
        });
        Err(ForgeError::Api { status: status.as_u16(), message })
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url, resource: &str) -> Result<T, ForgeError> {
        let response = self.execute(self.request(Method::GET, url), resource)?;
        decode(response)
    }

    fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
        resource: &str,
    ) -> Result<T, ForgeError> {
        let response = self.execute(self.request(method, url).json(body), resource)?;
        decode(response)
    }

    fn send_no_content<B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        resource: &str,
    ) -> Result<(), ForgeError> {
        let mut builder = self.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(builder, resource).map(|_| ())
    }

    /// Follow `Link: rel="next"` until exhausted or `limit` items are collected.
    fn get_paginated<T: DeserializeOwned>(
        &self,
        mut url: Url,
        limit: Option<usize>,
        resource: &str,
    ) -> Result<Vec<T>, ForgeError> {
        let page_size = limit.map_or(PAGE_SIZE, |l| l.clamp(1, PAGE_SIZE));
        url.query_pairs_mut().append_pair("per_page", &page_size.to_string());

        let mut items = Vec::new();
        let mut next = Some(url);
        while let Some(page_url) = next.take() {
            let response = self.execute(self.request(Method::GET, page_url), resource)?;
            next = next_page(response.headers());
            let page: Vec<T> = decode(response)?;
            items.extend(page);
            if limit.is_some_and(|l| items.len() >= l) {
                break;
            }
        }
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    fn commit_files(&self, sha: &str) -> Result<Vec<String>, ForgeError> {
        let detail: ApiCommitDetail =
            self.get_json(self.repo_url(&["commits", sha]), &format!("commit {}", sha))?;
        Ok(detail.files.into_iter().map(|f| f.filename).collect())
    }

    fn put_file(&self, path: &str, body: &PutFileBody<'_>) -> Result<String, ForgeError> {
        let url = self.nested_url(&["contents"], path.trim_start_matches('/'));
        let response: ApiFileCommit = self.send_json(Method::PUT, url, body, path)?;
        Ok(response.commit.sha)
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ForgeError> {
    let text = response.text().map_err(|e| ForgeError::Transport(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| ForgeError::Decode(e.to_string()))
}

fn next_page(headers: &HeaderMap) -> Option<Url> {
    let raw = headers.get(LINK)?.to_str().ok()?;
    raw.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == "rel=\"next\"") {
            return None;
        }
        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        Url::parse(target).ok()
    })
}

fn extract_error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    let parsed = serde_json::from_str::<serde_json::Value>(body).ok()?;
    let message = parsed.get("message").and_then(|m| m.as_str())?;

    let details: Vec<&str> = parsed
        .get("errors")
        .and_then(|errors| errors.as_array())
        .map(|errors| {
            errors.iter().filter_map(|e| e.get("message").and_then(|m| m.as_str())).collect()
        })
        .unwrap_or_default();

    if details.is_empty() {
        Some(message.to_string())
    } else {
        Some(format!("{} ({})", message, details.join("; ")))
    }
}

fn decode_content(raw: &str) -> Result<Vec<u8>, ForgeError> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(cleaned).map_err(|e| ForgeError::Decode(format!("base64 content: {}", e)))
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTopics {
    #[serde(default)]
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiContent {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    path: String,
    sha: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

impl ApiContent {
    fn into_entry(self) -> ContentEntry {
        let kind = match self.kind.as_str() {
            "dir" => EntryKind::Dir,
            "symlink" => EntryKind::Symlink,
            "submodule" => EntryKind::Submodule,
            _ => EntryKind::File,
        };
        ContentEntry { path: self.path, name: self.name, kind, size: self.size, sha: self.sha }
    }
}

/// The contents endpoint answers with an array for directories and an object for files.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiContentListing {
    Directory(Vec<ApiContent>),
    Single(Box<ApiContent>),
}

#[derive(Debug, Deserialize)]
struct ApiLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    labels: Vec<ApiLabel>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiComment {
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPull {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    state: String,
    #[serde(default)]
    labels: Vec<ApiLabel>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitListItem {
    sha: String,
    commit: ApiCommitInner,
}

#[derive(Debug, Deserialize)]
struct ApiCommitInner {
    message: String,
    #[serde(default)]
    author: Option<ApiSignature>,
    #[serde(default)]
    committer: Option<ApiSignature>,
}

#[derive(Debug, Deserialize)]
struct ApiSignature {
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    #[serde(default)]
    files: Vec<ApiCommitFile>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitFile {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct ApiBranch {
    commit: ApiSha,
}

#[derive(Debug, Deserialize)]
struct ApiSha {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiFileCommit {
    commit: ApiSha,
}

#[derive(Debug, Deserialize)]
struct ApiCreated {
    number: u64,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiPullCreated {
    number: u64,
    html_url: String,
    head: ApiRef,
    base: ApiRef,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiMilestone {
    number: u64,
    title: String,
}

#[derive(Debug, Serialize)]
struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    reference: String,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct PutFileBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreateIssueBody<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    labels: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    assignees: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    milestone: Option<u64>,
}

#[derive(Debug, Serialize)]
struct CreatePullBody<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

#[derive(Debug, Serialize)]
struct AssigneesBody<'a> {
    assignees: &'a [String],
}

#[derive(Debug, Serialize)]
struct MilestoneBody {
    milestone: u64,
}

const DISCUSSIONS_QUERY: &str = r#"
query($owner: String!, $name: String!, $first: Int!) {
  repository(owner: $owner, name: $name) {
    discussions(first: $first) {
      nodes {
        title
        body
        category { name }
        comments(first: $first) { nodes { body } }
      }
    }
  }
}
"#;

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<DiscussionsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DiscussionsData {
    repository: Option<DiscussionsRepository>,
}

#[derive(Debug, Deserialize)]
struct DiscussionsRepository {
    discussions: Option<Nodes<ApiDiscussion>>,
}

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<T>>,
}

#[derive(Debug, Deserialize)]
struct ApiDiscussion {
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    category: Option<ApiCategory>,
    #[serde(default)]
    comments: Option<Nodes<ApiComment>>,
}

#[derive(Debug, Deserialize)]
struct ApiCategory {
    name: String,
}

impl ForgePort for HttpForgeClient {
    fn repository_info(&self) -> Result<RepositoryInfo, ForgeError> {
        let repo: ApiRepository = self.get_json(self.repo_url(&[]), &self.repo.to_string())?;
        Ok(RepositoryInfo { name: repo.name, description: repo.description })
    }

    fn topics(&self) -> Result<Vec<String>, ForgeError> {
        let topics: ApiTopics = self.get_json(self.repo_url(&["topics"]), "topics")?;
        Ok(topics.names)
    }

    fn list_directory(
        &self,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Vec<ContentEntry>, ForgeError> {
        let listing: ApiContentListing = self.get_json(self.contents_url(path, git_ref), path)?;
        Ok(match listing {
            ApiContentListing::Directory(entries) => {
                entries.into_iter().map(ApiContent::into_entry).collect()
            }
            ApiContentListing::Single(entry) => vec![entry.into_entry()],
        })
    }

    fn get_file(&self, path: &str, git_ref: Option<&str>) -> Result<RemoteFile, ForgeError> {
        let listing: ApiContentListing = self.get_json(self.contents_url(path, git_ref), path)?;
        let file = match listing {
            ApiContentListing::Single(file) if file.kind == "file" => file,
            _ => return Err(ForgeError::Decode(format!("'{}' is not a file", path))),
        };

        let content = match (file.encoding.as_deref(), file.content.as_deref()) {
            (Some("base64"), Some(raw)) => decode_content(raw)?,
            (None, Some(raw)) => raw.as_bytes().to_vec(),
            (_, None) if file.size == 0 => Vec::new(),
            _ => {
                return Err(ForgeError::Decode(format!(
                    "'{}' has no inline content ({} bytes)",
                    path, file.size
                )));
            }
        };

        Ok(RemoteFile { path: file.path, sha: file.sha, size: file.size, content })
    }

    fn list_open_issues(&self) -> Result<Vec<IssueSummary>, ForgeError> {
        let mut url = self.repo_url(&["issues"]);
        url.query_pairs_mut().append_pair("state", "open");
        let issues: Vec<ApiIssue> = self.get_paginated(url, None, "issues")?;
        Ok(issues
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(|issue| IssueSummary {
                number: issue.number,
                title: issue.title,
                body: issue.body,
                labels: issue.labels.into_iter().map(|l| l.name).collect(),
            })
            .collect())
    }

    fn list_issue_comments(&self, number: u64) -> Result<Vec<String>, ForgeError> {
        let number = number.to_string();
        let url = self.repo_url(&["issues", &number, "comments"]);
        let comments: Vec<ApiComment> =
            self.get_paginated(url, None, &format!("issue #{} comments", number))?;
        Ok(comments.into_iter().map(|c| c.body.unwrap_or_default()).collect())
    }

    fn list_recent_pull_requests(
        &self,
        limit: usize,
    ) -> Result<Vec<PullRequestSummary>, ForgeError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut url = self.repo_url(&["pulls"]);
        url.query_pairs_mut()
            .append_pair("state", "all")
            .append_pair("sort", "updated")
            .append_pair("direction", "desc");
        let pulls: Vec<ApiPull> = self.get_paginated(url, Some(limit), "pulls")?;
        Ok(pulls
            .into_iter()
            .map(|pr| PullRequestSummary {
                number: pr.number,
                title: pr.title,
                body: pr.body,
                state: pr.state,
                labels: pr.labels.into_iter().map(|l| l.name).collect(),
            })
            .collect())
    }

    fn list_recent_commits(
        &self,
        path: &str,
        limit: usize,
    ) -> Result<Vec<CommitRecord>, ForgeError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut url = self.repo_url(&["commits"]);
        url.query_pairs_mut().append_pair("path", path);
        let commits: Vec<ApiCommitListItem> =
            self.get_paginated(url, Some(limit), &format!("commits for {}", path))?;

        commits
            .into_iter()
            .map(|item| -> Result<CommitRecord, ForgeError> {
                let ApiCommitInner { message, author, committer } = item.commit;
                let date = author.or(committer).map(|sig| sig.date).ok_or_else(|| {
                    ForgeError::Decode(format!("commit {} has no date", item.sha))
                })?;
                let files = self.commit_files(&item.sha)?;
                Ok(CommitRecord { sha: item.sha, message, date, files })
            })
            .collect()
    }

    fn list_discussions(&self, limit: usize) -> Result<Vec<Discussion>, ForgeError> {
        if self.token.is_none() {
            return Err(ForgeError::Unsupported(
                "listing discussions requires an access token".into(),
            ));
        }

        let request = GraphQlRequest {
            query: DISCUSSIONS_QUERY,
            variables: serde_json::json!({
                "owner": self.repo.owner(),
                "name": self.repo.name(),
                "first": limit,
            }),
        };
        let response: GraphQlResponse =
            self.send_json(Method::POST, self.graphql_url.clone(), &request, "graphql")?;

        let nodes = response
            .data
            .and_then(|data| data.repository)
            .and_then(|repo| repo.discussions)
            .map(|d| d.nodes);
        let Some(nodes) = nodes else {
            let message = response
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            if message.is_empty() {
                return Ok(Vec::new());
            }
            return Err(ForgeError::Api { status: 200, message });
        };

        Ok(nodes
            .into_iter()
            .flatten()
            .map(|d| Discussion {
                title: d.title,
                body: d.body,
                category: d.category.map(|c| c.name),
                comments: d
                    .comments
                    .map(|c| c.nodes.into_iter().flatten().filter_map(|n| n.body).collect())
                    .unwrap_or_default(),
            })
            .collect())
    }

    fn branch_head(&self, branch: &str) -> Result<String, ForgeError> {
        let url = self.nested_url(&["branches"], branch);
        let branch: ApiBranch = self.get_json(url, &format!("branch {}", branch))?;
        Ok(branch.commit.sha)
    }

    fn create_branch(&self, branch: &str, sha: &str) -> Result<(), ForgeError> {
        let body = CreateRefBody { reference: format!("refs/heads/{}", branch), sha };
        let url = self.repo_url(&["git", "refs"]);
        self.send_no_content(Method::POST, url, Some(&body), &format!("ref {}", branch))
    }

    fn delete_branch(&self, branch: &str) -> Result<(), ForgeError> {
        let url = self.nested_url(&["git", "refs", "heads"], branch);
        self.send_no_content::<()>(Method::DELETE, url, None, &format!("ref {}", branch))
    }

    fn create_file(
        &self,
        path: &str,
        message: &str,
        content: &str,
        branch: &str,
    ) -> Result<String, ForgeError> {
        let body = PutFileBody { message, content: STANDARD.encode(content), branch, sha: None };
        self.put_file(path, &body)
    }

    fn update_file(
        &self,
        path: &str,
        message: &str,
        content: &str,
        sha: &str,
        branch: &str,
    ) -> Result<String, ForgeError> {
        let body =
            PutFileBody { message, content: STANDARD.encode(content), branch, sha: Some(sha) };
        self.put_file(path, &body)
    }

    fn create_issue(&self, issue: &NewIssue) -> Result<IssueInfo, ForgeError> {
        let body = CreateIssueBody {
            title: &issue.title,
            body: &issue.body,
            labels: &issue.labels,
            assignees: &issue.assignees,
            milestone: issue.milestone,
        };
        let created: ApiCreated =
            self.send_json(Method::POST, self.repo_url(&["issues"]), &body, "issues")?;
        Ok(IssueInfo { number: created.number, url: created.html_url })
    }

    fn create_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequestInfo, ForgeError> {
        let payload = CreatePullBody { title, body, head, base };
        let created: ApiPullCreated =
            self.send_json(Method::POST, self.repo_url(&["pulls"]), &payload, "pulls")?;
        Ok(PullRequestInfo {
            number: created.number,
            url: created.html_url,
            head: created.head.name,
            base: created.base.name,
        })
    }

    fn get_milestone(&self, number: u64) -> Result<Milestone, ForgeError> {
        let number = number.to_string();
        let milestone: ApiMilestone = self.get_json(
            self.repo_url(&["milestones", &number]),
            &format!("milestone {}", number),
        )?;
        Ok(Milestone { number: milestone.number, title: milestone.title })
    }

    fn add_assignees(&self, issue_number: u64, assignees: &[String]) -> Result<(), ForgeError> {
        let number = issue_number.to_string();
        let url = self.repo_url(&["issues", &number, "assignees"]);
        let body = AssigneesBody { assignees };
        self.send_no_content(Method::POST, url, Some(&body), &format!("issue #{}", number))
    }

    fn set_milestone(&self, issue_number: u64, milestone: u64) -> Result<(), ForgeError> {
        let number = issue_number.to_string();
        let url = self.repo_url(&["issues", &number]);
        let body = MilestoneBody { milestone };
        self.send_no_content(Method::PATCH, url, Some(&body), &format!("issue #{}", number))
    }
}
