//! mender-tools: gather repository context for LLM prompts and submit issues
//! and pull requests to GitHub.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

use adapters::HttpForgeClient;
use app::AppContext;

pub use app::gather::{
    BasicContext, ComponentContext, ContributionContext, DiscussionContext, IssueContext,
};
pub use domain::{
    AppError, ContextSelection, ContextView, IssueRequest, PullRequestRequest, RepositoryHandle,
    SubmissionOutcome, ToolConfig,
};

// =============================================================================
// Context API
// =============================================================================

/// Build a context gatherer for `repository` using the given configuration.
pub fn context_for(
    repository: RepositoryHandle,
    token: Option<String>,
    config: &ToolConfig,
) -> Result<AppContext<HttpForgeClient>, AppError> {
    let client = HttpForgeClient::new(repository.clone(), token, &config.forge)?;
    Ok(AppContext::new(client, repository, config.context.clone()))
}

/// Gather `context_type` (a view name or `all`) and render it as one document.
///
/// Unknown view names fail before any request is made.
pub fn format_for_llm(
    repository: RepositoryHandle,
    token: Option<String>,
    context_type: &str,
) -> Result<String, AppError> {
    context_type.parse::<ContextSelection>()?;
    let ctx = context_for(repository, token, &ToolConfig::default())?;
    app::gather::format_for_llm(&ctx, context_type)
}

// =============================================================================
// Submission API
// =============================================================================

/// Create an issue on `repository`.
pub fn create_issue(
    repository: RepositoryHandle,
    token: &str,
    request: &IssueRequest,
) -> Result<SubmissionOutcome, AppError> {
    let client =
        HttpForgeClient::new(repository, Some(token.to_string()), &ToolConfig::default().forge)?;
    Ok(app::submission::create_issue(&client, request))
}

/// Create a branch, commit the requested changes, and open a pull request.
pub fn create_pull_request(
    repository: RepositoryHandle,
    token: &str,
    request: &PullRequestRequest,
) -> Result<SubmissionOutcome, AppError> {
    let client =
        HttpForgeClient::new(repository, Some(token.to_string()), &ToolConfig::default().forge)?;
    Ok(app::submission::create_pull_request(&client, request))
}
