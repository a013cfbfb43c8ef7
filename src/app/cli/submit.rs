use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::{ConnectionArgs, exit_on_error, init_logging};
use crate::adapters::HttpForgeClient;
use crate::app::submission::{create_issue, create_pull_request};
use crate::domain::submission::{DEFAULT_BASE_BRANCH, parse_name_list};
use crate::domain::{AppError, ChangeSet, IssueRequest, PullRequestRequest};

#[derive(Parser, Debug)]
#[command(name = "mender-submit")]
#[command(version)]
#[command(
    about = "Create issues and pull requests",
    after_help = "Example: mender-submit issue --title \"Bug fix\" --body \"Fixed issue\""
)]
struct SubmitCli {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,
    #[command(subcommand)]
    command: SubmitCommand,
}

#[derive(Subcommand, Debug)]
enum SubmitCommand {
    /// Create an issue
    Issue {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        /// Comma-separated label names
        #[arg(long)]
        labels: Option<String>,
        /// Issue template name under .github/ISSUE_TEMPLATE (without .md)
        #[arg(long)]
        template: Option<String>,
        /// Comma-separated user logins
        #[arg(long)]
        assignees: Option<String>,
        /// Milestone number
        #[arg(long)]
        milestone: Option<u64>,
    },
    /// Create a pull request
    Pr {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        /// New branch name
        #[arg(long)]
        branch: String,
        /// YAML file mapping file paths to contents
        #[arg(long)]
        files: PathBuf,
        /// Base branch
        #[arg(long, default_value = DEFAULT_BASE_BRANCH)]
        base: String,
        /// Comma-separated user logins
        #[arg(long)]
        assignees: Option<String>,
        /// Milestone number
        #[arg(long)]
        milestone: Option<u64>,
        /// Delete the branch again if a later step fails
        #[arg(long)]
        rollback_on_failure: bool,
    },
}

/// Entry point for `mender-submit`. Exits 1 when the outcome is an error.
pub fn run_submit() {
    init_logging();
    let cli = SubmitCli::parse();
    exit_on_error(execute(cli));
}

fn execute(cli: SubmitCli) -> Result<i32, AppError> {
    let resolved = cli.connection.resolve()?;
    let token = cli.token.trim().to_string();
    if token.is_empty() {
        return Err(AppError::invalid_argument("A non-empty --token is required"));
    }
    let client = HttpForgeClient::new(resolved.repository, Some(token), &resolved.tool.forge)?;

    let outcome = match cli.command {
        SubmitCommand::Issue { title, body, labels, template, assignees, milestone } => {
            let request = IssueRequest {
                title,
                body,
                labels: names(labels.as_deref()),
                template,
                assignees: names(assignees.as_deref()),
                milestone,
            };
            create_issue(&client, &request)
        }
        SubmitCommand::Pr {
            title,
            body,
            branch,
            files,
            base,
            assignees,
            milestone,
            rollback_on_failure,
        } => {
            let request = PullRequestRequest {
                title,
                body,
                branch,
                changes: ChangeSet::from_yaml_file(&files)?,
                base,
                assignees: names(assignees.as_deref()),
                milestone,
                rollback_on_failure,
            };
            create_pull_request(&client, &request)
        }
    };

    print!("{}", outcome.to_yaml()?);
    Ok(if outcome.is_success() { 0 } else { 1 })
}

fn names(raw: Option<&str>) -> Vec<String> {
    raw.map(parse_name_list).unwrap_or_default()
}
