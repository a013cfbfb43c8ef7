use tracing::{debug, info, warn};

use super::failure;
use crate::domain::submission::{apply_template, dedupe_names};
use crate::domain::{IssueRequest, SubmissionOutcome};
use crate::ports::{ForgePort, NewIssue};

const TEMPLATE_DIR: &str = ".github/ISSUE_TEMPLATE";

/// Create an issue, optionally filling a Markdown issue template.
///
/// A requested milestone must resolve before the issue is created.
pub fn create_issue<F: ForgePort + ?Sized>(forge: &F, request: &IssueRequest) -> SubmissionOutcome {
    if let Some(number) = request.milestone {
        match forge.get_milestone(number) {
            Ok(milestone) => debug!(number, title = %milestone.title, "milestone resolved"),
            Err(err) => {
                return failure(&format!("Milestone {} could not be resolved", number), err);
            }
        }
    }

    let body = match &request.template {
        Some(name) => templated_body(forge, name, &request.body),
        None => request.body.clone(),
    };

    let issue = NewIssue {
        title: request.title.clone(),
        body,
        labels: dedupe_names(request.labels.iter().cloned()),
        assignees: dedupe_names(request.assignees.iter().cloned()),
        milestone: request.milestone,
    };

    match forge.create_issue(&issue) {
        Ok(created) => {
            info!(number = created.number, url = %created.url, "issue created");
            SubmissionOutcome::success(created.number, created.url)
        }
        Err(err) => failure("Failed to create issue", err),
    }
}

fn templated_body<F: ForgePort + ?Sized>(forge: &F, name: &str, body: &str) -> String {
    let path = format!("{}/{}.md", TEMPLATE_DIR, name);
    match forge.get_file(&path, None) {
        Ok(file) => match file.text() {
            Some(template) => apply_template(&template, body),
            None => {
                warn!(%path, "issue template is not UTF-8; using body as-is");
                body.to_string()
            }
        },
        Err(err) if err.is_not_found() => {
            debug!(%path, "issue template not found; using body as-is");
            body.to_string()
        }
        Err(err) => {
            warn!(%path, error = %err, "could not fetch issue template; using body as-is");
            body.to_string()
        }
    }
}
