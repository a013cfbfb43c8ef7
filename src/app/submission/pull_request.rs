use thiserror::Error;
use tracing::{debug, info, warn};

use super::failure;
use crate::domain::submission::dedupe_names;
use crate::domain::{
    AppliedChange, ChangeAction, FileChange, ForgeError, PullRequestRequest, SubmissionOutcome,
};
use crate::ports::{ForgePort, PullRequestInfo};

/// A step that failed after the branch existed.
#[derive(Debug, Error)]
enum StepError {
    #[error("Failed to read '{path}' on branch '{branch}': {source}")]
    Lookup { path: String, branch: String, source: ForgeError },
    #[error("Failed to commit '{path}': {source}")]
    Commit { path: String, source: ForgeError },
    #[error("Failed to open pull request: {0}")]
    Open(ForgeError),
}

/// Create a branch off `base`, commit every change onto it, and open a pull request.
///
/// Steps run in order and stop at the first failure. Once the branch exists, an
/// error outcome lists the files already committed and, when requested, the
/// branch is deleted again.
pub fn create_pull_request<F: ForgePort + ?Sized>(
    forge: &F,
    request: &PullRequestRequest,
) -> SubmissionOutcome {
    let base_sha = match forge.branch_head(&request.base) {
        Ok(sha) => sha,
        Err(err) => {
            return failure(&format!("Failed to resolve base branch '{}'", request.base), err);
        }
    };

    if let Err(err) = forge.create_branch(&request.branch, &base_sha) {
        return failure(&format!("Failed to create branch '{}'", request.branch), err);
    }
    info!(branch = %request.branch, base = %request.base, "branch created");

    let mut applied = Vec::new();
    let opened = apply_changes(forge, request, &mut applied).and_then(|()| {
        forge
            .create_pull_request(&request.branch, &request.base, &request.title, &request.body)
            .map_err(StepError::Open)
    });

    match opened {
        Ok(pr) => {
            info!(
                number = pr.number,
                url = %pr.url,
                head = %pr.head,
                base = %pr.base,
                files = applied.len(),
                "pull request opened"
            );
            let warnings = attach_metadata(forge, &pr, request);
            SubmissionOutcome::Success { number: pr.number, url: pr.url, warnings }
        }
        Err(err) => {
            warn!(
                branch = %request.branch,
                error = %err,
                applied = applied.len(),
                "pull request aborted"
            );
            let rolled_back = request.rollback_on_failure && roll_back(forge, &request.branch);
            SubmissionOutcome::partial_error(err.to_string(), &request.branch, applied, rolled_back)
        }
    }
}

fn apply_changes<F: ForgePort + ?Sized>(
    forge: &F,
    request: &PullRequestRequest,
    applied: &mut Vec<AppliedChange>,
) -> Result<(), StepError> {
    for change in request.changes.iter() {
        let action = apply_change(forge, &request.branch, change)?;
        applied.push(AppliedChange { path: change.path.clone(), action });
    }
    Ok(())
}

fn apply_change<F: ForgePort + ?Sized>(
    forge: &F,
    branch: &str,
    change: &FileChange,
) -> Result<ChangeAction, StepError> {
    let path = &change.path;
    let commit_failed = |source| StepError::Commit { path: path.clone(), source };

    match forge.get_file(path, Some(branch)) {
        Ok(existing) => {
            let message = format!("Update {}", path);
            forge
                .update_file(path, &message, &change.content, &existing.sha, branch)
                .map_err(commit_failed)?;
            Ok(ChangeAction::Updated)
        }
        Err(err) if err.is_not_found() => {
            let message = format!("Add {}", path);
            forge.create_file(path, &message, &change.content, branch).map_err(commit_failed)?;
            Ok(ChangeAction::Created)
        }
        Err(source) => {
            Err(StepError::Lookup { path: path.clone(), branch: branch.to_string(), source })
        }
    }
}

/// Assignees and milestone. Failures here do not undo the pull request.
fn attach_metadata<F: ForgePort + ?Sized>(
    forge: &F,
    pr: &PullRequestInfo,
    request: &PullRequestRequest,
) -> Vec<String> {
    let mut warnings = Vec::new();

    let assignees = dedupe_names(request.assignees.iter().cloned());
    if !assignees.is_empty() {
        if let Err(err) = forge.add_assignees(pr.number, &assignees) {
            warnings.push(format!("Failed to add assignees: {}", err));
        }
    }

    if let Some(milestone) = request.milestone {
        let attached = forge.get_milestone(milestone).and_then(|found| {
            debug!(number = pr.number, milestone = %found.title, "setting milestone");
            forge.set_milestone(pr.number, milestone)
        });
        if let Err(err) = attached {
            warnings.push(format!("Failed to set milestone {}: {}", milestone, err));
        }
    }

    for warning in &warnings {
        warn!(number = pr.number, "{}", warning);
    }
    warnings
}

fn roll_back<F: ForgePort + ?Sized>(forge: &F, branch: &str) -> bool {
    match forge.delete_branch(branch) {
        Ok(()) => {
            info!(branch, "branch deleted after failure");
            true
        }
        Err(err) => {
            warn!(branch, error = %err, "could not delete branch");
            false
        }
    }
}
