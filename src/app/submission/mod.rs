//! Issue and pull request submission.
//!
//! Both entry points return a [`SubmissionOutcome`] instead of an error so the
//! CLI can always print a status record.

mod issue;
mod pull_request;

pub use issue::create_issue;
pub use pull_request::create_pull_request;

use crate::domain::SubmissionOutcome;

pub(crate) fn failure(context: &str, err: impl std::fmt::Display) -> SubmissionOutcome {
    SubmissionOutcome::error(format!("{}: {}", context, err))
}
