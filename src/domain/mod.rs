pub mod config;
pub mod error;
pub mod file_tree;
pub mod repository;
pub mod submission;
pub mod view;

pub use config::{ContextConfig, ForgeConfig, ToolConfig};
pub use error::{AppError, ForgeError};
pub use file_tree::{FileMeta, FileNode, NodeKind};
pub use repository::RepositoryHandle;
pub use submission::{
    AppliedChange, ChangeAction, ChangeSet, FileChange, IssueRequest, PullRequestRequest,
    SubmissionOutcome,
};
pub use view::{Component, ContextSelection, ContextView};
