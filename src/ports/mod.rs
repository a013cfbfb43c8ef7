mod forge;

pub use forge::{
    CommitRecord, ContentEntry, Discussion, EntryKind, ForgePort, IssueInfo, IssueSummary,
    Milestone, NewIssue, PullRequestInfo, PullRequestSummary, RemoteFile, RepositoryInfo,
};
