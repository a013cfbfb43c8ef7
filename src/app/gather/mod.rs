//! Context views over a repository and their aggregation.

pub mod formatter;
pub mod tree;

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::app::AppContext;
use crate::domain::file_tree::{source_files_value, structure_value, tree_value};
use crate::domain::{AppError, Component, ContextSelection, ContextView, ForgeError};
use crate::ports::ForgePort;

pub use formatter::format_context;
pub use tree::{SkippedPath, TreeWalk, WalkMode, walk, walk_sources};

const ISSUE_TEMPLATE_DIR: &str = ".github/ISSUE_TEMPLATE";

#[derive(Debug, Clone, Serialize)]
pub struct BasicContext {
    pub name: String,
    pub description: Option<String>,
    pub topics: Vec<String>,
    pub structure: Value,
    pub readme: Option<String>,
    /// Directories whose listing failed; `structure` is partial when non-empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub incomplete: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueContext {
    pub title: String,
    pub body: Option<String>,
    pub labels: Vec<String>,
    pub comments: Vec<String>,
    pub number: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscussionContext {
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContributionContext {
    pub contributing_guide: Option<String>,
    pub code_of_conduct: Option<String>,
    pub issue_templates: Mapping,
    pub recent_prs: Vec<PullRequestContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PullRequestContext {
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentContext {
    pub readme: Option<String>,
    pub structure: Value,
    pub recent_changes: Vec<ChangeContext>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub incomplete: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeContext {
    pub message: String,
    pub date: String,
    pub files: Vec<String>,
}

/// Repository name, description, topics, structure, and readme.
pub fn basic_context<F: ForgePort>(ctx: &AppContext<F>) -> Result<BasicContext, AppError> {
    let forge = ctx.forge();
    let info = forge.repository_info()?;
    let topics = forge.topics()?;
    let walk = tree::walk(forge, "", WalkMode::Structure);

    Ok(BasicContext {
        name: info.name,
        description: info.description,
        topics,
        structure: structure_value(&walk.nodes),
        readme: optional_document(forge, "README.md"),
        incomplete: walk.skipped_paths(),
    })
}

/// Open issues with labels and comments.
pub fn current_issues<F: ForgePort>(ctx: &AppContext<F>) -> Result<Vec<IssueContext>, AppError> {
    let forge = ctx.forge();
    forge
        .list_open_issues()?
        .into_iter()
        .map(|issue| {
            let comments = forge.list_issue_comments(issue.number)?;
            Ok(IssueContext {
                title: issue.title,
                body: issue.body,
                labels: issue.labels,
                comments,
                number: issue.number,
            })
        })
        .collect()
}

/// Recent discussions; empty when the client cannot query them.
pub fn discussions<F: ForgePort>(ctx: &AppContext<F>) -> Vec<DiscussionContext> {
    match ctx.forge().list_discussions(ctx.settings().discussions) {
        Ok(items) => items
            .into_iter()
            .map(|d| DiscussionContext {
                title: d.title,
                body: d.body,
                category: d.category,
                comments: d.comments,
            })
            .collect(),
        Err(ForgeError::Unsupported(reason)) => {
            debug!(%reason, "discussions unavailable");
            Vec::new()
        }
        Err(err) => {
            warn!(error = %err, "could not fetch discussions");
            Vec::new()
        }
    }
}

/// Contribution guide, code of conduct, YAML issue templates, and recent pull requests.
pub fn contribution_context<F: ForgePort>(
    ctx: &AppContext<F>,
) -> Result<ContributionContext, AppError> {
    let forge = ctx.forge();
    let recent_prs = forge
        .list_recent_pull_requests(ctx.settings().recent_pull_requests)?
        .into_iter()
        .map(|pr| PullRequestContext {
            title: pr.title,
            body: pr.body,
            state: pr.state,
            labels: pr.labels,
        })
        .collect();

    Ok(ContributionContext {
        contributing_guide: optional_document(forge, "CONTRIBUTING.md"),
        code_of_conduct: optional_document(forge, "CODE_OF_CONDUCT.md"),
        issue_templates: issue_templates(forge),
        recent_prs,
    })
}

/// Component context by name. Only `bootstrap` and `agent` are accepted.
pub fn get_component_context<F: ForgePort>(
    ctx: &AppContext<F>,
    component: &str,
) -> Result<ComponentContext, AppError> {
    let component: Component = component.parse()?;
    component_context(ctx, component)
}

/// Readme, structure, and recent commits of a component directory.
pub fn component_context<F: ForgePort>(
    ctx: &AppContext<F>,
    component: Component,
) -> Result<ComponentContext, AppError> {
    let forge = ctx.forge();
    let dir = component.dir_name();
    let walk = tree::walk(forge, dir, WalkMode::Structure);
    let recent_changes = forge
        .list_recent_commits(dir, ctx.settings().recent_commits)?
        .into_iter()
        .map(|commit| ChangeContext {
            message: commit.message,
            date: commit.date.to_rfc3339(),
            files: commit.files,
        })
        .collect();

    Ok(ComponentContext {
        readme: optional_document(forge, &format!("{}/README.md", dir)),
        structure: structure_value(&walk.nodes),
        recent_changes,
        incomplete: walk.skipped_paths(),
    })
}

/// Full recursive tree with file contents.
pub fn file_tree<F: ForgePort>(ctx: &AppContext<F>) -> Value {
    let walk = tree::walk(ctx.forge(), "", WalkMode::Source);
    with_incomplete(tree_value(&walk.nodes), &walk)
}

/// Flat map of source files keyed by path. Only files with a configured
/// extension are downloaded.
pub fn source_files<F: ForgePort>(ctx: &AppContext<F>) -> Value {
    let extensions = &ctx.settings().source_extensions;
    let walk = tree::walk_sources(ctx.forge(), "", extensions);
    let files = source_files_value(&walk.nodes, extensions);
    with_incomplete(files, &walk)
}

/// Answer a single view.
pub fn view_value<F: ForgePort>(ctx: &AppContext<F>, view: ContextView) -> Result<Value, AppError> {
    debug!(%view, "gathering view");
    let value = match view {
        ContextView::Basic => serde_yaml::to_value(basic_context(ctx)?)?,
        ContextView::Issues => serde_yaml::to_value(current_issues(ctx)?)?,
        ContextView::Discussions => serde_yaml::to_value(discussions(ctx))?,
        ContextView::Contribution => serde_yaml::to_value(contribution_context(ctx)?)?,
        ContextView::Bootstrap => {
            serde_yaml::to_value(component_context(ctx, Component::Bootstrap)?)?
        }
        ContextView::Agent => serde_yaml::to_value(component_context(ctx, Component::Agent)?)?,
        ContextView::Tree => file_tree(ctx),
        ContextView::Source => source_files(ctx),
    };
    Ok(value)
}

/// The aggregated views keyed by name. A failing view is replaced by
/// `{error: <message>}`.
pub fn gather_all<F: ForgePort>(ctx: &AppContext<F>) -> Mapping {
    let mut bundle = Mapping::new();
    for view in ContextView::AGGREGATED {
        let value = view_value(ctx, view).unwrap_or_else(|err| {
            warn!(%view, error = %err, "view failed; continuing with the rest");
            let mut failure = Mapping::new();
            failure.insert("error".into(), Value::from(err.to_string()));
            Value::Mapping(failure)
        });
        bundle.insert(Value::from(view.as_str()), value);
    }
    bundle
}

pub fn gather<F: ForgePort>(
    ctx: &AppContext<F>,
    selection: ContextSelection,
) -> Result<Value, AppError> {
    match selection {
        ContextSelection::All => Ok(Value::Mapping(gather_all(ctx))),
        ContextSelection::View(view) => view_value(ctx, view),
    }
}

/// Gather `context_type` and render it as one document.
///
/// The name is validated before any remote call is made.
pub fn format_for_llm<F: ForgePort>(
    ctx: &AppContext<F>,
    context_type: &str,
) -> Result<String, AppError> {
    let selection: ContextSelection = context_type.parse()?;
    let value = gather(ctx, selection)?;
    format_context(ctx.repository().name(), &value)
}

fn optional_document<F: ForgePort + ?Sized>(forge: &F, path: &str) -> Option<String> {
    match forge.get_file(path, None) {
        Ok(file) => file.text(),
        Err(err) if err.is_not_found() => None,
        Err(err) => {
            warn!(path, error = %err, "could not fetch document");
            None
        }
    }
}

fn issue_templates<F: ForgePort + ?Sized>(forge: &F) -> Mapping {
    let mut templates = Mapping::new();
    let entries = match forge.list_directory(ISSUE_TEMPLATE_DIR, None) {
        Ok(entries) => entries,
        Err(err) if err.is_not_found() => return templates,
        Err(err) => {
            warn!(error = %err, "could not list issue templates");
            return templates;
        }
    };

    for entry in entries {
        if !(entry.name.ends_with(".yml") || entry.name.ends_with(".yaml")) {
            continue;
        }
        let Some(text) = optional_document(forge, &entry.path) else {
            continue;
        };
        match serde_yaml::from_str::<Value>(&text) {
            Ok(parsed) => {
                templates.insert(Value::from(entry.name), parsed);
            }
            Err(err) => warn!(template = %entry.name, error = %err, "skipping unparsable template"),
        }
    }
    templates
}

fn with_incomplete(value: Value, walk: &TreeWalk) -> Value {
    if walk.is_complete() {
        return value;
    }
    let mut wrapped = Mapping::new();
    wrapped.insert("files".into(), value);
    wrapped.insert("incomplete".into(), Value::from(walk.skipped_paths()));
    Value::Mapping(wrapped)
}
