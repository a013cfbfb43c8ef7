use std::fmt;
use std::str::FromStr;

use super::AppError;

/// Named view that the context gatherer can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextView {
    /// Repository name, description, topics, structure, and readme.
    Basic,
    /// Open issues with labels and comments.
    Issues,
    /// Recent discussion threads.
    Discussions,
    /// Contribution guide, code of conduct, issue templates, recent pull requests.
    Contribution,
    /// Bootstrap component context.
    Bootstrap,
    /// Agent component context.
    Agent,
    /// Full file tree with contents.
    Tree,
    /// Flat map of source files.
    Source,
}

impl ContextView {
    /// Every view that can be requested by name.
    pub const ALL: [ContextView; 8] = [
        ContextView::Basic,
        ContextView::Issues,
        ContextView::Discussions,
        ContextView::Contribution,
        ContextView::Bootstrap,
        ContextView::Agent,
        ContextView::Tree,
        ContextView::Source,
    ];

    /// Views gathered by `all`, in output order. `tree` and `source` download
    /// file contents and are only answered when requested by name.
    pub const AGGREGATED: [ContextView; 6] = [
        ContextView::Basic,
        ContextView::Issues,
        ContextView::Discussions,
        ContextView::Contribution,
        ContextView::Bootstrap,
        ContextView::Agent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextView::Basic => "basic",
            ContextView::Issues => "issues",
            ContextView::Discussions => "discussions",
            ContextView::Contribution => "contribution",
            ContextView::Bootstrap => "bootstrap",
            ContextView::Agent => "agent",
            ContextView::Tree => "tree",
            ContextView::Source => "source",
        }
    }

    pub fn from_name(name: &str) -> Option<ContextView> {
        ContextView::ALL.into_iter().find(|view| view.as_str() == name)
    }
}

impl fmt::Display for ContextView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either every view or a single one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSelection {
    All,
    View(ContextView),
}

impl FromStr for ContextSelection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(ContextSelection::All);
        }
        ContextView::from_name(s).map(ContextSelection::View).ok_or_else(|| {
            let names: Vec<&str> = ContextView::ALL.iter().map(ContextView::as_str).collect();
            AppError::invalid_argument(format!(
                "Invalid context type '{}'. Must be one of: {} or 'all'",
                s,
                names.join(", ")
            ))
        })
    }
}

/// Repository component with its own readme and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Bootstrap,
    Agent,
}

impl Component {
    pub const ALL: [Component; 2] = [Component::Bootstrap, Component::Agent];

    /// Directory of the component, relative to the repository root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Component::Bootstrap => "bootstrap",
            Component::Agent => "agent",
        }
    }
}

impl FromStr for Component {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Component::ALL
            .into_iter()
            .find(|component| component.dir_name() == s)
            .ok_or_else(|| AppError::invalid_argument("Component must be 'bootstrap' or 'agent'"))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}
