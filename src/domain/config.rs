//! Tool configuration loaded from an optional TOML file.

use std::path::Path;

use serde::Deserialize;
use url::Url;

use super::{AppError, RepositoryHandle};
use super::repository::DEFAULT_REPOSITORY;

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    #[serde(default)]
    pub forge: ForgeConfig,
    #[serde(default)]
    pub context: ContextConfig,
}

/// Connection settings for the forge API.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForgeConfig {
    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: Url,
    /// GraphQL endpoint. Derived from `api_url` when absent.
    #[serde(default)]
    pub graphql_url: Option<Url>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Repository in `owner/name` form.
    #[serde(default = "default_repository")]
    pub repository: String,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            graphql_url: None,
            timeout_secs: default_timeout(),
            repository: default_repository(),
        }
    }
}

impl ForgeConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.timeout_secs == 0 {
            return Err(AppError::config_error("timeout_secs must be greater than 0"));
        }
        if self.api_url.cannot_be_a_base() {
            return Err(AppError::config_error(format!(
                "api_url '{}' cannot be used as a base URL",
                self.api_url
            )));
        }
        self.repository_handle()?;
        Ok(())
    }

    pub fn repository_handle(&self) -> Result<RepositoryHandle, AppError> {
        self.repository.parse()
    }

    /// GraphQL endpoint, falling back to `<api_url>/graphql`.
    pub fn graphql_endpoint(&self) -> Result<Url, AppError> {
        if let Some(url) = &self.graphql_url {
            return Ok(url.clone());
        }
        join_segment(&self.api_url, "graphql")
    }
}

/// Limits and filters for the context views.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Pull requests listed in the contribution view.
    #[serde(default = "default_recent_limit")]
    pub recent_pull_requests: usize,
    /// Commits listed per component.
    #[serde(default = "default_recent_limit")]
    pub recent_commits: usize,
    /// Discussions fetched, each with up to the same number of comments.
    #[serde(default = "default_discussions")]
    pub discussions: usize,
    /// File extensions included in the source view.
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            recent_pull_requests: default_recent_limit(),
            recent_commits: default_recent_limit(),
            discussions: default_discussions(),
            source_extensions: default_source_extensions(),
        }
    }
}

impl ToolConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, AppError> {
        let config: ToolConfig = toml::from_str(content)?;
        config.forge.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Append a path segment without discarding any existing base path.
pub(crate) fn join_segment(base: &Url, segment: &str) -> Result<Url, AppError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::config_error(format!("'{}' cannot be used as a base URL", base)))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

fn default_api_url() -> Url {
    Url::parse("https://api.github.com").expect("default API URL is valid")
}

fn default_timeout() -> u64 {
    30
}

fn default_repository() -> String {
    DEFAULT_REPOSITORY.to_string()
}

fn default_recent_limit() -> usize {
    5
}

fn default_discussions() -> usize {
    10
}

fn default_source_extensions() -> Vec<String> {
    ["py", "rs", "js", "ts", "sh", "toml", "yml", "yaml", "json", "md"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}
