//! CLI Adapter.

mod context;
mod submit;

pub use context::run_context;
pub use submit::run_submit;

use std::path::PathBuf;

use clap::Args;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::domain::{AppError, RepositoryHandle, ToolConfig};

/// Repository and endpoint flags shared by both binaries.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct ConnectionArgs {
    /// Target repository as owner/name
    #[arg(long, env = "MENDER_REPOSITORY")]
    repo: Option<String>,
    /// TOML configuration file
    #[arg(long, env = "MENDER_CONFIG")]
    config: Option<PathBuf>,
    /// REST API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<Url>,
}

/// Configuration after layering flags and environment over the file and defaults.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedConfig {
    pub tool: ToolConfig,
    pub repository: RepositoryHandle,
}

impl ConnectionArgs {
    pub(crate) fn resolve(&self) -> Result<ResolvedConfig, AppError> {
        let mut tool = ToolConfig::load_or_default(self.config.as_deref())?;
        if let Some(api_url) = &self.api_url {
            tool.forge.api_url = api_url.clone();
            tool.forge.validate()?;
        }
        let repository = match &self.repo {
            Some(raw) => raw.parse()?,
            None => tool.forge.repository_handle()?,
        };
        Ok(ResolvedConfig { tool, repository })
    }
}

/// Send diagnostics to stderr, filtered by `RUST_LOG` (default `warn`).
pub(crate) fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn exit_on_error(result: Result<i32, AppError>) {
    match result {
        Ok(exit_code) => {
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
