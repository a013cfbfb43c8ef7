use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use super::{ConnectionArgs, exit_on_error, init_logging};
use crate::adapters::HttpForgeClient;
use crate::app::AppContext;
use crate::app::gather::format_for_llm;
use crate::domain::{AppError, ContextSelection};

#[derive(Parser, Debug)]
#[command(name = "mender-context")]
#[command(version)]
#[command(
    about = "Gather repository context for LLM interactions",
    after_help = "Example: mender-context --context issues --output issues.txt"
)]
struct ContextCli {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Access token (optional; raises rate limits and enables discussions)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// View to gather: basic, issues, discussions, contribution, bootstrap,
    /// agent, tree, source, or all
    #[arg(long, default_value = "all")]
    context: String,
    /// Output file (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Entry point for `mender-context`.
pub fn run_context() {
    init_logging();
    let cli = ContextCli::parse();
    exit_on_error(execute(cli).map(|_| 0));
}

fn execute(cli: ContextCli) -> Result<(), AppError> {
    // Reject unknown view names before any client is built.
    cli.context.parse::<ContextSelection>()?;

    let resolved = cli.connection.resolve()?;
    let client =
        HttpForgeClient::new(resolved.repository.clone(), cli.token, &resolved.tool.forge)?;
    let ctx = AppContext::new(client, resolved.repository, resolved.tool.context);

    let document = format_for_llm(&ctx, &cli.context)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, &document)?;
            info!(path = %path.display(), "context written");
        }
        None => println!("{}", document),
    }
    Ok(())
}
