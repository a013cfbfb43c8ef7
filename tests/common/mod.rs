//! Shared testing utilities for the mender CLI tests.

use assert_cmd::Command;
use mockito::{Server, ServerGuard};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const OWNER: &str = "octo";
pub const REPO: &str = "widgets";

/// Isolated working directory plus a mock GitHub API server.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    pub server: ServerGuard,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        Self { root, server: Server::new() }
    }

    pub fn work_dir(&self) -> &Path {
        self.root.path()
    }

    /// `/repos/octo/widgets` followed by `suffix`.
    pub fn api_path(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{}", OWNER, REPO, suffix)
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Command for `mender-context` pointed at the mock server.
    pub fn context_cli(&self) -> Command {
        self.cli("mender-context")
    }

    /// Command for `mender-submit` pointed at the mock server.
    pub fn submit_cli(&self) -> Command {
        self.cli("mender-submit")
    }

    fn cli(&self, bin: &str) -> Command {
        let mut cmd = Command::cargo_bin(bin).expect("Failed to locate binary");
        cmd.current_dir(self.work_dir())
            .env_remove("GITHUB_TOKEN")
            .env_remove("MENDER_CONFIG")
            .env_remove("RUST_LOG")
            .env("MENDER_REPOSITORY", format!("{}/{}", OWNER, REPO))
            .env("GITHUB_API_URL", self.server.url());
        cmd
    }
}
