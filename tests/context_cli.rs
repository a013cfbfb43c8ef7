mod common;

use common::TestContext;
use mockito::{Matcher, Mock};
use predicates::prelude::*;
use std::fs;

/// Mocks for the `basic` view. Keep the returned mocks alive for the test's duration.
fn mock_basic_view(ctx: &mut TestContext) -> Vec<Mock> {
    let repo_path = ctx.api_path("");
    let topics_path = ctx.api_path("/topics");
    let root_path = ctx.api_path("/contents/");
    let readme_path = ctx.api_path("/contents/README.md");

    vec![
        ctx.server
            .mock("GET", repo_path.as_str())
            .with_status(200)
            .with_body(r#"{"name":"widgets","description":"Widget factory"}"#)
            .create(),
        ctx.server
            .mock("GET", topics_path.as_str())
            .with_status(200)
            .with_body(r#"{"names":["ai","tools"]}"#)
            .create(),
        ctx.server
            .mock("GET", root_path.as_str())
            .with_status(200)
            .with_body(
                r#"[{"type":"file","name":"README.md","path":"README.md","sha":"abc","size":9}]"#,
            )
            .create(),
        ctx.server
            .mock("GET", readme_path.as_str())
            .with_status(200)
            .with_body(
                r#"{"type":"file","name":"README.md","path":"README.md","sha":"abc","size":9,
                    "content":"IyBXaWRn\nZXRz\n","encoding":"base64"}"#,
            )
            .create(),
    ]
}

#[test]
fn unknown_view_fails_before_any_request() {
    let mut ctx = TestContext::new();
    let guard = ctx.server.mock("GET", Matcher::Any).expect(0).create();

    ctx.context_cli()
        .args(["--context", "invalid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid context type 'invalid'"));

    guard.assert();
}

#[test]
fn basic_view_is_written_to_output_file() {
    let mut ctx = TestContext::new();
    let _mocks = mock_basic_view(&mut ctx);

    ctx.context_cli().args(["--context", "basic", "--output", "basic.txt"]).assert().success();

    let text = fs::read_to_string(ctx.work_dir().join("basic.txt")).unwrap();
    assert!(text.starts_with("\n# widgets Context\n\n## Repository Information\n"));
    assert!(text.contains("name: widgets"));
    assert!(text.contains("description: Widget factory"));
    assert!(text.contains("README.md: file"));
    assert!(text.contains("# Widgets"));
}

#[test]
fn basic_view_prints_to_stdout_without_output_flag() {
    let mut ctx = TestContext::new();
    let _mocks = mock_basic_view(&mut ctx);

    ctx.context_cli()
        .args(["--context", "basic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Repository Information"))
        .stdout(predicate::str::contains("- ai\n- tools"));
}

#[test]
fn token_is_sent_as_bearer_auth() {
    let mut ctx = TestContext::new();
    let issues_path = ctx.api_path("/issues");
    let issues = ctx
        .server
        .mock("GET", issues_path.as_str())
        .match_query(Matcher::Exact("state=open&per_page=100".into()))
        .match_header("authorization", "Bearer secret-token")
        .with_status(200)
        .with_body("[]")
        .create();

    ctx.context_cli()
        .args(["--context", "issues", "--token", "secret-token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));

    issues.assert();
}

#[test]
fn failing_single_view_exits_with_error() {
    let mut ctx = TestContext::new();
    let repo_path = ctx.api_path("");
    let _repo = ctx
        .server
        .mock("GET", repo_path.as_str())
        .with_status(403)
        .with_body(r#"{"message":"API rate limit exceeded"}"#)
        .create();

    ctx.context_cli()
        .args(["--context", "basic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: "))
        .stderr(predicate::str::contains("API rate limit exceeded"));
}

#[test]
fn repository_comes_from_config_file() {
    let mut ctx = TestContext::new();
    let config = ctx.write_file("mender.toml", "[forge]\nrepository = \"acme/rockets\"\n");
    let _issues = ctx
        .server
        .mock("GET", "/repos/acme/rockets/issues")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create();

    ctx.context_cli()
        .env_remove("MENDER_REPOSITORY")
        .arg("--config")
        .arg(&config)
        .args(["--context", "issues"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# rockets Context"));
}

#[test]
fn invalid_config_file_is_rejected() {
    let ctx = TestContext::new();
    let config = ctx.write_file("mender.toml", "[forge]\ntimeout_secs = 0\n");

    ctx.context_cli()
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout_secs"));
}
