//! End-to-end tests driving the compiled binary.
//!
//! These cover argument handling and fast failure paths only; nothing
//! here talks to a model provider or opens a listening socket.

#![allow(clippy::panic)]

use assert_cmd::Command;
use predicates::prelude::*;

fn dossier() -> Command {
    let mut cmd =
        Command::cargo_bin("dossier-rs").unwrap_or_else(|e| panic!("binary not found: {e}"));
    cmd.env_remove("OPENAI_API_KEY")
        .env_remove("DOSSIER_API_KEY")
        .env_remove("DOSSIER_PROMPT_DIR")
        .env_remove("DOSSIER_LOG");
    cmd
}

fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"))
}

#[test]
fn help_lists_commands() {
    dossier()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("init-prompts"));
}

#[test]
fn ask_help_shows_examples() {
    dossier()
        .args(["ask", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Examples:"))
        .stdout(predicate::str::contains("--show-transcript"));
}

#[test]
fn init_prompts_writes_templates() {
    let dir = tempdir();

    dossier()
        .args(["init-prompts", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 prompt template(s)"));

    for name in ["analyze.md", "gather.md", "synthesize.md", "recovery.md"] {
        assert!(dir.path().join(name).exists(), "missing template {name}");
    }
}

#[test]
fn init_prompts_reports_existing_on_second_run() {
    let dir = tempdir();

    dossier()
        .args(["init-prompts", "--dir"])
        .arg(dir.path())
        .assert()
        .success();

    dossier()
        .args(["init-prompts", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exist"));
}

#[test]
fn init_prompts_json_format() {
    let dir = tempdir();

    dossier()
        .args(["--format", "json", "init-prompts", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 4"));
}

#[test]
fn ask_fails_without_api_key() {
    dossier()
        .args(["ask", "une question"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn ask_rejects_unknown_provider_prefix() {
    // Rejected while resolving the model selector, before any API call.
    dossier()
        .env("OPENAI_API_KEY", "sk-test")
        .args(["ask", "une question", "--model", "anthropic:claude-3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported provider: anthropic"));
}

#[test]
fn serve_rejects_port_zero() {
    dossier()
        .env("OPENAI_API_KEY", "sk-test")
        .args(["serve", "--port", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("port cannot be zero"));
}
