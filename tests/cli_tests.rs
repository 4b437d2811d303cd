//! CLI integration tests
//!
//! Tests the command-line interface using assert_cmd

mod common;

use std::fs;

use common::Sandbox;
use predicates::prelude::*;

// ─────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    Sandbox::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Persona Agent - multi-persona conversational assistant",
        ))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("repl"))
        .stdout(predicate::str::contains("spec"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_command() {
    Sandbox::new()
        .cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("persona-agent"))
        .stdout(predicate::str::contains("Build Information"))
        .stdout(predicate::str::contains("Git Hash"))
        .stdout(predicate::str::contains("Target"));
}

#[test]
fn test_short_version_flag() {
    Sandbox::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("persona-agent"));
}

// ─────────────────────────────────────────────────────────────────
// Chat Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_chat_prints_reply_and_starts_thread() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd_replying("Clouds. Cool. I hate rain.")
        .args(["chat", "What's", "the", "weather?"])
        .assert()
        .success()
        .stdout(predicate::str::diff("Clouds. Cool. I hate rain.\n"))
        .stderr(predicate::str::contains("Started new thread"));

    let threads: Vec<_> = fs::read_dir(sandbox.threads_dir()).unwrap().collect();
    assert_eq!(threads.len(), 1);
}

#[test]
fn test_chat_continues_named_thread() {
    let sandbox = Sandbox::new();
    for text in ["first", "second"] {
        sandbox
            .cmd_replying("Ugh.")
            .args(["chat", "--thread", "demo", text])
            .assert()
            .success()
            .stderr(predicate::str::contains("Started new thread").not());
    }

    let stored = fs::read_to_string(sandbox.threads_dir().join("demo.json")).unwrap();
    let record: serde_json::Value = serde_json::from_str(&stored).unwrap();
    let messages = record["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "first");
    assert_eq!(messages[3]["role"], "assistant");
}

#[test]
fn test_chat_rejects_bad_thread_id() {
    Sandbox::new()
        .cmd_replying("x")
        .args(["chat", "--thread", "../escape", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Thread id"));
}

#[test]
fn test_quiet_chat_prints_only_reply() {
    Sandbox::new()
        .cmd_replying("Hm.")
        .args(["--quiet", "chat", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::diff("Hm.\n"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_pm_trigger_writes_specification() {
    let sandbox = Sandbox::new();
    let reply = "pm: I'm ready to write a specification";

    sandbox
        .cmd_replying(reply)
        .args(["chat", "I want a todo app"])
        .assert()
        .success()
        .stdout(predicate::str::contains(reply));

    assert_eq!(fs::read_to_string(sandbox.spec_path()).unwrap(), reply);

    sandbox
        .cmd()
        .args(["spec", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(reply));

    sandbox
        .cmd()
        .args(["spec", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Specification cleared"));
    assert!(!sandbox.spec_path().exists());
}

#[test]
fn test_spec_show_without_document() {
    Sandbox::new()
        .cmd()
        .args(["spec", "show"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No specification"));
}

#[test]
fn test_repl_answers_each_line() {
    Sandbox::new()
        .cmd_replying("Squirrel!")
        .args(["--quiet", "repl", "--thread", "session"])
        .write_stdin("hello\n\nare you there?\nexit\nignored\n")
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "Squirrel!\n-------------------\nSquirrel!\n-------------------\n",
        ));
}

#[test]
fn test_ephemeral_repl_writes_no_thread_files() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd_replying("Wait, what?")
        .args(["--quiet", "repl", "--ephemeral", "--thread", "scratch"])
        .write_stdin("hi\nagain\n")
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "Wait, what?\n-------------------\nWait, what?\n-------------------\n",
        ));

    assert!(!sandbox.threads_dir().exists());
}

// ─────────────────────────────────────────────────────────────────
// Persona Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_persona_list() {
    Sandbox::new()
        .cmd()
        .args(["persona", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pm"))
        .stdout(predicate::str::contains("swe"))
        .stdout(predicate::str::contains("travel"))
        .stdout(predicate::str::contains("joker"))
        .stdout(predicate::str::contains("adhd"))
        .stdout(predicate::str::contains("(default)").count(1));
}

#[test]
fn test_persona_classify() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd_replying("travel")
        .args(["persona", "classify", "Plan", "a", "trip"])
        .assert()
        .success()
        .stdout(predicate::str::diff("travel (exact)\n"));

    sandbox
        .cmd_replying("no clue")
        .args(["persona", "classify", "???"])
        .assert()
        .success()
        .stdout(predicate::str::diff("adhd (fallback)\n"));
}

// ─────────────────────────────────────────────────────────────────
// Config and Error Handling Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_validate_default() {
    Sandbox::new()
        .cmd()
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_validate_nonexistent_file() {
    Sandbox::new()
        .cmd()
        .args(["config", "validate", "--config", "/nonexistent/path/config.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found").or(predicate::str::contains("Error")));
}

#[test]
fn test_chat_with_invalid_config() {
    Sandbox::new()
        .cmd()
        .args(["chat", "--config", "/nonexistent/config.toml", "hi"])
        .assert()
        .failure();
}

#[test]
fn test_verbose_flag() {
    Sandbox::new().cmd().args(["-vv", "version"]).assert().success();
}

#[test]
fn test_unknown_command() {
    Sandbox::new()
        .cmd()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_subcommand() {
    Sandbox::new().cmd().assert().failure();
}
