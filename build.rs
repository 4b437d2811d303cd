//! Build script for persona-agent
//!
//! Embeds the git revision, build timestamp, target and profile so that
//! `persona-agent version` can report exactly what is running.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let git_hash = run("git", &["rev-parse", "--short=8", "HEAD"]);
    let git_dirty = run("git", &["status", "--porcelain"])
        .map(|out| (!out.is_empty()).to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let rustc = run("rustc", &["--version"]);

    let vars = [
        ("GIT_HASH", git_hash.unwrap_or_else(|| "unknown".to_string())),
        ("GIT_DIRTY", git_dirty),
        (
            "BUILD_TIMESTAMP",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
        ("TARGET", env_or_unknown("TARGET")),
        ("PROFILE", env_or_unknown("PROFILE")),
        ("RUSTC_VERSION", rustc.unwrap_or_else(|| "unknown".to_string())),
    ];

    for (key, value) in vars {
        println!("cargo:rustc-env=PERSONA_AGENT_{}={}", key, value);
    }
}

/// Run a command and return its trimmed stdout, if it succeeded
fn run(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn env_or_unknown(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| "unknown".to_string())
}
