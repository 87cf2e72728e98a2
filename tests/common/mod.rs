/// Common test utilities and helpers for reposweep tests

use assert_fs::prelude::*;
use assert_fs::TempDir;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::{Command, Output};

/// Temporary config + whitelist for driving the binary against a mock API
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
    pub whitelist_path: PathBuf,
}

impl TestEnvironment {
    pub fn new(api_url: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let whitelist = temp_dir.child("repo-whitelist.yml");
        let config = temp_dir.child("config.yml");

        config
            .write_str(&format!(
                "whitelist_path: \"{}\"\ngithub:\n  api_url: \"{}\"\n",
                whitelist.path().display(),
                api_url
            ))
            .expect("Failed to write test config");

        Self {
            config_path: config.path().to_path_buf(),
            whitelist_path: whitelist.path().to_path_buf(),
            temp_dir,
        }
    }

    pub fn write_whitelist(&self, content: &str) {
        std::fs::write(&self.whitelist_path, content).expect("Failed to write whitelist");
    }

    /// Binary invocation with the test config, a token and no DRY_RUN leaking in
    pub fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_reposweep"));
        cmd.arg("--config")
            .arg(&self.config_path)
            .args(args)
            .env("GITHUB_TOKEN", "ghp_integrationtoken")
            .env_remove("DRY_RUN")
            .env_remove("RUST_LOG");
        cmd
    }
}

/// Run a command off the async runtime so the mock server keeps serving
pub async fn run(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output())
        .await
        .expect("Command task panicked")
        .expect("Failed to execute command")
}

/// GitHub-shaped repository JSON
pub fn repo_json(owner: &str, name: &str, private: bool) -> Value {
    json!({
        "id": 1,
        "name": name,
        "full_name": format!("{}/{}", owner, name),
        "owner": { "login": owner, "id": 1 },
        "private": private,
        "fork": false
    })
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Assertion helpers for test validation
pub fn assert_contains_all(text: &str, expected: &[&str]) {
    for item in expected {
        assert!(
            text.contains(item),
            "Expected text to contain '{}', but it didn't. Text: {}",
            item,
            text
        );
    }
}
