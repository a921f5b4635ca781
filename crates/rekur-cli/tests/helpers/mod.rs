use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test harness for running CLI commands with temporary databases
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
    owner_id: String,
}

impl CliTestHarness {
    /// Create a new test harness with a temporary database
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self {
            temp_dir,
            db_path,
            owner_id: "00000000-0000-7000-8000-000000000001".to_string(),
        }
    }

    /// A harness sharing this database but acting as another account
    pub fn as_owner(&self, owner_id: &str) -> Command {
        let mut cmd = self.command();
        cmd.env("REKUR_OWNER_ID", owner_id);
        cmd
    }

    /// A `rekur` invocation bound to this harness's database and owner
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("rekur").expect("Failed to find rekur binary");

        // Run inside the temp dir so no stray rekur.toml is picked up
        cmd.current_dir(self.temp_dir.path());
        cmd.env("REKUR_DATABASE_PATH", &self.db_path);
        cmd.env("REKUR_OWNER_ID", &self.owner_id);
        cmd.env("REKUR_SCHEDULER__TIMEZONE", "UTC");
        cmd.env_remove("RUST_LOG");

        cmd
    }

    /// Runs `args` and expects exit code 0
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Runs `args` and expects a non-zero exit
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Runs `add` and returns the short id it printed.
    pub fn add(&self, args: &[&str]) -> String {
        let mut full = vec!["add"];
        full.extend_from_slice(args);
        let output = self.run_success(&full).get_output().stdout.clone();
        let stdout = String::from_utf8_lossy(&output);

        stdout
            .lines()
            .find_map(|line| line.split_once("ID: ").map(|(_, id)| id.trim().to_string()))
            .expect("add did not print an ID")
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    /// Predicate to check if output contains task table headers
    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Title"))
            .and(predicate::str::contains("Status"))
    }

    /// Predicate to check if output indicates successful task creation
    pub fn task_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("Created task").or(predicate::str::contains("Created recurring series"))
    }

    /// Predicate to check for error messages
    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
