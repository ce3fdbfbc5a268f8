//! Test environment for isolated Pactline runs.
//!
//! Provides `TestEnv` - a temp directory holding the ledger file, used as
//! the working directory and as the config home, plus helpers to run the
//! pactline binary against it.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};

use serde_json::Value;

use super::fixtures::DEFAULT_OWNER;
use tempfile::TempDir;

/// Result of running a pactline CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse stdout as JSON
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout).unwrap_or_else(|e| {
            panic!(
                "stdout is not JSON ({}):\nstdout:\n{}\nstderr:\n{}",
                e, self.stdout, self.stderr
            )
        })
    }

    /// Parse stderr as the JSON error body
    pub fn error_json(&self) -> Value {
        serde_json::from_str(self.stderr.trim()).unwrap_or_else(|e| {
            panic!("stderr is not JSON ({}):\n{}", e, self.stderr)
        })
    }
}

/// Isolated test environment.
///
/// Every command runs with `--store <root>/ledger.toml`, from `root` as the
/// working directory, with the user config directory pointed into `root`.
pub struct TestEnv {
    pub root: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_pactline")),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.path("ledger.toml")
    }

    pub fn read_ledger(&self) -> String {
        std::fs::read_to_string(self.ledger_path()).unwrap_or_default()
    }

    pub fn write_file(&self, relative: &str, content: &str) {
        std::fs::write(self.path(relative), content).expect("Failed to write file");
    }

    /// Run pactline against this environment's ledger
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run with `--json` and return parsed stdout, panicking on failure
    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let result = self.run(&full);
        assert!(
            result.success,
            "pactline {:?} failed with {}:\n{}",
            args,
            result.exit_code,
            result.combined_output()
        );
        result.json()
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = self.command(args);
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute pactline");
        output_to_result(output)
    }

    /// Start pactline without waiting; finish with [`TestEnv::wait`]
    pub fn spawn(&self, args: &[&str]) -> Child {
        self.command(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn pactline")
    }

    pub fn wait(child: Child) -> TestResult {
        let output = child
            .wait_with_output()
            .expect("Failed to wait for pactline");
        output_to_result(output)
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.root.path())
            .arg("--store")
            .arg(self.ledger_path())
            .args(args)
            .env_remove("PACTLINE_STORE")
            .env_remove("PACTLINE_LOCK_TIMEOUT_MS")
            .env_remove("PACTLINE_LOG")
            .with_isolated_config(self.root.path());
        cmd
    }

    /// Create a contract and return its id
    pub fn create_contract(&self, title: &str, total: &str) -> u64 {
        let contract = self.run_json(&[
            "contract",
            "create",
            "--title",
            title,
            "--owner-name",
            DEFAULT_OWNER,
            "--total",
            total,
        ]);
        contract["id"].as_u64().expect("contract id")
    }

    /// Add a milestone and return its id
    pub fn add_milestone(&self, contract: u64, title: &str, amount: &str) -> u64 {
        let contract_arg = contract.to_string();
        let contract = self.run_json(&[
            "milestone",
            "add",
            &contract_arg,
            "--title",
            title,
            "--amount",
            amount,
        ]);
        contract["milestones"]
            .as_array()
            .and_then(|ms| ms.last())
            .and_then(|m| m["id"].as_u64())
            .expect("milestone id")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Keep the user's own config file out of test runs
trait IsolatedConfigExt {
    fn with_isolated_config(&mut self, home: &Path) -> &mut Self;
}

impl IsolatedConfigExt for Command {
    fn with_isolated_config(&mut self, home: &Path) -> &mut Self {
        self.env("HOME", home)
            .env("USERPROFILE", home)
            .env("XDG_CONFIG_HOME", home.join(".config"))
            .env("APPDATA", home.join("AppData"))
    }
}
