use anyhow::Result;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Test utilities for integration tests
pub struct TestEnvironment {
    pub store_dir: TempDir,
}

impl TestEnvironment {
    /// Create a new test environment with an empty storage directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            store_dir: TempDir::new()?,
        })
    }

    /// Path to the settings record inside the storage directory
    pub fn record_path(&self) -> PathBuf {
        self.store_dir.path().join("interview-coder-settings.json")
    }

    /// Run settings-picker against this environment's storage directory
    pub fn run(&self, args: &[&str]) -> Result<Output> {
        let output = Command::new(env!("CARGO_BIN_EXE_settings-picker"))
            .arg("--dir")
            .arg(self.store_dir.path())
            .args(args)
            .env_remove("INTERVIEW_CODER_HOME")
            .env("NO_COLOR", "1")
            .output()?;
        Ok(output)
    }

    /// Write a file into the storage directory and return its path
    pub fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let file = self.store_dir.child(name);
        file.write_str(content)?;
        Ok(file.path().to_path_buf())
    }

    /// Parsed contents of the settings record
    pub fn record(&self) -> Result<serde_json::Value> {
        let content = std::fs::read_to_string(self.record_path())?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Assert that a string contains the given text
pub fn assert_contains(text: &str, needle: &str) {
    assert!(
        predicate::str::contains(needle).eval(text),
        "Expected '{}' to contain '{}'",
        text,
        needle
    );
}

/// Assert that a command output is successful
pub fn assert_success(output: &Output) {
    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "Command failed with exit code {}\nStdout: {}\nStderr: {}",
            output.status.code().unwrap_or(-1),
            stdout,
            stderr
        );
    }
}

/// Convert process output to a string
pub fn output_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Convert process stderr to a string
pub fn stderr_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn exists(path: &Path) -> bool {
    predicate::path::exists().eval(path)
}
