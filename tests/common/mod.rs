//! Common test utilities for curlsharp integration tests
//!
//! - CLI invocation helpers with an isolated config directory
//! - Response parsing helpers
//! - Temporary file helpers

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Exit status codes matching the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    Error = 1,
}

impl From<i32> for ExitStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => ExitStatus::Success,
            _ => ExitStatus::Error,
        }
    }
}

/// Result of running the curlsharp binary
#[derive(Debug)]
pub struct CliResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: ExitStatus,
    pub exit_code: i32,
    json_cache: Option<serde_json::Value>,
}

impl CliResponse {
    /// stdout parsed as JSON, when it is JSON
    pub fn json(&self) -> Option<&serde_json::Value> {
        self.json_cache.as_ref()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.stdout.contains(needle)
    }

    /// Count occurrences of a substring in stdout
    pub fn count(&self, needle: &str) -> usize {
        self.stdout.matches(needle).count()
    }

    /// `Warning:` lines printed on stderr, colors stripped
    pub fn warnings(&self) -> Vec<String> {
        strip_colors(&self.stderr)
            .lines()
            .filter_map(|line| line.strip_prefix("Warning: "))
            .map(str::to_string)
            .collect()
    }
}

impl std::ops::Deref for CliResponse {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.stdout
    }
}

/// Isolated environment for one binary invocation
pub struct TestEnvironment {
    /// Temporary config directory
    pub config_dir: TempDir,
    pub env_vars: HashMap<String, String>,
    pub stdin: Option<Vec<u8>>,
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnvironment {
    pub fn new() -> Self {
        let config_dir = TempDir::new().expect("Failed to create temp config dir");
        Self {
            config_dir,
            env_vars: HashMap::new(),
            stdin: None,
        }
    }

    pub fn set_env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env_vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_stdin(&mut self, content: &str) -> &mut Self {
        self.stdin = Some(content.as_bytes().to_vec());
        self
    }

    /// Write `config.toml` into the config directory
    pub fn write_config(&mut self, content: &str) -> &mut Self {
        std::fs::write(self.config_path().join("config.toml"), content)
            .expect("Failed to write config file");
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().to_path_buf()
    }
}

/// Path of the built binary
pub fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_curlsharp")
}

/// Run curlsharp with the given arguments (program name excluded)
pub fn curlsharp(args: &[&str]) -> CliResponse {
    curlsharp_with_env(args, &TestEnvironment::new())
}

/// Run curlsharp feeding `stdin` as the curl command
pub fn curlsharp_with_stdin(args: &[&str], stdin: &str) -> CliResponse {
    let mut env = TestEnvironment::new();
    env.set_stdin(stdin);
    curlsharp_with_env(args, &env)
}

pub fn curlsharp_with_env(args: &[&str], env: &TestEnvironment) -> CliResponse {
    let mut cmd = Command::new(binary());
    cmd.args(args);

    cmd.env("CURLSHARP_CONFIG_DIR", env.config_path());
    cmd.env_remove("CURLSHARP_LOG");
    for (key, value) in &env.env_vars {
        cmd.env(key, value);
    }

    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    if let Some(ref stdin_data) = env.stdin {
        cmd.stdin(Stdio::piped());
        let mut child = cmd.spawn().expect("Failed to spawn command");
        {
            let stdin = child.stdin.as_mut().expect("Failed to open stdin");
            stdin.write_all(stdin_data).expect("Failed to write to stdin");
        }
        let output = child.wait_with_output().expect("Failed to wait for command");
        parse_output(output)
    } else {
        cmd.stdin(Stdio::null());
        let output = cmd.output().expect("Failed to execute command");
        parse_output(output)
    }
}

fn parse_output(output: Output) -> CliResponse {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(1);
    let json_cache = serde_json::from_str(stdout.trim()).ok();

    CliResponse {
        stdout,
        stderr,
        exit_status: ExitStatus::from(exit_code),
        exit_code,
        json_cache,
    }
}

/// Strip ANSI color codes from a string
pub fn strip_colors(s: &str) -> String {
    let re = regex::Regex::new(r"\x1b\[[\d;]*m").unwrap();
    re.replace_all(s, "").to_string()
}

/// Create a temporary file with the given content
pub fn create_temp_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = dir.path().join(name);
    std::fs::write(&file_path, content).expect("Failed to write temp file");
    (dir, file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_colors() {
        let colored = "\x1b[33mWarning: x\x1b[0m";
        assert_eq!(strip_colors(colored), "Warning: x");
    }

    #[test]
    fn test_exit_status_from_i32() {
        assert_eq!(ExitStatus::from(0), ExitStatus::Success);
        assert_eq!(ExitStatus::from(1), ExitStatus::Error);
    }
}
