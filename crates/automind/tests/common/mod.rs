//! Common test utilities for AutoMind CLI tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Isolated HOME so the CLI never touches the real config
pub struct TestEnv {
    pub home: TempDir,
}

impl TestEnv {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self { home: tempdir()? })
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.path().join(".automind").join("config.json")
    }

    pub fn write_config(&self, json: &serde_json::Value) -> anyhow::Result<()> {
        let path = self.config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(json)?)?;
        Ok(())
    }

    /// The automind binary with HOME pointed at the temp dir and no key in the environment
    pub fn automind(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_automind"));
        cmd.env("HOME", self.home.path())
            .env_remove("AUTOMIND_API_KEY")
            .env_remove("OPENROUTER_API_KEY")
            .env_remove("GOOGLE_API_KEY")
            .env_remove("RUST_LOG");
        cmd
    }
}
