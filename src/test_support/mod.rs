//! Test utilities for mach unit tests.
//!
//! Provides a [`FakeProbe`] so environment composition can be exercised
//! for any host platform, and helpers that lay out a throwaway checkout.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tempfile::TempDir;

use crate::builder::git::GitInfo;
use crate::builder::probe::HostProbe;
use crate::core::triple::TargetTriple;
use crate::util::config::CONFIG_FILE_NAME;
use crate::util::context::MachContext;

/// Host probe with canned answers.
#[derive(Debug, Clone)]
pub struct FakeProbe {
    host: TargetTriple,
    executables: HashMap<String, PathBuf>,
    git: Option<GitInfo>,
}

impl FakeProbe {
    /// A probe for `host` with nothing on the search path.
    pub fn new(host: TargetTriple) -> Self {
        FakeProbe {
            host,
            executables: HashMap::new(),
            git: None,
        }
    }

    /// Pretend `name` is installed at `path`.
    pub fn with_executable(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.executables.insert(name.to_string(), path.into());
        self
    }

    /// Answer git queries with this commit state.
    pub fn with_git(mut self, short_sha: &str, dirty: bool) -> Self {
        self.git = Some(GitInfo {
            short_sha: short_sha.to_string(),
            dirty,
        });
        self
    }
}

impl HostProbe for FakeProbe {
    fn host_triple(&self) -> TargetTriple {
        self.host.clone()
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        self.executables.get(name).cloned()
    }

    fn git_info(&self, repo: &Path) -> Result<GitInfo> {
        match self.git {
            Some(ref info) => Ok(info.clone()),
            None => bail!("no git repository at {}", repo.display()),
        }
    }
}

/// A temporary checkout with the given `.servobuild` contents and a
/// context resolved against it without reading the process environment.
pub fn context_with_config(servobuild: &str) -> (TempDir, MachContext) {
    let tmp = TempDir::new().unwrap();
    if !servobuild.is_empty() {
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), servobuild).unwrap();
    }
    let ctx = MachContext::with_env(tmp.path().to_path_buf(), |_| None).unwrap();
    (tmp, ctx)
}

/// Write `files` (relative path, contents) under `root`, creating parents.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
}
