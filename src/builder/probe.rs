//! Questions the environment composer asks about the host machine.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::git::{self, GitInfo};
use crate::core::triple::TargetTriple;
use crate::util::process::find_executable;

/// Host lookups used while composing a build environment.
///
/// The real implementation is [`SystemProbe`]; tests substitute a fake so
/// composition can be checked for any host platform.
pub trait HostProbe {
    /// Triple of the machine running mach.
    fn host_triple(&self) -> TargetTriple;

    /// Locate an executable on the search path.
    fn find_executable(&self, name: &str) -> Option<PathBuf>;

    /// Commit and worktree state of the checkout at `repo`.
    fn git_info(&self, repo: &Path) -> Result<GitInfo>;
}

/// Probe backed by the running system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl HostProbe for SystemProbe {
    fn host_triple(&self) -> TargetTriple {
        TargetTriple::host()
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        find_executable(name)
    }

    fn git_info(&self, repo: &Path) -> Result<GitInfo> {
        git::git_info(repo)
    }
}
