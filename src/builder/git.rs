//! Commit identification for build stamps.

use std::path::Path;

use anyhow::{Context, Result};
use git2::{Repository, StatusOptions};

/// Short commit hash and worktree state of a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitInfo {
    /// Abbreviated HEAD commit
    pub short_sha: String,
    /// Tracked changes or untracked files present
    pub dirty: bool,
}

impl GitInfo {
    /// Suffix embedded into the build: `-<sha>` or `-<sha>-dirty`.
    pub fn build_id(&self) -> String {
        let mut parts = vec!["", self.short_sha.as_str()];
        if self.dirty {
            parts.push("dirty");
        }
        parts.join("-")
    }
}

/// Read HEAD and worktree status of the repository at `repo_path`.
pub fn git_info(repo_path: &Path) -> Result<GitInfo> {
    let repo = Repository::open(repo_path)
        .with_context(|| format!("failed to open git repository: {}", repo_path.display()))?;

    let head = repo
        .revparse_single("HEAD")
        .context("failed to resolve HEAD")?;
    let short = head.short_id().context("failed to abbreviate HEAD")?;
    let short_sha = short.as_str().unwrap_or_default().to_string();

    // Same view as `git status --porcelain`: untracked counts, ignored doesn't.
    let mut opts = StatusOptions::new();
    opts.include_untracked(true).include_ignored(false);
    let statuses = repo
        .statuses(Some(&mut opts))
        .context("failed to read worktree status")?;

    Ok(GitInfo {
        short_sha,
        dirty: !statuses.is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::TempDir;

    fn commit_readme(repo: &Repository, dir: &Path) -> git2::Oid {
        std::fs::write(dir.join("README.md"), "The Servo Parallel Browser Engine Project\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README.md")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Servo", "servo@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap()
    }

    #[test]
    fn test_clean_and_dirty_checkout() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        let oid = commit_readme(&repo, tmp.path());

        let info = git_info(tmp.path()).unwrap();
        assert!(info.short_sha.len() >= 7);
        assert!(oid.to_string().starts_with(&info.short_sha));
        assert!(!info.dirty);

        std::fs::write(tmp.path().join("untracked.rs"), "fn main() {}\n").unwrap();
        assert!(git_info(tmp.path()).unwrap().dirty);
    }

    #[test]
    fn test_not_a_repository() {
        let tmp = TempDir::new().unwrap();
        assert!(git_info(tmp.path()).is_err());
    }

    #[test]
    fn test_build_id() {
        let clean = GitInfo {
            short_sha: "1a2b3c4".to_string(),
            dirty: false,
        };
        assert_eq!(clean.build_id(), "-1a2b3c4");

        let dirty = GitInfo {
            short_sha: "1a2b3c4".to_string(),
            dirty: true,
        };
        assert_eq!(dirty.build_id(), "-1a2b3c4-dirty");
    }
}
