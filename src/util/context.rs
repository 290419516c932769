//! Project context for `mach` operations.
//!
//! Everything that used to be looked up lazily (the pinned toolchain, the
//! target directory override, the autoclobber switch) is captured once
//! here and passed by reference to the operations that need it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::errors::MachError;
use crate::util::config::MachConfig;

/// File that pins the rust toolchain, also used to find the top directory.
pub const TOOLCHAIN_FILE: &str = "rust-toolchain";

/// Resolved project context.
#[derive(Debug, Clone)]
pub struct MachContext {
    /// Top of the checkout
    topdir: PathBuf,

    /// Resolved `.servobuild`
    config: MachConfig,

    /// Contents of `rust-toolchain`, if present
    toolchain: Option<String>,

    /// `$CARGO_TARGET_DIR` at startup
    target_dir_override: Option<PathBuf>,

    /// `$AUTOCLOBBER` was set to a non-empty value at startup
    autoclobber: bool,
}

impl MachContext {
    /// Resolve the context from the process environment.
    ///
    /// When `topdir` is `None`, the nearest ancestor of the current
    /// directory containing `rust-toolchain` is used, falling back to the
    /// current directory.
    pub fn new(topdir: Option<PathBuf>) -> Result<Self> {
        let topdir = match topdir {
            Some(dir) => dir,
            None => {
                let cwd = std::env::current_dir().context("failed to get current directory")?;
                find_topdir(&cwd).unwrap_or(cwd)
            }
        };

        Self::with_env(topdir, |key| std::env::var(key).ok())
    }

    /// Resolve the context using `env` for environment lookups.
    pub fn with_env<F>(topdir: PathBuf, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = MachConfig::load(&topdir, &env)?;
        let toolchain = read_toolchain_file(&topdir)?;

        let target_dir_override = env("CARGO_TARGET_DIR")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);
        let autoclobber = env("AUTOCLOBBER").is_some_and(|v| !v.is_empty());

        tracing::debug!(
            topdir = %topdir.display(),
            toolchain = ?toolchain,
            "resolved project context"
        );

        Ok(MachContext {
            topdir,
            config,
            toolchain,
            target_dir_override,
            autoclobber,
        })
    }

    /// Top of the checkout.
    pub fn topdir(&self) -> &Path {
        &self.topdir
    }

    pub fn config(&self) -> &MachConfig {
        &self.config
    }

    /// Whether `AUTOCLOBBER` was requested.
    pub fn autoclobber(&self) -> bool {
        self.autoclobber
    }

    /// Cargo target directory (`$CARGO_TARGET_DIR` or `<topdir>/target`).
    pub fn target_dir(&self) -> PathBuf {
        self.target_dir_override
            .clone()
            .unwrap_or_else(|| self.topdir.join("target"))
    }

    /// The pinned toolchain from `rust-toolchain`.
    pub fn toolchain(&self) -> Result<&str, MachError> {
        self.toolchain.as_deref().ok_or_else(|| {
            MachError::toolchain(
                format!(
                    "no {} file found in {}",
                    TOOLCHAIN_FILE,
                    self.topdir.display()
                ),
                Some("Run mach from inside a Servo checkout or pass --topdir"),
            )
        })
    }

    /// Directory of the servo crate.
    pub fn servo_crate(&self) -> PathBuf {
        self.topdir.join("ports").join("servo")
    }

    /// Manifest of the servo crate.
    pub fn servo_manifest(&self) -> PathBuf {
        self.servo_crate().join("Cargo.toml")
    }

    /// Android packaging support files.
    pub fn android_support_dir(&self) -> PathBuf {
        self.topdir.join("support").join("android")
    }

    /// Output directory of an Android build.
    pub fn android_build_dir(&self, dev: bool) -> PathBuf {
        self.target_dir()
            .join(self.config.android.target.target)
            .join(if dev { "debug" } else { "release" })
    }

    /// Output directory of the Android AAR.
    pub fn android_aar_dir(&self) -> PathBuf {
        self.topdir.join("target").join("android_aar")
    }

    /// The rustdoc wrapper that documents private items.
    pub fn rustdoc_wrapper(&self) -> PathBuf {
        self.topdir.join("etc").join("rustdoc-with-private")
    }
}

/// Search upward from `start` for a directory containing `rust-toolchain`.
pub fn find_topdir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(TOOLCHAIN_FILE).is_file())
        .map(Path::to_path_buf)
}

fn read_toolchain_file(topdir: &Path) -> Result<Option<String>> {
    let path = topdir.join(TOOLCHAIN_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Some(contents.trim().to_string()))
}
