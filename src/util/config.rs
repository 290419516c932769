//! Project configuration (`.servobuild`).
//!
//! The file lives at the top of the checkout and is optional. Every key
//! has a default, some of which come from environment variables:
//!
//! - `tools.cache-dir`: `$SERVO_CACHE_DIR`, else `<topdir>/.servo`
//! - `tools.cargo-home-dir`: `$CARGO_HOME`, else `<topdir>/.cargo`
//! - `tools.rustc-with-gold`: `$SERVO_RUSTC_WITH_GOLD` (`True`/`False`), else true
//!
//! The file is parsed into [`RawConfig`] (everything optional) and then
//! resolved into [`MachConfig`], which is what the rest of the crate reads.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::android::AndroidTarget;
use crate::core::errors::MachError;
use crate::core::profile::Profile;

/// Name of the config file in the top directory.
pub const CONFIG_FILE_NAME: &str = ".servobuild";

/// `.servobuild` as written on disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawConfig {
    pub tools: RawToolsConfig,
    pub build: RawBuildConfig,
    pub android: RawAndroidConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawToolsConfig {
    pub cache_dir: Option<String>,
    pub cargo_home_dir: Option<String>,
    pub use_rustup: Option<bool>,
    pub rustc_with_gold: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawBuildConfig {
    pub android: Option<bool>,
    pub mode: Option<String>,
    pub debug_mozjs: Option<bool>,
    pub ccache: Option<String>,
    pub rustflags: Option<String>,
    pub incremental: Option<bool>,
    pub thinlto: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawAndroidConfig {
    pub sdk: Option<String>,
    pub ndk: Option<String>,
    pub toolchain: Option<String>,
    pub target: Option<String>,
}

/// Resolved configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MachConfig {
    pub tools: ToolsConfig,
    pub build: BuildConfig,
    pub android: AndroidConfig,
}

/// Tool locations and toolchain switches.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolsConfig {
    /// Download/cache directory (absolute)
    pub cache_dir: PathBuf,
    /// Cargo home directory (absolute)
    pub cargo_home_dir: PathBuf,
    /// Run cargo/rustc through `rustup run`
    pub use_rustup: bool,
    /// Link with `ld.gold` when it is available
    pub rustc_with_gold: bool,
}

/// Build switches.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Build for Android by default
    pub android: bool,
    /// Default profile; `None` means no preference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Profile>,
    /// Build SpiderMonkey with debug assertions
    pub debug_mozjs: bool,
    /// Path to a ccache binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ccache: Option<String>,
    /// Extra flags appended to RUSTFLAGS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rustflags: Option<String>,
    /// Tri-state: `None` leaves CARGO_INCREMENTAL alone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incremental: Option<bool>,
    /// Enable thin LTO
    pub thinlto: bool,
}

/// Android SDK/NDK locations and the selected target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AndroidConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<String>,
    pub target: &'static AndroidTarget,
}

impl MachConfig {
    /// Load `<topdir>/.servobuild`, falling back to defaults when the file
    /// does not exist.
    ///
    /// `env` looks up environment variables; pass `|k| std::env::var(k).ok()`
    /// for the real process environment.
    pub fn load<F>(topdir: &Path, env: F) -> Result<Self, MachError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = topdir.join(CONFIG_FILE_NAME);
        let raw = if path.exists() {
            let contents =
                std::fs::read_to_string(&path).map_err(|e| MachError::io(&path, e))?;
            toml::from_str::<RawConfig>(&contents).map_err(|e| MachError::Config {
                path: path.clone(),
                message: e.message().to_string(),
            })?
        } else {
            tracing::debug!("no {} in {}, using defaults", CONFIG_FILE_NAME, topdir.display());
            RawConfig::default()
        };

        Self::resolve(raw, topdir, env).map_err(|message| MachError::Config { path, message })
    }

    /// Apply defaults and validation to a parsed config.
    pub fn resolve<F>(raw: RawConfig, topdir: &Path, env: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cache_dir = raw
            .tools
            .cache_dir
            .or_else(|| env("SERVO_CACHE_DIR"))
            .map(|dir| resolve_relative(topdir, &dir))
            .unwrap_or_else(|| topdir.join(".servo"));

        let cargo_home_dir = raw
            .tools
            .cargo_home_dir
            .or_else(|| env("CARGO_HOME"))
            .map(|dir| resolve_relative(topdir, &dir))
            .unwrap_or_else(|| topdir.join(".cargo"));

        let rustc_with_gold = raw
            .tools
            .rustc_with_gold
            .unwrap_or_else(|| env_bool(env("SERVO_RUSTC_WITH_GOLD").as_deref(), true));

        let mode = match raw.build.mode.as_deref() {
            None | Some("") => None,
            Some(mode) => Some(mode.parse::<Profile>()?),
        };

        let target = match raw.android.target.as_deref() {
            None => AndroidTarget::default_target(),
            Some(triple) => AndroidTarget::from_triple(triple).ok_or_else(|| {
                let known: Vec<&str> = AndroidTarget::all().iter().map(|t| t.target).collect();
                format!(
                    "unsupported android target '{}'; expected one of: {}",
                    triple,
                    known.join(", ")
                )
            })?,
        };

        Ok(MachConfig {
            tools: ToolsConfig {
                cache_dir,
                cargo_home_dir,
                use_rustup: raw.tools.use_rustup.unwrap_or(true),
                rustc_with_gold,
            },
            build: BuildConfig {
                android: raw.build.android.unwrap_or(false),
                mode,
                debug_mozjs: raw.build.debug_mozjs.unwrap_or(false),
                ccache: non_empty(raw.build.ccache),
                rustflags: non_empty(raw.build.rustflags),
                incremental: raw.build.incremental,
                thinlto: raw.build.thinlto.unwrap_or(false),
            },
            android: AndroidConfig {
                sdk: non_empty(raw.android.sdk),
                ndk: non_empty(raw.android.ndk),
                toolchain: non_empty(raw.android.toolchain),
                target,
            },
        })
    }

    /// Optional cargo features to enable on the servo crate.
    pub fn servo_features(&self) -> Vec<&'static str> {
        let mut features = Vec::new();
        if self.build.debug_mozjs {
            features.push("debugmozjs");
        }
        features
    }
}

/// `True`/`False` as written by the python-era tooling; anything else
/// falls back to `default`.
fn env_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        Some("True") => true,
        Some("False") => false,
        _ => default,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Expand a leading `~` and resolve relative paths against `topdir`.
fn resolve_relative(topdir: &Path, value: &str) -> PathBuf {
    let expanded = expand_home(value);
    topdir.join(expanded)
}

fn expand_home(value: &str) -> PathBuf {
    let rest = if value == "~" {
        Some("")
    } else {
        value.strip_prefix("~/")
    };

    match (rest, directories::BaseDirs::new()) {
        (Some(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => PathBuf::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let tmp = TempDir::new().unwrap();
        let config = MachConfig::load(tmp.path(), no_env).unwrap();

        assert_eq!(config.tools.cache_dir, tmp.path().join(".servo"));
        assert_eq!(config.tools.cargo_home_dir, tmp.path().join(".cargo"));
        assert!(config.tools.use_rustup);
        assert!(config.tools.rustc_with_gold);
        assert!(!config.build.android);
        assert!(config.build.mode.is_none());
        assert!(config.build.incremental.is_none());
        assert!(config.build.ccache.is_none());
        assert!(!config.build.thinlto);
        assert_eq!(config.android.target.target, "armv7-linux-androideabi");
        assert!(config.servo_features().is_empty());
    }

    #[test]
    fn test_env_defaults() {
        let tmp = TempDir::new().unwrap();
        let vars: HashMap<&str, &str> = [
            ("SERVO_CACHE_DIR", "/var/cache/servo"),
            ("CARGO_HOME", "cargo-home"),
            ("SERVO_RUSTC_WITH_GOLD", "False"),
        ]
        .into_iter()
        .collect();

        let config =
            MachConfig::load(tmp.path(), |k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.tools.cache_dir, PathBuf::from("/var/cache/servo"));
        assert_eq!(config.tools.cargo_home_dir, tmp.path().join("cargo-home"));
        assert!(!config.tools.rustc_with_gold);
    }

    #[test]
    fn test_gold_env_ignores_unknown_values() {
        assert!(env_bool(Some("yes"), true));
        assert!(!env_bool(Some("1"), false));
        assert!(env_bool(Some("True"), false));
        assert!(!env_bool(None, false));
    }

    #[test]
    fn test_file_overrides_env() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
[tools]
cache-dir = "cache"
use-rustup = false
rustc-with-gold = true

[build]
mode = "release"
debug-mozjs = true
ccache = "/usr/bin/ccache"
rustflags = "-C debuginfo=1"
incremental = false
thinlto = true

[android]
sdk = "/opt/android-sdk"
ndk = ""
target = "aarch64-linux-android"
"#,
        )
        .unwrap();

        let config = MachConfig::load(tmp.path(), |k| match k {
            "SERVO_CACHE_DIR" => Some("/ignored".to_string()),
            "SERVO_RUSTC_WITH_GOLD" => Some("False".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.tools.cache_dir, tmp.path().join("cache"));
        assert!(!config.tools.use_rustup);
        assert!(config.tools.rustc_with_gold);
        assert_eq!(config.build.mode, Some(Profile::Release));
        assert_eq!(config.build.ccache.as_deref(), Some("/usr/bin/ccache"));
        assert_eq!(config.build.rustflags.as_deref(), Some("-C debuginfo=1"));
        assert_eq!(config.build.incremental, Some(false));
        assert!(config.build.thinlto);
        assert_eq!(config.android.sdk.as_deref(), Some("/opt/android-sdk"));
        assert!(config.android.ndk.is_none());
        assert_eq!(config.android.target.platform, "android-21");
        assert_eq!(config.servo_features(), vec!["debugmozjs"]);
    }

    #[test]
    fn test_empty_mode_means_no_preference() {
        let mut raw = RawConfig::default();
        raw.build.mode = Some(String::new());
        let config = MachConfig::resolve(raw, Path::new("/src"), no_env).unwrap();
        assert!(config.build.mode.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[build]\nmode = \"fast\"\n",
        )
        .unwrap();
        let err = MachConfig::load(tmp.path(), no_env).unwrap_err();
        assert!(matches!(err, MachError::Config { .. }));
        assert!(err.to_string().contains("invalid build mode 'fast'"));

        let mut raw = RawConfig::default();
        raw.android.target = Some("mips-linux-android".to_string());
        let err = MachConfig::resolve(raw, Path::new("/src"), no_env).unwrap_err();
        assert!(err.contains("i686-linux-android"));
    }

    #[test]
    fn test_malformed_toml_names_the_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "[build\n").unwrap();

        let err = MachConfig::load(tmp.path(), no_env).unwrap_err();
        assert!(err.to_string().contains(".servobuild"));
    }

    #[test]
    fn test_tilde_expansion() {
        let expanded = resolve_relative(Path::new("/src"), "~/servo-cache");
        if let Some(dirs) = directories::BaseDirs::new() {
            assert_eq!(expanded, dirs.home_dir().join("servo-cache"));
        }
        assert_eq!(
            resolve_relative(Path::new("/src"), "rel/dir"),
            PathBuf::from("/src/rel/dir")
        );
    }
}
