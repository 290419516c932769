//! Environment composition for cargo/rustc invocations.
//!
//! [`build_env`] starts from a copy of a base environment (normally the
//! process environment) and layers a fixed sequence of rules on top:
//! MSVC dependency paths, Windows overrides, the incremental toggle,
//! library search paths, Android SDK/NDK variables, rustdoc wrapper,
//! accumulated RUSTFLAGS, and the git build stamp.
//!
//! Flag variables (`RUSTFLAGS`) are appended to; every other variable is
//! simply set, so a later rule wins. Nothing is ever removed.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Serialize, Serializer};

use crate::builder::msvc::{MsvcDeps, MsvcPackage};
use crate::builder::probe::HostProbe;
use crate::core::triple::TargetTriple;
use crate::util::context::MachContext;

/// A set of environment variables for a child process.
///
/// Names and values are kept as OS strings so variables that are not
/// valid UTF-8 reach the child unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<OsString, OsString>,
}

impl Environment {
    /// An empty environment.
    pub fn new() -> Self {
        Environment {
            vars: BTreeMap::new(),
        }
    }

    /// Copy of the current process environment.
    pub fn from_process() -> Self {
        Environment {
            vars: std::env::vars_os().collect(),
        }
    }

    /// Value of `key`, if set and valid UTF-8.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_os(key).and_then(OsStr::to_str)
    }

    pub fn get_os(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(OsStr::new(key))
    }

    /// Set a variable, replacing any previous value.
    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Append a space-separated flag to a flag variable.
    pub fn append_flag(&mut self, key: &str, flag: &str) {
        let value = self.vars.entry(OsString::from(key)).or_default();
        value.push(" ");
        value.push(flag);
    }

    /// Prepend directories to a PATH-like variable, keeping its old value.
    pub fn prepend_paths(&mut self, key: &str, dirs: &[PathBuf], separator: &str) {
        if dirs.is_empty() {
            return;
        }

        let mut joined = OsString::new();
        for (i, dir) in dirs.iter().enumerate() {
            if i > 0 {
                joined.push(separator);
            }
            joined.push(dir);
        }
        if let Some(existing) = self.get_os(key).filter(|v| !v.is_empty()) {
            joined.push(separator);
            joined.push(existing);
        }
        self.set(key, joined);
    }

    /// All variables, for handing to a child process.
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    /// All variables for display, with invalid UTF-8 replaced.
    pub fn iter_lossy(&self) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>)> {
        self.vars
            .iter()
            .map(|(k, v)| (k.to_string_lossy(), v.to_string_lossy()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter_lossy())
    }
}

impl FromIterator<(String, String)> for Environment {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Environment {
            vars: iter
                .into_iter()
                .map(|(k, v)| (OsString::from(k), OsString::from(v)))
                .collect(),
        }
    }
}

/// Per-invocation inputs to [`build_env`].
#[derive(Debug, Clone, Default)]
pub struct EnvOptions<'a> {
    /// Cross-compilation target; the host triple is used when `None`.
    pub target: Option<&'a str>,
    /// Hosts file exported as `HOST_FILE`.
    pub hosts_file: Option<&'a Path>,
    /// Composing for a build step (enables the git stamp).
    pub is_build: bool,
    /// Composing for `test-unit` (leaves RUSTDOC alone).
    pub test_unit: bool,
    /// Directories prepended to the dynamic library search path.
    pub extra_lib_dirs: Vec<PathBuf>,
}

/// Compose the environment for a cargo/rustc invocation.
pub fn build_env(
    base: &Environment,
    ctx: &MachContext,
    opts: &EnvOptions<'_>,
    probe: &dyn HostProbe,
) -> Result<Environment> {
    let config = ctx.config();
    let host = probe.host_triple();
    let separator = host.path_separator();
    let target = match opts.target {
        Some(triple) => TargetTriple::parse(triple)
            .ok_or_else(|| anyhow!("invalid target triple '{}'", triple))?,
        None => host.clone(),
    };

    let mut env = base.clone();
    let mut extra_path: Vec<PathBuf> = Vec::new();

    if target.is_msvc() {
        let x64 = if target.arch == "x86_64" { "64" } else { "" };
        let deps = MsvcDeps::new(&config.tools.cache_dir);
        extra_path.extend(deps.tool_dirs());

        let openssl = deps.package_dir(MsvcPackage::Openssl);
        env.set("OPENSSL_INCLUDE_DIR", path_str(&openssl.join("include")));
        env.set("OPENSSL_LIB_DIR", path_str(&openssl.join(format!("lib{}", x64))));
        env.set("OPENSSL_LIBS", "libsslMD:libcryptoMD");
        env.set(
            "MOZTOOLS_PATH",
            path_str(&deps.package_dir(MsvcPackage::Moztools).join("bin")),
        );
        env.set(
            "LIBCLANG_PATH",
            path_str(&deps.package_dir(MsvcPackage::Llvm).join("lib")),
        );
    }

    if host.is_windows() {
        if !base.get_os("NATIVE_WIN32_PYTHON").is_some_and(|v| !v.is_empty()) {
            match probe.find_executable("python") {
                Some(python) => env.set("NATIVE_WIN32_PYTHON", path_str(&python)),
                None => tracing::warn!("python not found on PATH; NATIVE_WIN32_PYTHON left unset"),
            }
        }
        // Always build harfbuzz from source
        env.set("HARFBUZZ_SYS_NO_PKG_CONFIG", "true");
    }

    env.prepend_paths("PATH", &extra_path, separator);

    match config.build.incremental {
        Some(true) => env.set("CARGO_INCREMENTAL", "1"),
        Some(false) => env.set("CARGO_INCREMENTAL", "0"),
        None => {}
    }

    let lib_var = if host.is_macos() {
        "DYLD_LIBRARY_PATH"
    } else {
        "LD_LIBRARY_PATH"
    };
    env.prepend_paths(lib_var, &opts.extra_lib_dirs, separator);

    if let Some(ref sdk) = config.android.sdk {
        env.set("ANDROID_SDK", sdk.as_str());
    }
    if let Some(ref ndk) = config.android.ndk {
        env.set("ANDROID_NDK", ndk.as_str());
    }
    if let Some(ref toolchain) = config.android.toolchain {
        env.set("ANDROID_TOOLCHAIN", toolchain.as_str());
    }
    env.set("ANDROID_PLATFORM", config.android.target.platform);

    // build-apk reads these names; the submodule makefiles read the ones above.
    for (from, to) in [
        ("ANDROID_SDK", "ANDROID_HOME"),
        ("ANDROID_NDK", "NDK_HOME"),
        ("ANDROID_TOOLCHAIN", "NDK_STANDALONE"),
    ] {
        if let Some(value) = env.get_os(from).map(OsStr::to_os_string) {
            env.set(to, value);
        }
    }

    if let Some(hosts_file) = opts.hosts_file {
        env.set("HOST_FILE", path_str(hosts_file));
    }

    // The wrapper is a bash script; test-unit runs doctests on Windows too.
    if !opts.test_unit {
        env.set("RUSTDOC", path_str(&ctx.rustdoc_wrapper()));
    }

    if let Some(ref rustflags) = config.build.rustflags {
        env.append_flag("RUSTFLAGS", rustflags);
    }

    if config.tools.rustc_with_gold
        && !host.is_windows()
        && probe.find_executable("ld.gold").is_some()
    {
        env.append_flag("RUSTFLAGS", "-C link-args=-fuse-ld=gold");
    }

    if let Some(ref ccache) = config.build.ccache {
        env.set("CCACHE", ccache.as_str());
    }

    // Hard floats and SIMD on ARM devices
    if let Some(target) = opts.target {
        if target.starts_with("arm") || target.starts_with("aarch64") {
            env.append_flag("RUSTFLAGS", "-C target-feature=+neon");
        }
    }

    env.append_flag("RUSTFLAGS", "-W unused-extern-crates");

    let git_info = if opts.is_build && ctx.topdir().join(".git").is_dir() {
        probe.git_info(ctx.topdir())?.build_id()
    } else {
        String::new()
    };
    env.set("GIT_INFO", git_info);

    if config.build.thinlto {
        env.append_flag("RUSTFLAGS", "-Z thinlto");
    }

    tracing::debug!(vars = env.len(), target = %target, "composed build environment");
    Ok(env)
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context_with_config, FakeProbe};

    fn base() -> Environment {
        [("PATH".to_string(), "/usr/bin:/bin".to_string())]
            .into_iter()
            .collect()
    }

    fn linux() -> FakeProbe {
        FakeProbe::new(TargetTriple::new("x86_64", "unknown", "linux", Some("gnu")))
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_variables_survive_composition() {
        use std::os::unix::ffi::OsStrExt;

        let latin1 = OsStr::from_bytes(b"/opt/caf\xe9/lib");
        std::env::set_var("MACH_TEST_LATIN1_LIB_DIR", latin1);
        let base = Environment::from_process();
        std::env::remove_var("MACH_TEST_LATIN1_LIB_DIR");

        assert_eq!(base.get_os("MACH_TEST_LATIN1_LIB_DIR"), Some(latin1));
        assert_eq!(base.get("MACH_TEST_LATIN1_LIB_DIR"), None);

        let (_tmp, ctx) = context_with_config("");
        let env = build_env(&base, &ctx, &EnvOptions::default(), &linux()).unwrap();
        assert_eq!(env.get_os("MACH_TEST_LATIN1_LIB_DIR"), Some(latin1));

        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["MACH_TEST_LATIN1_LIB_DIR"], "/opt/caf\u{FFFD}/lib");
    }

    #[cfg(unix)]
    #[test]
    fn test_prepend_keeps_non_utf8_value() {
        use std::os::unix::ffi::OsStrExt;

        let mut env = Environment::new();
        env.set("LD_LIBRARY_PATH", OsStr::from_bytes(b"/opt/caf\xe9/lib"));
        env.prepend_paths("LD_LIBRARY_PATH", &[PathBuf::from("/a")], ":");

        assert_eq!(
            env.get_os("LD_LIBRARY_PATH").unwrap().as_bytes(),
            b"/a:/opt/caf\xe9/lib"
        );
    }

    #[test]
    fn test_environment_append_and_prepend() {
        let mut env = Environment::new();
        env.append_flag("RUSTFLAGS", "-W unused-extern-crates");
        assert_eq!(env.get("RUSTFLAGS"), Some(" -W unused-extern-crates"));

        env.prepend_paths("LD_LIBRARY_PATH", &[PathBuf::from("/a"), PathBuf::from("/b")], ":");
        assert_eq!(env.get("LD_LIBRARY_PATH"), Some("/a:/b"));
        env.prepend_paths("LD_LIBRARY_PATH", &[PathBuf::from("/c")], ":");
        assert_eq!(env.get("LD_LIBRARY_PATH"), Some("/c:/a:/b"));

        env.prepend_paths("LD_LIBRARY_PATH", &[], ":");
        assert_eq!(env.get("LD_LIBRARY_PATH"), Some("/c:/a:/b"));
    }

    #[test]
    fn test_incremental_unset_leaves_toggle_alone() {
        let (_tmp, ctx) = context_with_config("");
        let env = build_env(&base(), &ctx, &EnvOptions::default(), &linux()).unwrap();
        assert!(!env.contains("CARGO_INCREMENTAL"));
    }

    #[test]
    fn test_incremental_false_sets_zero() {
        let (_tmp, ctx) = context_with_config("[build]\nincremental = false\n");
        let env = build_env(&base(), &ctx, &EnvOptions::default(), &linux()).unwrap();
        assert_eq!(env.get("CARGO_INCREMENTAL"), Some("0"));

        let (_tmp, ctx) = context_with_config("[build]\nincremental = true\n");
        let env = build_env(&base(), &ctx, &EnvOptions::default(), &linux()).unwrap();
        assert_eq!(env.get("CARGO_INCREMENTAL"), Some("1"));
    }

    #[test]
    fn test_rustflags_accumulate_onto_base() {
        let (_tmp, ctx) =
            context_with_config("[build]\nrustflags = \"-C debuginfo=1\"\nthinlto = true\n");
        let mut base = base();
        base.set("RUSTFLAGS", "-C opt-level=2");

        let probe = linux().with_executable("ld.gold", "/usr/bin/ld.gold");
        let opts = EnvOptions {
            target: Some("aarch64-linux-android"),
            ..Default::default()
        };
        let env = build_env(&base, &ctx, &opts, &probe).unwrap();

        assert_eq!(
            env.get("RUSTFLAGS"),
            Some(
                "-C opt-level=2 -C debuginfo=1 -C link-args=-fuse-ld=gold \
                 -C target-feature=+neon -W unused-extern-crates -Z thinlto"
            )
        );
        // The base copy is untouched
        assert_eq!(base.get("RUSTFLAGS"), Some("-C opt-level=2"));
    }

    #[test]
    fn test_gold_requires_binary_and_config() {
        let (_tmp, ctx) = context_with_config("");
        let env = build_env(&base(), &ctx, &EnvOptions::default(), &linux()).unwrap();
        assert_eq!(env.get("RUSTFLAGS"), Some(" -W unused-extern-crates"));

        let (_tmp, ctx) = context_with_config("[tools]\nrustc-with-gold = false\n");
        let probe = linux().with_executable("ld.gold", "/usr/bin/ld.gold");
        let env = build_env(&base(), &ctx, &EnvOptions::default(), &probe).unwrap();
        assert!(!env.get("RUSTFLAGS").unwrap().contains("gold"));
    }

    #[test]
    fn test_msvc_target_paths() {
        let (tmp, ctx) = context_with_config("");
        let probe = FakeProbe::new(TargetTriple::new("x86_64", "pc", "windows", Some("msvc")))
            .with_executable("python", "C:\\Python27\\python.exe")
            .with_executable("ld.gold", "C:\\gold\\ld.gold");
        let mut base = Environment::new();
        base.set("PATH", "C:\\Windows");

        let env = build_env(&base, &ctx, &EnvOptions::default(), &probe).unwrap();

        let deps = tmp.path().join(".servo").join("msvc-dependencies");
        let openssl = deps.join("openssl").join("1.1.0e-vs2015");
        assert_eq!(
            env.get("OPENSSL_LIB_DIR"),
            Some(openssl.join("lib64").display().to_string().as_str())
        );
        assert_eq!(env.get("OPENSSL_LIBS"), Some("libsslMD:libcryptoMD"));
        assert_eq!(
            env.get("LIBCLANG_PATH"),
            Some(deps.join("llvm").join("4.0.0").join("lib").display().to_string().as_str())
        );

        let path = env.get("PATH").unwrap();
        let cmake_bin = deps.join("cmake").join("3.7.2").join("bin").display().to_string();
        assert!(path.starts_with(&cmake_bin));
        assert!(path.ends_with(";C:\\Windows"));
        assert_eq!(path.split(';').count(), 4);

        assert_eq!(env.get("NATIVE_WIN32_PYTHON"), Some("C:\\Python27\\python.exe"));
        assert_eq!(env.get("HARFBUZZ_SYS_NO_PKG_CONFIG"), Some("true"));
        // No gold on Windows even when present
        assert!(!env.get("RUSTFLAGS").unwrap().contains("gold"));
    }

    #[test]
    fn test_msvc_cross_target_from_linux() {
        let (tmp, ctx) = context_with_config("");
        let opts = EnvOptions {
            target: Some("i686-pc-windows-msvc"),
            ..Default::default()
        };

        let env = build_env(&base(), &ctx, &opts, &linux()).unwrap();

        let openssl = tmp
            .path()
            .join(".servo")
            .join("msvc-dependencies")
            .join("openssl")
            .join("1.1.0e-vs2015");
        assert_eq!(
            env.get("OPENSSL_LIB_DIR"),
            Some(openssl.join("lib").display().to_string().as_str())
        );
        assert!(env.get("PATH").unwrap().ends_with(":/usr/bin:/bin"));
    }

    #[test]
    fn test_invalid_target_is_rejected() {
        let (_tmp, ctx) = context_with_config("");
        let opts = EnvOptions {
            target: Some("msvc"),
            ..Default::default()
        };

        let err = build_env(&base(), &ctx, &opts, &linux()).unwrap_err();
        assert!(err.to_string().contains("invalid target triple 'msvc'"));
    }

    #[test]
    fn test_native_python_kept_when_set() {
        let (_tmp, ctx) = context_with_config("");
        let probe = FakeProbe::new(TargetTriple::new("x86_64", "pc", "windows", Some("gnu")))
            .with_executable("python", "C:\\Other\\python.exe");
        let mut base = base();
        base.set("NATIVE_WIN32_PYTHON", "C:\\Python27\\python.exe");

        let env = build_env(&base, &ctx, &EnvOptions::default(), &probe).unwrap();
        assert_eq!(env.get("NATIVE_WIN32_PYTHON"), Some("C:\\Python27\\python.exe"));
        assert!(!env.contains("OPENSSL_LIBS"));
    }

    #[test]
    fn test_extra_lib_dirs_per_platform() {
        let (_tmp, ctx) = context_with_config("");
        let opts = EnvOptions {
            extra_lib_dirs: vec![PathBuf::from("/opt/osmesa/lib")],
            ..Default::default()
        };

        let mut base = base();
        base.set("LD_LIBRARY_PATH", "/usr/local/lib");
        let env = build_env(&base, &ctx, &opts, &linux()).unwrap();
        assert_eq!(env.get("LD_LIBRARY_PATH"), Some("/opt/osmesa/lib:/usr/local/lib"));
        assert!(!env.contains("DYLD_LIBRARY_PATH"));

        let mac = FakeProbe::new(TargetTriple::new("x86_64", "apple", "darwin", None));
        let env = build_env(&Environment::new(), &ctx, &opts, &mac).unwrap();
        assert_eq!(env.get("DYLD_LIBRARY_PATH"), Some("/opt/osmesa/lib"));
    }

    #[test]
    fn test_android_variables_mirrored() {
        let (_tmp, ctx) = context_with_config(
            "[android]\nsdk = \"/opt/sdk\"\nndk = \"/opt/ndk\"\ntarget = \"aarch64-linux-android\"\n",
        );
        let env = build_env(&base(), &ctx, &EnvOptions::default(), &linux()).unwrap();

        assert_eq!(env.get("ANDROID_SDK"), Some("/opt/sdk"));
        assert_eq!(env.get("ANDROID_HOME"), Some("/opt/sdk"));
        assert_eq!(env.get("NDK_HOME"), Some("/opt/ndk"));
        assert_eq!(env.get("ANDROID_PLATFORM"), Some("android-21"));
        assert!(!env.contains("ANDROID_TOOLCHAIN"));
        assert!(!env.contains("NDK_STANDALONE"));

        // A toolchain exported by the caller is mirrored too
        let mut base = base();
        base.set("ANDROID_TOOLCHAIN", "/opt/toolchain");
        let env = build_env(&base, &ctx, &EnvOptions::default(), &linux()).unwrap();
        assert_eq!(env.get("NDK_STANDALONE"), Some("/opt/toolchain"));
    }

    #[test]
    fn test_rustdoc_hosts_file_and_ccache() {
        let (tmp, ctx) = context_with_config("[build]\nccache = \"/usr/bin/ccache\"\n");
        let hosts = tmp.path().join("hosts");
        let opts = EnvOptions {
            hosts_file: Some(&hosts),
            ..Default::default()
        };
        let env = build_env(&base(), &ctx, &opts, &linux()).unwrap();

        assert_eq!(
            env.get("RUSTDOC"),
            Some(tmp.path().join("etc").join("rustdoc-with-private").display().to_string().as_str())
        );
        assert_eq!(env.get("HOST_FILE"), Some(hosts.display().to_string().as_str()));
        assert_eq!(env.get("CCACHE"), Some("/usr/bin/ccache"));

        let opts = EnvOptions {
            test_unit: true,
            ..Default::default()
        };
        let env = build_env(&base(), &ctx, &opts, &linux()).unwrap();
        assert!(!env.contains("RUSTDOC"));
    }

    #[test]
    fn test_git_info_only_for_builds_in_checkouts() {
        let (tmp, ctx) = context_with_config("");
        let probe = linux().with_git("0f3c9a1", true);
        let build = EnvOptions {
            is_build: true,
            ..Default::default()
        };

        // No .git directory yet
        let env = build_env(&base(), &ctx, &build, &probe).unwrap();
        assert_eq!(env.get("GIT_INFO"), Some(""));

        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        let env = build_env(&base(), &ctx, &build, &probe).unwrap();
        assert_eq!(env.get("GIT_INFO"), Some("-0f3c9a1-dirty"));

        let env = build_env(&base(), &ctx, &EnvOptions::default(), &probe).unwrap();
        assert_eq!(env.get("GIT_INFO"), Some(""));
    }
}
