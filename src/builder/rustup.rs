//! Running cargo and rustc through rustup with the pinned toolchain.

use std::process::ExitStatus;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use semver::Version;

use crate::builder::env::Environment;
use crate::core::errors::MachError;
use crate::core::triple::TargetTriple;
use crate::util::context::MachContext;
use crate::util::diagnostic::suggestions;
use crate::util::process::{find_executable, ProcessBuilder};

/// Oldest rustup that understands `rustup run --install`.
pub const MIN_RUSTUP_VERSION: Version = Version::new(1, 8, 0);

static RUSTUP_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"rustup (\d+)\.(\d+)\.(\d+)").unwrap());

/// Extract the version from `rustup --version` output.
pub fn parse_rustup_version(output: &str) -> Result<Version, MachError> {
    let caps = RUSTUP_VERSION_RE.captures(output).ok_or_else(|| {
        MachError::toolchain(
            format!("could not parse rustup version from {:?}", output.trim()),
            None,
        )
    })?;

    let part = |i: usize| caps[i].parse::<u64>().unwrap_or(0);
    Ok(Version::new(part(1), part(2), part(3)))
}

/// Reject rustup versions older than [`MIN_RUSTUP_VERSION`].
pub fn check_rustup_version(version: &Version) -> Result<(), MachError> {
    if *version < MIN_RUSTUP_VERSION {
        return Err(MachError::toolchain(
            format!(
                "rustup is at version {}, Servo requires {} or more recent.",
                version, MIN_RUSTUP_VERSION
            ),
            Some(suggestions::UPDATE_RUSTUP),
        ));
    }
    Ok(())
}

/// The full command line for `args`, with or without rustup.
///
/// With rustup the toolchain is installed on demand; on Windows hosts the
/// MSVC host toolchain is requested explicitly.
pub fn rustup_invocation(
    use_rustup: bool,
    toolchain: &str,
    host: &TargetTriple,
    args: &[String],
) -> Vec<String> {
    let suffix = host.exe_suffix();
    if use_rustup {
        let mut toolchain = toolchain.to_string();
        if host.is_windows() {
            toolchain.push_str("-x86_64-pc-windows-msvc");
        }
        let mut cmd = vec![
            format!("rustup{}", suffix),
            "run".to_string(),
            "--install".to_string(),
            toolchain,
        ];
        cmd.extend(args.iter().cloned());
        cmd
    } else {
        let mut cmd = args.to_vec();
        if let Some(program) = cmd.first_mut() {
            program.push_str(suffix);
        }
        cmd
    }
}

/// Installed rustup version, or a toolchain error with setup hints.
pub fn installed_rustup_version() -> Result<Version, MachError> {
    let Some(rustup) = find_executable("rustup") else {
        return Err(MachError::toolchain(
            "It looks like rustup is not installed.",
            Some(suggestions::INSTALL_RUSTUP),
        ));
    };

    let output = ProcessBuilder::new(&rustup)
        .arg("--version")
        .exec_and_check()
        .map_err(|e| MachError::toolchain(format!("failed to run rustup: {:#}", e), None))?;

    parse_rustup_version(&String::from_utf8_lossy(&output.stdout))
}

/// Run `args` (e.g. `cargo build`) with the project toolchain.
pub fn call_rustup_run(
    ctx: &MachContext,
    host: &TargetTriple,
    args: &[String],
    env: Environment,
) -> Result<ExitStatus> {
    if args.is_empty() {
        return Err(MachError::toolchain("no command given to run", None).into());
    }

    let use_rustup = ctx.config().tools.use_rustup;
    let toolchain = if use_rustup {
        check_rustup_version(&installed_rustup_version()?)?;
        ctx.toolchain()?
    } else {
        ""
    };

    let cmd = rustup_invocation(use_rustup, toolchain, host, args);
    ProcessBuilder::new(&cmd[0])
        .args(&cmd[1..])
        .environment(env)
        .cwd(ctx.topdir())
        .status()
}
