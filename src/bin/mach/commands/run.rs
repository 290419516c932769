//! `mach run` command

use anyhow::{bail, Result};

use crate::cli::RunArgs;
use crate::commands::locate::find_servo;
use servo_mach::builder::osmesa::apply_osmesa_env;
use servo_mach::builder::{build_env, EnvOptions, Environment, SystemProbe};
use servo_mach::util::process::ProcessBuilder;
use servo_mach::{MachContext, TargetTriple};

pub fn execute(args: RunArgs, ctx: &MachContext) -> Result<()> {
    let servo = find_servo(&args.profile, ctx, false)?;
    let host = TargetTriple::host();

    let mut env = build_env(
        &Environment::from_process(),
        ctx,
        &EnvOptions::default(),
        &SystemProbe,
    )?;
    env.set("RUST_BACKTRACE", "1");

    if args.software {
        if !host.is_linux() && !host.is_macos() {
            bail!("software rendering is only supported on Linux and macOS");
        }
        if !apply_osmesa_env(&mut env, &servo, &host)? {
            bail!("no OSMesa build found next to {}", servo.display());
        }
    }

    let status = ProcessBuilder::new(&servo)
        .args(&args.args)
        .environment(env)
        .status()?;

    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }

    Ok(())
}
