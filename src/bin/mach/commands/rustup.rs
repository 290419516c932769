//! `mach rustup` command

use anyhow::Result;

use crate::cli::RustupArgs;
use servo_mach::builder::rustup::call_rustup_run;
use servo_mach::builder::{build_env, EnvOptions, Environment, SystemProbe};
use servo_mach::{MachContext, TargetTriple};

pub fn execute(args: RustupArgs, ctx: &MachContext) -> Result<()> {
    let env = build_env(
        &Environment::from_process(),
        ctx,
        &EnvOptions::default(),
        &SystemProbe,
    )?;

    let status = call_rustup_run(ctx, &TargetTriple::host(), &args.args, env)?;
    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }

    Ok(())
}
