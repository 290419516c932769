//! `mach env` command

use anyhow::{Context, Result};

use crate::cli::EnvArgs;
use servo_mach::builder::{build_env, EnvOptions, Environment, SystemProbe};
use servo_mach::MachContext;

pub fn execute(args: EnvArgs, ctx: &MachContext) -> Result<()> {
    let opts = EnvOptions {
        target: args.target.as_deref(),
        hosts_file: args.hosts_file.as_deref(),
        is_build: args.build,
        test_unit: args.test_unit,
        extra_lib_dirs: Vec::new(),
    };

    let env = build_env(&Environment::from_process(), ctx, &opts, &SystemProbe)?;

    if args.json {
        let json = serde_json::to_string_pretty(&env).context("failed to serialize environment")?;
        println!("{}", json);
    } else {
        for (key, value) in env.iter_lossy() {
            println!("{}={}", key, value);
        }
    }

    Ok(())
}
