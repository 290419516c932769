//! `mach config` command

use anyhow::{Context, Result};

use crate::cli::ConfigArgs;
use servo_mach::MachContext;

pub fn execute(args: ConfigArgs, ctx: &MachContext) -> Result<()> {
    let config = ctx.config();

    let output = if args.json {
        serde_json::to_string_pretty(config).context("failed to serialize config")?
    } else {
        toml::to_string_pretty(config).context("failed to serialize config")?
    };
    println!("{}", output.trim_end());

    Ok(())
}
