//! `mach clobber` command

use std::io::IsTerminal;

use anyhow::Result;

use crate::cli::ClobberArgs;
use servo_mach::ops::{ensure_clobbered, ClobberStatus};
use servo_mach::util::diagnostic::{emit, Diagnostic};
use servo_mach::util::fs::remove_dir_all_if_exists;
use servo_mach::MachContext;

pub fn execute(args: ClobberArgs, ctx: &MachContext) -> Result<()> {
    let target_dir = ctx.target_dir();

    match ensure_clobbered(ctx.topdir(), &target_dir, ctx.autoclobber())? {
        ClobberStatus::Disabled => {
            eprintln!("Automatic clobbering is disabled; set AUTOCLOBBER to enable it.");
        }
        ClobberStatus::NotNeeded => eprintln!("Clobber not needed."),
        ClobberStatus::Needed if args.dry_run => {
            let diag = Diagnostic::warning("target directory is older than the CLOBBER stamp")
                .with_location(target_dir.clone())
                .with_suggestion("Run `mach clobber` without --dry-run to remove it");
            emit(&diag, std::io::stderr().is_terminal());
        }
        ClobberStatus::Needed => {
            eprintln!("Automatically clobbering target directory: {}", target_dir.display());
            remove_dir_all_if_exists(&target_dir)?;
            // Fresh stamp so the next check passes.
            ensure_clobbered(ctx.topdir(), &target_dir, false)?;
            eprintln!("     Removed {}", target_dir.display());
        }
    }

    Ok(())
}
