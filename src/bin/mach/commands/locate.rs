//! `mach locate` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::{LocateArgs, ProfileArgs};
use servo_mach::core::Profile;
use servo_mach::ops::locate_binary;
use servo_mach::MachContext;

pub fn execute(args: LocateArgs, ctx: &MachContext) -> Result<()> {
    let android = args.android || ctx.config().build.android;
    let path = find_servo(&args.profile, ctx, android)?;
    println!("{}", path.display());
    Ok(())
}

/// Locate the binary, falling back to `build.mode` when no flag was given.
pub fn find_servo(profile: &ProfileArgs, ctx: &MachContext, android: bool) -> Result<PathBuf> {
    let (release, dev) = match (profile.release, profile.dev, ctx.config().build.mode) {
        (false, false, Some(Profile::Release)) => (true, false),
        (false, false, Some(Profile::Dev)) => (false, true),
        (release, dev, _) => (release, dev),
    };

    let android_target = android.then(|| ctx.config().android.target.target);
    let path = locate_binary(&ctx.target_dir(), android_target, release, dev)?;
    Ok(path)
}
