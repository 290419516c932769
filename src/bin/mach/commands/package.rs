//! `mach package` command

use anyhow::Result;

use crate::cli::PackageArgs;
use servo_mach::ops::archive_deterministically;
use servo_mach::util::hash::sha256_file;

pub fn execute(args: PackageArgs) -> Result<()> {
    archive_deterministically(&args.dir, &args.dest, args.prepend_path.as_deref())?;
    eprintln!("    Packaged {}", args.dest.display());

    let digest = sha256_file(&args.dest)?;
    println!("{}  {}", digest, args.dest.display());

    Ok(())
}
