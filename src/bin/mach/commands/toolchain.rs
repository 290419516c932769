//! `mach toolchain` command

use anyhow::Result;

use crate::cli::ToolchainArgs;
use servo_mach::builder::rustup::installed_rustup_version;
use servo_mach::util::process::find_executable;
use servo_mach::{MachContext, TargetTriple};

pub fn execute(_args: ToolchainArgs, ctx: &MachContext) -> Result<()> {
    let config = ctx.config();

    println!("Toolchain:");
    println!();

    match ctx.toolchain() {
        Ok(toolchain) => println!("  Rust:   {}", toolchain),
        Err(_) => println!("  Rust:   no rust-toolchain file"),
    }

    if config.tools.use_rustup {
        match installed_rustup_version() {
            Ok(version) => println!("  Rustup: {}", version),
            Err(e) => println!("  Rustup: {}", e),
        }
    } else {
        println!("  Rustup: disabled (tools.use-rustup = false)");
    }

    match find_executable("ld.gold") {
        Some(gold) if config.tools.rustc_with_gold => println!("  Gold:   {}", gold.display()),
        Some(_) => println!("  Gold:   found, disabled by config"),
        None => println!("  Gold:   not found"),
    }

    println!();

    // Target
    let target = TargetTriple::host();
    println!("  Host:   {}", target);
    println!("    Arch: {}", target.arch);
    println!("    OS:   {}", target.os);
    if let Some(ref env) = target.env {
        println!("    Env:  {}", env);
    }

    println!();
    println!("Paths:");
    println!("  Top directory: {}", ctx.topdir().display());
    println!("  Target:        {}", ctx.target_dir().display());
    println!("  Cargo home:    {}", config.tools.cargo_home_dir.display());
    println!("  Cache:         {}", config.tools.cache_dir.display());

    let features = config.servo_features();
    if !features.is_empty() {
        println!();
        println!("Features: {}", features.join(", "));
    }

    Ok(())
}
