//! mach - build and packaging helpers for Servo

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use servo_mach::util::diagnostic::emit;
use servo_mach::{MachContext, MachError};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        match e.downcast_ref::<MachError>() {
            Some(mach_err) => emit(&mach_err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("servo_mach=debug,mach=debug")
    } else {
        EnvFilter::new("servo_mach=info,mach=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let topdir = cli.topdir;
    let context = || MachContext::new(topdir.clone());

    match cli.command {
        Commands::Env(args) => commands::env::execute(args, &context()?),
        Commands::Locate(args) => commands::locate::execute(args, &context()?),
        Commands::Run(args) => commands::run::execute(args, &context()?),
        Commands::Package(args) => commands::package::execute(args),
        Commands::Clobber(args) => commands::clobber::execute(args, &context()?),
        Commands::Rustup(args) => commands::rustup::execute(args, &context()?),
        Commands::Config(args) => commands::config::execute(args, &context()?),
        Commands::Toolchain(args) => commands::toolchain::execute(args, &context()?),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
