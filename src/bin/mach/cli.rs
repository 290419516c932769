//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// mach - build and packaging helpers for the Servo browser engine
#[derive(Parser)]
#[command(name = "mach")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Top directory of the Servo checkout (defaults to the nearest
    /// directory containing `rust-toolchain`)
    #[arg(long, global = true, value_name = "DIR")]
    pub topdir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the environment cargo would be run with
    Env(EnvArgs),

    /// Print the path of the built Servo binary
    Locate(LocateArgs),

    /// Run the built Servo binary
    Run(RunArgs),

    /// Create a reproducible .tar.gz of a directory
    Package(PackageArgs),

    /// Check the CLOBBER stamp and clean the target directory if needed
    Clobber(ClobberArgs),

    /// Run a command with the pinned rust toolchain
    Rustup(RustupArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),

    /// Show host and toolchain information
    Toolchain(ToolchainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct EnvArgs {
    /// Cross-compilation target triple
    #[arg(long)]
    pub target: Option<String>,

    /// Compose the environment for a build (adds the git stamp)
    #[arg(long)]
    pub build: bool,

    /// Compose the environment for unit tests
    #[arg(long)]
    pub test_unit: bool,

    /// Hosts file exported as HOST_FILE
    #[arg(long, value_name = "FILE")]
    pub hosts_file: Option<PathBuf>,

    /// Print as JSON instead of KEY=VALUE lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ProfileArgs {
    /// Use the release build
    #[arg(short, long)]
    pub release: bool,

    /// Use the dev build
    #[arg(short, long)]
    pub dev: bool,
}

#[derive(Args)]
pub struct LocateArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Look for the Android build
    #[arg(long)]
    pub android: bool,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Render with OSMesa instead of the system GL
    #[arg(long)]
    pub software: bool,

    /// Arguments passed to servo
    #[arg(last = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct PackageArgs {
    /// Directory to archive
    pub dir: PathBuf,

    /// Destination .tar.gz
    pub dest: PathBuf,

    /// Store every entry under this path
    #[arg(long, value_name = "PATH")]
    pub prepend_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct ClobberArgs {
    /// Only report, never remove the target directory
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct RustupArgs {
    /// Command and arguments, e.g. `cargo build`
    #[arg(last = true, required = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ToolchainArgs {}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
