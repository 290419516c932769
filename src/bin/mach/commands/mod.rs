//! Command implementations

pub mod clobber;
pub mod completions;
pub mod config;
pub mod env;
pub mod locate;
pub mod package;
pub mod run;
pub mod rustup;
pub mod toolchain;
