//! servo-mach - build and packaging helpers for the Servo browser engine
//!
//! This crate provides the library behind the `mach` binary: configuration
//! loading, build environment composition, binary lookup and reproducible
//! packaging.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for mach unit tests.
///
/// Only compiled for tests. Provides a fake host probe and helpers for
/// laying out throwaway checkouts.
#[cfg(test)]
pub mod test_support;

pub use builder::{build_env, EnvOptions, Environment};
pub use crate::core::{MachError, Profile, TargetTriple};
pub use ops::{archive_deterministically, locate_binary};
pub use util::context::MachContext;
