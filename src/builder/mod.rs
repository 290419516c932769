//! Build environment.
//!
//! Composes the environment cargo and Servo run with, and drives the
//! toolchain through rustup.

pub mod env;
pub mod git;
pub mod msvc;
pub mod osmesa;
pub mod probe;
pub mod rustup;

pub use env::{build_env, EnvOptions, Environment};
pub use probe::{HostProbe, SystemProbe};
