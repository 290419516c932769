//! Shared utilities

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod fs;
pub mod hash;
pub mod process;

pub use config::MachConfig;
pub use context::MachContext;
pub use diagnostic::Diagnostic;
