//! High-level operations.
//!
//! This module contains the implementation behind the `mach` commands.

pub mod archive;
pub mod clobber;
pub mod locate;

pub use archive::archive_deterministically;
pub use clobber::{ensure_clobbered, ClobberStatus};
pub use locate::{binary_path, locate_binary};
