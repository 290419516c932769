//! Core data structures for mach.
//!
//! Build profiles, target triples, the Android target table and the error
//! type shared by every operation.

pub mod android;
pub mod errors;
pub mod profile;
pub mod triple;

pub use android::AndroidTarget;
pub use errors::MachError;
pub use profile::Profile;
pub use triple::TargetTriple;
