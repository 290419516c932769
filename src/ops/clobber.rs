//! `CLOBBER` stamp handling.
//!
//! Landing a change that needs a full rebuild touches `<topdir>/CLOBBER`.
//! Each target directory carries its own stamp; when the source stamp is
//! newer the target directory is stale.

use std::path::Path;

use anyhow::Result;

use crate::util::fs::{ensure_dir, mtime, touch};

pub const CLOBBER_FILE: &str = "CLOBBER";

/// Outcome of [`ensure_clobbered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClobberStatus {
    /// `AUTOCLOBBER` is not set; the stamps were not compared.
    Disabled,
    /// The source stamp is newer than the target's.
    Needed,
    NotNeeded,
}

/// Make sure `target_dir` and its stamp exist and report whether it must
/// be cleaned.
pub fn ensure_clobbered(topdir: &Path, target_dir: &Path, autoclobber: bool) -> Result<ClobberStatus> {
    ensure_dir(target_dir)?;

    let target_stamp = target_dir.join(CLOBBER_FILE);
    if !target_stamp.exists() {
        touch(&target_stamp)?;
    }

    if !autoclobber {
        return Ok(ClobberStatus::Disabled);
    }

    let source_stamp = topdir.join(CLOBBER_FILE);
    if !source_stamp.exists() {
        return Ok(ClobberStatus::NotNeeded);
    }

    if mtime(&source_stamp)? > mtime(&target_stamp)? {
        tracing::info!("{} is newer than {}", source_stamp.display(), target_stamp.display());
        Ok(ClobberStatus::Needed)
    } else {
        Ok(ClobberStatus::NotNeeded)
    }
}
