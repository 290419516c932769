//! Software rendering support.
//!
//! Headless runs use the OSMesa build produced by the `osmesa-src` crate.
//! Its output lives in cargo's `build/` directory next to the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::env::Environment;
use crate::core::triple::TargetTriple;

/// Newest `<bin dir>/build/<package>-*` directory that has an `output`
/// file, judged by that file's modification time.
pub fn find_dep_path_newest(package: &str, bin_path: &Path) -> Result<Option<PathBuf>> {
    let deps_path = match bin_path.parent() {
        Some(dir) => dir.join("build"),
        None => return Ok(None),
    };

    let pattern = format!(
        "{}/{}-*",
        glob::Pattern::escape(&deps_path.to_string_lossy()),
        glob::Pattern::escape(package)
    );

    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    for candidate in glob::glob(&pattern)
        .with_context(|| format!("invalid dependency pattern: {}", pattern))?
    {
        let candidate = match candidate {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("glob error: {}", e);
                continue;
            }
        };

        let output = candidate.join("output");
        let Ok(modified) = output.metadata().and_then(|m| m.modified()) else {
            continue;
        };

        if newest.as_ref().map_or(true, |(best, _)| modified > *best) {
            newest = Some((modified, candidate));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

/// Point the GL loader at the OSMesa build for `bin_path`.
///
/// Returns `false` when no OSMesa build exists or the host has no
/// software rendering setup.
pub fn apply_osmesa_env(env: &mut Environment, bin_path: &Path, host: &TargetTriple) -> Result<bool> {
    if !host.is_linux() && !host.is_macos() {
        return Ok(false);
    }

    let Some(dep_path) = find_dep_path_newest("osmesa-src", bin_path)? else {
        return Ok(false);
    };

    let out = dep_path.join("out");
    if host.is_linux() {
        let osmesa_path = out.join("lib").join("gallium");
        env.set("LD_LIBRARY_PATH", osmesa_path.display().to_string());
    } else {
        let osmesa_path = out
            .join("src")
            .join("gallium")
            .join("targets")
            .join("osmesa")
            .join(".libs");
        let glapi_path = out.join("src").join("mapi").join("shared-glapi").join(".libs");
        env.set(
            "DYLD_LIBRARY_PATH",
            format!("{}:{}", osmesa_path.display(), glapi_path.display()),
        );
    }
    env.set("GALLIUM_DRIVER", "softpipe");

    Ok(true)
}
