//! Finding the built Servo binary.

use std::path::{Path, PathBuf};

use crate::core::errors::MachError;
use crate::core::profile::Profile;

/// File name of the Servo binary on this host.
pub fn servo_binary_name() -> String {
    format!("servo{}", std::env::consts::EXE_SUFFIX)
}

/// Where `profile` puts the binary under `target_dir`.
pub fn binary_path(target_dir: &Path, android_target: Option<&str>, profile: Profile) -> PathBuf {
    let mut path = target_dir.to_path_buf();
    if let Some(target) = android_target {
        path.push(target);
    }
    path.push(profile.dir_name());
    path.push(servo_binary_name());
    path
}

/// Pick the binary to run.
///
/// Release wins when both flags are given. A single built profile is
/// returned whatever was asked for, so `--dev` on a release-only tree still
/// runs something.
pub fn locate_binary(
    target_dir: &Path,
    android_target: Option<&str>,
    release: bool,
    dev: bool,
) -> Result<PathBuf, MachError> {
    let release_path = binary_path(target_dir, android_target, Profile::Release);
    let dev_path = binary_path(target_dir, android_target, Profile::Dev);

    let release_exists = release_path.exists();
    let dev_exists = dev_path.exists();

    tracing::debug!(
        "release build {} ({}), dev build {} ({})",
        if release_exists { "found" } else { "missing" },
        release_path.display(),
        if dev_exists { "found" } else { "missing" },
        dev_path.display(),
    );

    match (release_exists, dev_exists) {
        (false, false) => Err(MachError::BuildNotFound {
            searched: vec![release_path, dev_path],
        }),
        (true, false) => {
            if dev && !release {
                tracing::warn!("no dev build found, using the release build");
            }
            Ok(release_path)
        }
        (false, true) => {
            if release {
                tracing::warn!("no release build found, using the dev build");
            }
            Ok(dev_path)
        }
        (true, true) => {
            if release {
                Ok(release_path)
            } else if dev {
                Ok(dev_path)
            } else {
                Err(MachError::AmbiguousProfile {
                    release: release_path,
                    dev: dev_path,
                })
            }
        }
    }
}
