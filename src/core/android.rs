//! Android cross-compilation targets.

use serde::Serialize;

/// Target used when the config does not name one.
pub const DEFAULT_ANDROID_TARGET: &str = "armv7-linux-androideabi";

/// NDK parameters for one supported Android target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AndroidTarget {
    /// Rust target triple
    pub target: &'static str,
    /// Android API platform (android-18, android-21)
    pub platform: &'static str,
    /// Prefix of the NDK toolchain binaries
    pub toolchain_prefix: &'static str,
    /// NDK architecture name
    pub arch: &'static str,
    /// ABI directory name under `libs/`
    pub lib: &'static str,
    /// NDK standalone toolchain directory name
    pub toolchain_name: &'static str,
}

const ANDROID_TARGETS: &[AndroidTarget] = &[
    AndroidTarget {
        target: "arm-linux-androideabi",
        platform: "android-18",
        toolchain_prefix: "arm-linux-androideabi",
        arch: "arm",
        lib: "armeabi",
        toolchain_name: "arm-linux-androideabi-4.9",
    },
    AndroidTarget {
        target: "armv7-linux-androideabi",
        platform: "android-18",
        toolchain_prefix: "arm-linux-androideabi",
        arch: "arm",
        lib: "armeabi-v7a",
        toolchain_name: "arm-linux-androideabi-4.9",
    },
    AndroidTarget {
        target: "aarch64-linux-android",
        platform: "android-21",
        toolchain_prefix: "aarch64-linux-android",
        arch: "arm64",
        lib: "arm64-v8a",
        toolchain_name: "aarch64-linux-android-4.9",
    },
    AndroidTarget {
        target: "i686-linux-android",
        platform: "android-18",
        toolchain_prefix: "x86",
        arch: "x86",
        lib: "x86",
        toolchain_name: "x86-4.9",
    },
];

impl AndroidTarget {
    /// Look up a supported Android target by its triple.
    pub fn from_triple(triple: &str) -> Option<&'static AndroidTarget> {
        ANDROID_TARGETS.iter().find(|t| t.target == triple)
    }

    /// The target used when none is configured.
    pub fn default_target() -> &'static AndroidTarget {
        &ANDROID_TARGETS[1]
    }

    /// All supported targets.
    pub fn all() -> &'static [AndroidTarget] {
        ANDROID_TARGETS
    }
}
