//! Target triple handling.
//!
//! The environment composer only needs a handful of questions answered
//! about a triple (is it MSVC, is it 64-bit x86, which OS family is the
//! host), so the representation stays string-based.

use std::fmt;

/// Target triple components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTriple {
    /// CPU architecture (x86_64, aarch64, armv7, ...)
    pub arch: String,
    /// Vendor (unknown, apple, pc, linux, ...)
    pub vendor: String,
    /// Operating system (linux, darwin, windows, android, ...)
    pub os: String,
    /// Environment/ABI (gnu, musl, msvc, androideabi, ...)
    pub env: Option<String>,
}

impl TargetTriple {
    /// Create a new target triple.
    pub fn new(arch: &str, vendor: &str, os: &str, env: Option<&str>) -> Self {
        TargetTriple {
            arch: arch.to_string(),
            vendor: vendor.to_string(),
            os: os.to_string(),
            env: env.map(|s| s.to_string()),
        }
    }

    /// Detect the host target triple.
    pub fn host() -> Self {
        let arch = std::env::consts::ARCH;

        match std::env::consts::OS {
            "linux" => TargetTriple::new(arch, "unknown", "linux", Some("gnu")),
            "macos" => TargetTriple::new(arch, "apple", "darwin", None),
            "windows" => TargetTriple::new(arch, "pc", "windows", Some("msvc")),
            "android" => TargetTriple::new(arch, "linux", "android", None),
            os => TargetTriple::new(arch, "unknown", os, None),
        }
    }

    /// Parse a target triple string.
    ///
    /// Android triples only have three components with the OS in the
    /// vendor slot (`armv7-linux-androideabi`); they still parse, the
    /// fields are just taken positionally.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() < 3 || parts.iter().any(|p| p.is_empty()) {
            return None;
        }

        Some(TargetTriple {
            arch: parts[0].to_string(),
            vendor: parts[1].to_string(),
            os: parts[2].to_string(),
            env: if parts.len() > 3 {
                Some(parts[3..].join("-"))
            } else {
                None
            },
        })
    }

    /// Whether this triple uses the MSVC toolchain.
    pub fn is_msvc(&self) -> bool {
        self.to_string().contains("msvc")
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    pub fn is_macos(&self) -> bool {
        self.os == "darwin"
    }

    pub fn is_linux(&self) -> bool {
        self.os == "linux"
    }

    /// Separator used in PATH-like variables on this platform.
    pub fn path_separator(&self) -> &'static str {
        if self.is_windows() {
            ";"
        } else {
            ":"
        }
    }

    /// Suffix appended to executables on this platform.
    pub fn exe_suffix(&self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else {
            ""
        }
    }
}

impl fmt::Display for TargetTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.env {
            Some(env) => write!(f, "{}-{}-{}-{}", self.arch, self.vendor, self.os, env),
            None => write!(f, "{}-{}-{}", self.arch, self.vendor, self.os),
        }
    }
}
