//! Build profiles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A build variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Optimized build, output under `release/`.
    Release,
    /// Debug build, output under `debug/`.
    Dev,
}

impl Profile {
    /// Directory name cargo uses for this profile.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Profile::Release => "release",
            Profile::Dev => "debug",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Release => write!(f, "release"),
            Profile::Dev => write!(f, "dev"),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "release" => Ok(Profile::Release),
            "dev" | "debug" => Ok(Profile::Dev),
            _ => Err(format!(
                "invalid build mode '{}'; expected 'dev' or 'release'",
                s
            )),
        }
    }
}
