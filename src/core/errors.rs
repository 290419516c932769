//! Error types surfaced to `mach` users.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::profile::Profile;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Errors produced by the build helpers.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum MachError {
    /// No built binary exists for any profile.
    #[error("No Servo binary found. Perhaps you forgot to run `./mach build`?")]
    #[diagnostic(code(mach::locate::not_found), help("Run `./mach build` first"))]
    BuildNotFound { searched: Vec<PathBuf> },

    /// Both profiles are built and the caller expressed no preference.
    #[error("You have multiple profiles built. Please specify which one to run with '--release' or '--dev'.")]
    #[diagnostic(code(mach::locate::ambiguous))]
    AmbiguousProfile { release: PathBuf, dev: PathBuf },

    /// Filesystem or archive failure.
    #[error("I/O error at {}: {source}", path.display())]
    #[diagnostic(code(mach::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A required external tool is missing or too old.
    #[error("{message}")]
    #[diagnostic(code(mach::toolchain))]
    Toolchain {
        message: String,
        #[help]
        hint: Option<String>,
    },

    /// The project config file is malformed.
    #[error("invalid config {}: {message}", path.display())]
    #[diagnostic(code(mach::config))]
    Config { path: PathBuf, message: String },
}

impl MachError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MachError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn toolchain(message: impl Into<String>, hint: Option<&str>) -> Self {
        MachError::Toolchain {
            message: message.into(),
            hint: hint.map(str::to_string),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            MachError::BuildNotFound { searched } => {
                let mut diag = Diagnostic::error("no Servo binary found");
                for path in searched {
                    diag = diag.with_context(format!("looked for {}", path.display()));
                }
                diag.with_suggestion(suggestions::NOT_BUILT)
            }

            MachError::AmbiguousProfile { release, dev } => {
                Diagnostic::error("multiple profiles are built")
                    .with_context(format!("{} built at {}", Profile::Release, release.display()))
                    .with_context(format!("{} built at {}", Profile::Dev, dev.display()))
                    .with_suggestion(suggestions::PICK_PROFILE)
            }

            MachError::Io { path, source } => {
                Diagnostic::error(source.to_string()).with_location(path.clone())
            }

            MachError::Toolchain { message, hint } => {
                let diag = Diagnostic::error(message.clone());
                match hint {
                    Some(hint) => diag.with_suggestion(hint.clone()),
                    None => diag,
                }
            }

            MachError::Config { path, message } => Diagnostic::error(message.clone())
                .with_location(path.clone())
                .with_suggestion(suggestions::CHECK_CONFIG),
        }
    }
}
