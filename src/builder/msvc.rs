//! Prebuilt MSVC dependencies fetched by `mach bootstrap`.

use std::path::{Path, PathBuf};

/// A package from the MSVC dependency bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsvcPackage {
    Cmake,
    Llvm,
    Moztools,
    Ninja,
    Openssl,
}

impl MsvcPackage {
    /// Directory name of the package.
    pub fn name(&self) -> &'static str {
        match self {
            MsvcPackage::Cmake => "cmake",
            MsvcPackage::Llvm => "llvm",
            MsvcPackage::Moztools => "moztools",
            MsvcPackage::Ninja => "ninja",
            MsvcPackage::Openssl => "openssl",
        }
    }

    /// Pinned version; also the name of the version subdirectory.
    pub fn version(&self) -> &'static str {
        match self {
            MsvcPackage::Cmake => "3.7.2",
            MsvcPackage::Llvm => "4.0.0",
            MsvcPackage::Moztools => "0.0.1-5",
            MsvcPackage::Ninja => "1.7.1",
            MsvcPackage::Openssl => "1.1.0e-vs2015",
        }
    }
}

/// Layout of `<cache-dir>/msvc-dependencies`.
#[derive(Debug, Clone)]
pub struct MsvcDeps {
    root: PathBuf,
}

impl MsvcDeps {
    pub fn new(cache_dir: &Path) -> Self {
        MsvcDeps {
            root: cache_dir.join("msvc-dependencies"),
        }
    }

    /// `<root>/<package>/<version>`
    pub fn package_dir(&self, package: MsvcPackage) -> PathBuf {
        self.root.join(package.name()).join(package.version())
    }

    /// Tool directories to put on PATH, in order.
    pub fn tool_dirs(&self) -> Vec<PathBuf> {
        [MsvcPackage::Cmake, MsvcPackage::Llvm, MsvcPackage::Ninja]
            .into_iter()
            .map(|p| self.package_dir(p).join("bin"))
            .collect()
    }
}
