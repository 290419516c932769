//! Reproducible `.tar.gz` packaging.
//!
//! Output bytes depend only on the names, contents, modes and link targets
//! of the archived files:
//!
//! - entries are added one by one in byte-wise path order (no locale, no
//!   filesystem iteration order)
//! - owner is `root` (0:0) and every mtime is 0, including the gzip header
//! - the archive is written to a temp file next to the destination and
//!   renamed into place only once the gzip stream is complete
//!
//! See <https://reproducible-builds.org/docs/archives/>.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use flate2::{Compression, GzBuilder};
use tar::{EntryType, Header, HeaderMode};
use walkdir::WalkDir;

use crate::core::errors::MachError;

/// One path to archive, relative to the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ArchiveEntry {
    /// Relative path; empty for the root itself.
    rel: PathBuf,
    /// `/`-joined path bytes, the sort key.
    key: Vec<u8>,
}

/// Package `dir_to_archive` into `dest_archive` deterministically.
///
/// With `prepend_path`, every entry is stored under that prefix and the
/// root directory entry is the prefix itself.
pub fn archive_deterministically(
    dir_to_archive: &Path,
    dest_archive: &Path,
    prepend_path: Option<&Path>,
) -> Result<(), MachError> {
    let entries = collect_entries(dir_to_archive)?;
    tracing::debug!(
        "archiving {} entries from {}",
        entries.len(),
        dir_to_archive.display()
    );

    write_archive(dir_to_archive, &entries, dest_archive, prepend_path)?;

    tracing::info!("packaged {}", dest_archive.display());
    Ok(())
}

/// Stream `entries` into a temp file next to `dest_archive`, then rename
/// it into place. The temp file is removed on any error.
fn write_archive(
    root: &Path,
    entries: &[ArchiveEntry],
    dest_archive: &Path,
    prepend_path: Option<&Path>,
) -> Result<(), MachError> {
    let file_name = dest_archive.file_name().ok_or_else(|| {
        MachError::io(
            dest_archive,
            io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name"),
        )
    })?;
    let dest_dir = match dest_archive.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    // Dropped (and deleted) on any early return below.
    let mut temp = tempfile::Builder::new()
        .prefix(&format!("{}.", file_name.to_string_lossy()))
        .suffix(".temp~")
        .tempfile_in(dest_dir)
        .map_err(|e| MachError::io(dest_dir, e))?;
    let temp_path = temp.path().to_path_buf();

    {
        let out = BufWriter::new(temp.as_file_mut());
        let gz = GzBuilder::new()
            .mtime(0)
            .operating_system(255)
            .write(out, Compression::best());
        let mut builder = tar::Builder::new(gz);

        for entry in entries {
            append_entry(&mut builder, root, entry, prepend_path)?;
        }

        let gz = builder
            .into_inner()
            .map_err(|e| MachError::io(&temp_path, e))?;
        let mut out = gz.finish().map_err(|e| MachError::io(&temp_path, e))?;
        out.flush().map_err(|e| MachError::io(&temp_path, e))?;
    }

    temp.as_file()
        .sync_all()
        .map_err(|e| MachError::io(&temp_path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o644))
            .map_err(|e| MachError::io(&temp_path, e))?;
    }

    temp.persist(dest_archive)
        .map_err(|e| MachError::io(dest_archive, e.error))?;
    Ok(())
}

/// All paths under `root` (root first), sorted byte-wise.
fn collect_entries(root: &Path) -> Result<Vec<ArchiveEntry>, MachError> {
    let meta = fs::metadata(root).map_err(|e| MachError::io(root, e))?;
    if !meta.is_dir() {
        return Err(MachError::io(
            root,
            io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }

    let mut entries = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop"));
            MachError::io(path, source)
        })?;

        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        let key = sort_key(&rel);
        entries.push(ArchiveEntry { rel, key });
    }

    entries.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(entries)
}

/// Path bytes joined with `/` regardless of the host separator.
fn sort_key(rel: &Path) -> Vec<u8> {
    let mut key = Vec::new();
    for component in rel.components() {
        if let Component::Normal(part) = component {
            if !key.is_empty() {
                key.push(b'/');
            }
            key.extend_from_slice(part.as_encoded_bytes());
        }
    }
    key
}

/// Name stored in the archive for `rel`.
fn archive_name(rel: &Path, prepend_path: Option<&Path>) -> PathBuf {
    let name = match prepend_path {
        Some(prefix) => prefix.join(rel),
        None => rel.to_path_buf(),
    };

    let normalized: PathBuf = name
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

fn append_entry<W: Write>(
    builder: &mut tar::Builder<W>,
    root: &Path,
    entry: &ArchiveEntry,
    prepend_path: Option<&Path>,
) -> Result<(), MachError> {
    let full = root.join(&entry.rel);
    let name = archive_name(&entry.rel, prepend_path);
    let err = |e: io::Error| MachError::io(&full, e);

    let meta = fs::symlink_metadata(&full).map_err(err)?;
    let mut header = Header::new_gnu();
    header.set_metadata_in_mode(&meta, HeaderMode::Complete);
    header.set_uid(0);
    header.set_gid(0);
    header.set_username("root").map_err(err)?;
    header.set_groupname("root").map_err(err)?;
    header.set_mtime(0);

    let file_type = meta.file_type();
    if file_type.is_dir() {
        header.set_entry_type(EntryType::Directory);
        header.set_size(0);
        builder
            .append_data(&mut header, &name, io::empty())
            .map_err(err)
    } else if file_type.is_symlink() {
        let target = fs::read_link(&full).map_err(err)?;
        header.set_size(0);
        builder
            .append_link(&mut header, &name, &target)
            .map_err(err)
    } else if file_type.is_file() {
        let file = File::open(&full).map_err(err)?;
        builder.append_data(&mut header, &name, file).map_err(err)
    } else {
        tracing::warn!("skipping special file {}", full.display());
        Ok(())
    }
}
