//! # Deployment archiver
//!
//! Application source code is uploaded to the platform as a gzip-compressed tar archive.
//!
//! The archive is assembled from a list of user-provided paths. Every path must reside
//! inside of the working directory, paths pointing elsewhere are skipped with a warning.
//! Files are stored under their path relative to the working directory, directories are
//! traversed recursively in a lexical order. When a single directory is passed, its
//! contents are placed at the archive root instead.
//!
//! Before anything gets written, each entry is checked against:
//!
//! * supported file types (regular files, directories and symlinks),
//! * gitignore-style patterns read from ignore files (see [`ArchiveOptions::ignore_files`]),
//! * names of entries written before, so that the first path passed wins.
//!
//! Skipped entries are reported through [`ArchiveOptions::diagnostics`].
//!
//! In "files only" mode directories are never written and every file is stored
//! by its base name.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

/// Single entry inspection and writing.
mod entry;

/// Archiver errors.
mod error;

/// Archive creation options.
mod options;

/// Ignore file patterns.
mod patterns;

/// Input path containment checks.
mod safety;

/// Names of already archived entries.
mod seen;

/// Directory tree traversal.
mod walker;

#[cfg(test)]
mod testing;

use std::{
    env,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use flate2::write::GzEncoder;
use normalize_path::NormalizePath;
use tracing::{debug, info};

pub use error::ArchiverError;
pub use options::{ArchiveOptions, DEFAULT_IGNORE_FILE};

use entry::EntryWriter;
use patterns::IgnorePatterns;

/// Archive the provided `paths` into `dst` as a gzip-compressed tar stream.
///
/// Paths are processed in order, and the first path that produces some archive name
/// takes it, all following paths with the same name are skipped. Relative paths are
/// resolved against [`ArchiveOptions::working_dir`].
///
/// On success the writer passed as `dst` is returned back. If nothing was archived,
/// [`ArchiverError::MissingFilesToArchive`] is returned after both tar and gzip streams
/// are finished; bytes already written into `dst` should be discarded in that case.
pub fn build_archive<W, P>(
    dst: W,
    files_only: bool,
    paths: &[P],
    options: ArchiveOptions<'_>,
) -> Result<W, ArchiverError>
where
    W: Write,
    P: AsRef<Path>,
{
    if paths.is_empty() {
        return Err(ArchiverError::EmptyPaths);
    }

    let ArchiveOptions {
        compression,
        ignore_files,
        mut diagnostics,
        working_dir,
    } = options;

    let working_dir = resolve_working_dir(working_dir)?;

    let patterns = IgnorePatterns::load(&working_dir, &ignore_files, &mut *diagnostics)?;

    let mut writer = EntryWriter::new(
        GzEncoder::new(dst, compression),
        patterns,
        diagnostics,
        files_only,
    );

    let added = archive_paths(&mut writer, &working_dir, paths)?;

    let dst = writer.finish()?.finish()?;

    info!(entries = added, "archive created");

    if added == 0 {
        return Err(ArchiverError::MissingFilesToArchive);
    }

    Ok(dst)
}

/// Feed every path into `writer`, returning the total amount of written entries.
fn archive_paths<W, P>(
    writer: &mut EntryWriter<'_, W>,
    working_dir: &Path,
    paths: &[P],
) -> Result<usize, ArchiverError>
where
    W: Write,
    P: AsRef<Path>,
{
    let mut added = 0;

    for path in paths {
        let path = path.as_ref();

        let Some(absolute) = safety::resolve_within(working_dir, path) else {
            writer.report(format_args!(
                "WARNING: skipping file \"{}\" since you cannot add files outside the current directory",
                path.display()
            ));
            continue;
        };

        let metadata = fs::symlink_metadata(&absolute)?;

        if metadata.is_dir() {
            // A single directory is considered to be the archive root.
            let base = if paths.len() == 1 {
                absolute.as_path()
            } else {
                working_dir
            };

            debug!(path = %absolute.display(), base = %base.display(), "archiving directory");

            added += walker::walk(&absolute, |source, metadata| {
                writer.add_path(source, base, metadata)
            })?;
        } else {
            added += writer.add_file(&absolute, working_dir, &metadata)?;
        }
    }

    Ok(added)
}

/// Turn the configured working directory into a normalized absolute path,
/// falling back to the process current directory.
fn resolve_working_dir(working_dir: Option<PathBuf>) -> Result<PathBuf, ArchiverError> {
    let working_dir = match working_dir {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => env::current_dir()
            .map_err(ArchiverError::WorkingDir)?
            .join(dir),
        None => env::current_dir().map_err(ArchiverError::WorkingDir)?,
    };

    Ok(working_dir.normalize())
}
