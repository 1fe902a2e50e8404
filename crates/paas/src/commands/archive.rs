use std::{
    fs, io,
    path::{Path, PathBuf},
};

use archiver::{build_archive, ArchiveOptions, ArchiverError, DEFAULT_IGNORE_FILE};
use byte_unit::Byte;
use derive_more::{Display, Error, From};
use tempfile::NamedTempFile;

use crate::commands::Archive;

/// `archive` subcommand errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum ArchiveError {
    /// IO-related error.
    Io(io::Error),

    /// Archive could not be created.
    #[display(fmt = "unable to create archive: {}", _0)]
    Archiver(ArchiverError),
}

/// Local archive flow entrypoint.
pub(crate) fn archive(args: Archive) -> Result<(), ArchiveError> {
    archive_in(args, None)
}

/// Build the archive from paths inside `working_dir` and copy it to the output path.
///
/// The archive is assembled in a temporary file first, so that an output
/// located inside of an archived directory never ends up in its own archive.
fn archive_in(
    Archive {
        output,
        files_only,
        ignore_file,
        paths,
    }: Archive,
    working_dir: Option<&Path>,
) -> Result<(), ArchiveError> {
    let ignore_files = if ignore_file.is_empty() {
        vec![PathBuf::from(DEFAULT_IGNORE_FILE)]
    } else {
        ignore_file
    };

    let options = ArchiveOptions {
        ignore_files,
        diagnostics: Box::new(io::stderr()),
        working_dir: working_dir.map(Path::to_path_buf),
        ..Default::default()
    };

    let archive_file = build_archive(NamedTempFile::new()?, files_only, &paths, options)?;

    // Temporary directory may reside on a different filesystem.
    let size = fs::copy(archive_file.path(), &output)?;

    println!(
        "Archive written to {} ({}).",
        output.display(),
        Byte::from_bytes(size.into()).get_appropriate_unit(false)
    );

    Ok(())
}
