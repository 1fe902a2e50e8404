use std::{
    io,
    path::{PathBuf, StripPrefixError},
};

use derive_more::{Display, Error, From};

/// Errors that may occur during the archive creation process.
#[derive(Debug, Display, From, Error)]
pub enum ArchiverError {
    /// No paths were passed to the archiver.
    #[display(fmt = "paths cannot be empty")]
    EmptyPaths,

    /// Unable to determine the working directory.
    #[display(fmt = "failed to get the current directory: {}", _0)]
    #[from(ignore)]
    WorkingDir(io::Error),

    /// One of the ignore files exists but cannot be read.
    #[display(fmt = "failed to read ignore file \"{}\": {}", "file.display()", source)]
    #[from(ignore)]
    IgnoreFile {
        /// Ignore file path, as it was passed in options.
        file: PathBuf,

        /// Underlying IO error.
        source: io::Error,
    },

    /// [`ignore`]-crate specific error, returned for malformed patterns.
    #[display(fmt = "failed to compile all ignore patterns: {}", _0)]
    IgnorePatterns(ignore::Error),

    /// IO error.
    Io(io::Error),

    /// [`walkdir`]-crate specific error.
    WalkDir(walkdir::Error),

    /// Unable to strip the base directory prefix from path.
    StripPrefix(StripPrefixError),

    /// Fewer bytes than announced in the entry header were copied into the archive.
    #[display(
        fmt = "short write while archiving \"{}\": expected {} bytes, copied {}",
        "path.display()",
        expected,
        written
    )]
    #[from(ignore)]
    ShortWrite {
        /// Source file path.
        path: PathBuf,

        /// File size at the moment of inspection.
        expected: u64,

        /// Amount of bytes actually copied.
        written: u64,
    },

    /// Every passed path was either skipped or resulted in no entries.
    ///
    /// Archive output should be discarded when this error is returned.
    #[display(fmt = "missing files to archive")]
    MissingFilesToArchive,
}
