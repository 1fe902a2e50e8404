use std::{
    io::{self, Write},
    path::PathBuf,
};

use flate2::Compression;

/// Ignore file name consulted by the CLI commands.
pub const DEFAULT_IGNORE_FILE: &str = ".paasignore";

/// Archive creation options.
pub struct ArchiveOptions<'a> {
    /// Gzip compression level.
    pub compression: Compression,

    /// Files, patterns of which are used to exclude entries from the archive.
    ///
    /// Relative paths are resolved against the working directory.
    /// Missing files are skipped.
    pub ignore_files: Vec<PathBuf>,

    /// Destination for human-readable warnings and progress messages.
    pub diagnostics: Box<dyn Write + 'a>,

    /// Directory that all archived paths must reside in.
    ///
    /// Defaults to the current directory of the process.
    pub working_dir: Option<PathBuf>,
}

impl<'a> ArchiveOptions<'a> {
    /// Options used by the deployment commands: best compression,
    /// [`DEFAULT_IGNORE_FILE`] patterns and the provided diagnostics output.
    pub fn for_upload<W: Write + 'a>(diagnostics: W) -> Self {
        Self {
            ignore_files: vec![PathBuf::from(DEFAULT_IGNORE_FILE)],
            diagnostics: Box::new(diagnostics),
            ..Default::default()
        }
    }
}

impl Default for ArchiveOptions<'_> {
    fn default() -> Self {
        Self {
            compression: Compression::best(),
            ignore_files: Vec::new(),
            diagnostics: Box::new(io::sink()),
            working_dir: None,
        }
    }
}
