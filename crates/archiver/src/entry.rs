use std::{
    fmt,
    fs::{self, File, FileType, Metadata},
    io::{self, Read, Write},
    path::{Component, Path, PathBuf, StripPrefixError},
};

use tar::{EntryType, Header, HeaderMode};
use tracing::debug;

use crate::{
    error::ArchiverError,
    patterns::IgnorePatterns,
    seen::{Claim, SeenNames},
};

/// Name of the pseudo-entry that represents the base directory itself.
pub(crate) const ROOT: &str = ".";

/// Supported archive entry kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EntryKind {
    /// Regular file.
    File,

    /// Directory.
    Directory,

    /// Symbolic link, stored with its literal target.
    Symlink,
}

impl EntryKind {
    /// Map non-followed file type onto an entry kind.
    ///
    /// Returns [`None`] for sockets, FIFOs, devices and other special files.
    pub(crate) fn from_file_type(file_type: FileType) -> Option<Self> {
        if file_type.is_symlink() {
            Some(EntryKind::Symlink)
        } else if file_type.is_dir() {
            Some(EntryKind::Directory)
        } else if file_type.is_file() {
            Some(EntryKind::File)
        } else {
            None
        }
    }

    /// Tar header entry type.
    fn entry_type(self) -> EntryType {
        match self {
            EntryKind::File => EntryType::Regular,
            EntryKind::Directory => EntryType::Directory,
            EntryKind::Symlink => EntryType::Symlink,
        }
    }
}

/// A single unit written to the archive.
#[derive(Debug)]
pub(crate) struct ArchiveEntry {
    /// Entry path inside of the archive, separated by forward slashes.
    pub name: String,

    /// Entry kind.
    pub kind: EntryKind,

    /// Literal symbolic link target.
    pub link_target: Option<PathBuf>,

    /// Amount of bytes to copy, zero for anything but regular files.
    pub size: u64,

    /// Filesystem path of the entry.
    pub source_path: PathBuf,
}

/// Decides which filesystem entries end up in the archive and writes them.
pub(crate) struct EntryWriter<'a, W: Write> {
    /// Underlying tar archive builder.
    builder: tar::Builder<W>,

    /// Patterns used to exclude entries.
    patterns: IgnorePatterns,

    /// Names of already written entries.
    seen: SeenNames,

    /// Destination for warnings.
    diagnostics: Box<dyn Write + 'a>,

    /// Store every entry by its base name, skipping directories.
    files_only: bool,
}

impl<'a, W: Write> EntryWriter<'a, W> {
    /// Create new entry writer over the provided stream.
    pub(crate) fn new(
        dst: W,
        patterns: IgnorePatterns,
        diagnostics: Box<dyn Write + 'a>,
        files_only: bool,
    ) -> Self {
        Self {
            builder: tar::Builder::new(dst),
            patterns,
            seen: SeenNames::default(),
            diagnostics,
            files_only,
        }
    }

    /// Write a single line into diagnostics output.
    ///
    /// Diagnostics are best-effort, write errors are discarded.
    pub(crate) fn report(&mut self, message: fmt::Arguments<'_>) {
        let _ = writeln!(self.diagnostics, "{message}");
    }

    /// Inspect the entry at `source` and write it, if it passes every filter.
    ///
    /// Archive names are computed relative to `base`. Returns the amount of
    /// written entries, which is either zero or one.
    pub(crate) fn add_path(
        &mut self,
        source: &Path,
        base: &Path,
        metadata: &Metadata,
    ) -> Result<usize, ArchiverError> {
        match self.accept(source, base, metadata, false)? {
            Some(entry) => self.write(&entry, metadata).map(|()| 1),
            None => Ok(0),
        }
    }

    /// Write a file passed directly, preceded by its parent directories below `base`.
    ///
    /// Parents are written outermost first, and only if the file itself passes
    /// every filter, so that `sub/file.txt` is preceded by `sub`.
    pub(crate) fn add_file(
        &mut self,
        source: &Path,
        base: &Path,
        metadata: &Metadata,
    ) -> Result<usize, ArchiverError> {
        let Some(entry) = self.accept(source, base, metadata, false)? else {
            return Ok(0);
        };

        let added = self.add_parents(source, base)?;

        self.write(&entry, metadata)?;

        Ok(added + 1)
    }

    /// Run every filter over the entry at `source` and claim its archive name.
    ///
    /// Returns [`None`] if the entry must not be written. Implied parent
    /// directories that were already archived are skipped without a warning.
    fn accept(
        &mut self,
        source: &Path,
        base: &Path,
        metadata: &Metadata,
        implied: bool,
    ) -> Result<Option<ArchiveEntry>, ArchiverError> {
        let Some(path) = relative_name(base, source)? else {
            self.report(format_args!(
                "File {} contains non-unicode symbols in path",
                source.display()
            ));
            return Ok(None);
        };

        let Some(kind) = EntryKind::from_file_type(metadata.file_type()) else {
            self.report(format_args!(
                "WARNING: Skipping file \"{path}\" due to unsupported file type."
            ));
            return Ok(None);
        };

        if kind == EntryKind::Directory && self.files_only {
            return Ok(None);
        }

        if path != ROOT && self.patterns.is_ignored(&path, kind == EntryKind::Directory) {
            self.report(format_args!(
                "File \"{path}\" matches with some pattern provided in the ignore file... skipping it."
            ));
            return Ok(None);
        }

        let name = if self.files_only {
            String::from(base_name(&path))
        } else {
            path.clone()
        };

        if let Claim::Taken(original) = self.seen.accept(&name, kind, source) {
            if !(implied && original.kind == EntryKind::Directory) {
                debug!(
                    name = %name,
                    original = %original.source.display(),
                    duplicate = %source.display(),
                    "skipping duplicate entry"
                );
                self.report(format_args!(
                    "Skipping file \"{path}\" as it already exists in the current directory."
                ));
            }
            return Ok(None);
        }

        if name == ROOT {
            return Ok(None);
        }

        let link_target = match kind {
            EntryKind::Symlink => Some(fs::read_link(source)?),
            _ => None,
        };

        Ok(Some(ArchiveEntry {
            name,
            kind,
            link_target,
            size: if kind == EntryKind::File {
                metadata.len()
            } else {
                0
            },
            source_path: source.to_path_buf(),
        }))
    }

    /// Write directory entries for every parent of `source` below `base`, outermost first.
    ///
    /// Parents are subject to the same filters as any other entry.
    fn add_parents(&mut self, source: &Path, base: &Path) -> Result<usize, ArchiverError> {
        if self.files_only {
            return Ok(0);
        }

        let mut parents = source
            .ancestors()
            .skip(1)
            .take_while(|parent| *parent != base && parent.starts_with(base))
            .collect::<Vec<_>>();
        parents.reverse();

        let mut added = 0;

        for parent in parents {
            let metadata = fs::symlink_metadata(parent)?;

            if !metadata.is_dir() {
                continue;
            }

            if let Some(entry) = self.accept(parent, base, &metadata, true)? {
                self.write(&entry, &metadata)?;
                added += 1;
            }
        }

        Ok(added)
    }

    /// Finish the tar stream, returning the wrapped writer.
    pub(crate) fn finish(self) -> io::Result<W> {
        self.builder.into_inner()
    }

    /// Write entry header along with its data.
    fn write(&mut self, entry: &ArchiveEntry, metadata: &Metadata) -> Result<(), ArchiverError> {
        let mut header = Header::new_gnu();
        header.set_metadata_in_mode(metadata, HeaderMode::Complete);
        header.set_entry_type(entry.kind.entry_type());
        header.set_size(entry.size);

        match (entry.kind, &entry.link_target) {
            (EntryKind::Symlink, Some(target)) => {
                self.builder.append_link(&mut header, &entry.name, target)?
            }
            (EntryKind::File, _) => {
                let file = File::open(&entry.source_path)?;
                let mut reader = CountingReader::new(file.take(entry.size));

                self.builder.append_data(&mut header, &entry.name, &mut reader)?;

                if reader.count != entry.size {
                    return Err(ArchiverError::ShortWrite {
                        path: entry.source_path.clone(),
                        expected: entry.size,
                        written: reader.count,
                    });
                }
            }
            _ => self.builder.append_data(&mut header, &entry.name, io::empty())?,
        }

        debug!(name = %entry.name, kind = ?entry.kind, size = entry.size, "archived");

        Ok(())
    }
}

/// Reader wrapper that counts the amount of bytes read.
struct CountingReader<R> {
    /// Wrapped reader.
    inner: R,

    /// Total bytes read so far.
    count: u64,
}

impl<R> CountingReader<R> {
    /// Wrap the provided reader.
    fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.count += read as u64;
        Ok(read)
    }
}

/// Compute a forward-slash separated name of `path` relative to `base`.
///
/// Returns [`ROOT`] if both paths are equal and [`None`] if path contains
/// non-unicode components.
pub(crate) fn relative_name(
    base: &Path,
    path: &Path,
) -> Result<Option<String>, StripPrefixError> {
    let mut parts = Vec::new();

    for component in path.strip_prefix(base)?.components() {
        if let Component::Normal(part) = component {
            let Some(part) = part.to_str() else {
                return Ok(None);
            };

            parts.push(part);
        }
    }

    if parts.is_empty() {
        Ok(Some(String::from(ROOT)))
    } else {
        Ok(Some(parts.join("/")))
    }
}

/// Last component of a forward-slash separated name.
fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
