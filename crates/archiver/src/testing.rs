use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};
use tempfile::TempDir;

use crate::ArchiveOptions;

/// Temporary directory tree used as archiver input.
pub(crate) struct Fixture {
    /// Temporary directory, removed on drop.
    dir: TempDir,

    /// Working directory passed to the archiver.
    working_dir: PathBuf,
}

impl Fixture {
    /// Two sibling project directories:
    ///
    /// ```text
    /// deploy/directory/file.txt
    /// deploy/file1.txt
    /// deploy/file2.txt
    /// deploy2/.paasignore
    /// deploy2/directory/dir2/file.txt
    /// deploy2/directory/file.txt
    /// deploy2/file1.txt
    /// ```
    ///
    /// Working directory is set to `deploy`.
    pub(crate) fn deploy() -> Self {
        let fixture = Self::new("deploy");

        fixture.file("deploy/directory/file.txt", "wat\n");
        fixture.file("deploy/file1.txt", "something happened\n");
        fixture.file("deploy/file2.txt", "twice\n");
        fixture.file("deploy2/.paasignore", "*.txt");
        fixture.file("deploy2/directory/dir2/file.txt", "dir2 file\n");
        fixture.file("deploy2/directory/file.txt", "other file\n");
        fixture.file("deploy2/file1.txt", "something happened\n");

        fixture
    }

    /// `a.txt` and `sub/b.txt`, with the working directory at the root.
    pub(crate) fn scenario() -> Self {
        let fixture = Self::new("");

        fixture.file("a.txt", "a");
        fixture.file("sub/b.txt", "b");

        fixture
    }

    /// `link -> test` symlink next to the `test/index.html` file.
    #[cfg(unix)]
    pub(crate) fn symlink() -> Self {
        let fixture = Self::new("");

        fixture.file("test/index.html", "");
        std::os::unix::fs::symlink("test", fixture.root().join("link"))
            .expect("unable to create symlink");

        fixture
    }

    /// Temporary directory root.
    pub(crate) fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Working directory used by [`Fixture::options`].
    pub(crate) fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Options with the fixture working directory and no ignore files.
    pub(crate) fn options<'a, W: Write + 'a>(&self, diagnostics: W) -> ArchiveOptions<'a> {
        ArchiveOptions {
            diagnostics: Box::new(diagnostics),
            working_dir: Some(self.working_dir.clone()),
            ..Default::default()
        }
    }

    /// Options with the temporary directory root as the working directory.
    pub(crate) fn parent_options<'a, W: Write + 'a>(&self, diagnostics: W) -> ArchiveOptions<'a> {
        ArchiveOptions {
            diagnostics: Box::new(diagnostics),
            working_dir: Some(self.root().to_path_buf()),
            ..Default::default()
        }
    }

    /// Create an empty fixture with the working directory relative to its root.
    fn new(working_dir: &str) -> Self {
        let dir = tempfile::tempdir().expect("unable to create temporary directory");
        let working_dir = if working_dir.is_empty() {
            dir.path().to_path_buf()
        } else {
            dir.path().join(working_dir)
        };

        Self { dir, working_dir }
    }

    /// Write a file, creating its parent directories.
    fn file(&self, path: &str, contents: &str) {
        let path = self.root().join(path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("unable to create directory");
        }

        fs::write(path, contents).expect("unable to write file");
    }
}

/// Archive entry read back from a gzip-compressed tar stream.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Extracted {
    /// Entry path.
    pub name: String,

    /// Tar entry type.
    pub kind: EntryType,

    /// Symlink target, if any.
    pub link: Option<String>,

    /// Regular file contents.
    pub data: Vec<u8>,
}

impl Extracted {
    /// Expected regular file entry.
    pub(crate) fn file(name: &str, data: &str) -> Self {
        Self {
            name: String::from(name),
            kind: EntryType::Regular,
            link: None,
            data: data.as_bytes().to_vec(),
        }
    }

    /// Expected directory entry.
    pub(crate) fn dir(name: &str) -> Self {
        Self {
            name: String::from(name),
            kind: EntryType::Directory,
            link: None,
            data: Vec::new(),
        }
    }

    /// Expected symlink entry.
    pub(crate) fn symlink(name: &str, target: &str) -> Self {
        Self {
            name: String::from(name),
            kind: EntryType::Symlink,
            link: Some(String::from(target)),
            data: Vec::new(),
        }
    }
}

/// Read every entry of a gzip-compressed tar archive.
pub(crate) fn extract(archive: &[u8]) -> Vec<Extracted> {
    let mut archive = Archive::new(GzDecoder::new(archive));

    archive
        .entries()
        .expect("unable to read archive")
        .map(|entry| {
            let mut entry = entry.expect("unable to read entry");

            let name = entry
                .path()
                .expect("invalid entry path")
                .to_string_lossy()
                .into_owned();
            let kind = entry.header().entry_type();
            let link = entry
                .link_name()
                .expect("invalid link name")
                .map(|link| link.to_string_lossy().into_owned());

            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .expect("unable to read entry data");

            assert_eq!(data.len() as u64, entry.header().size().unwrap());

            Extracted {
                name,
                kind,
                link,
                data,
            }
        })
        .collect()
}
