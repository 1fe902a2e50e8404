use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::debug;

use crate::error::ArchiverError;

/// Compiled gitignore-style patterns collected from all ignore files.
pub(crate) struct IgnorePatterns {
    /// Matcher built from every collected line.
    matcher: Gitignore,
}

impl IgnorePatterns {
    /// Read every ignore file in order and compile their lines into a single matcher.
    ///
    /// Files that do not exist are skipped, every other IO error is returned.
    pub(crate) fn load(
        root: &Path,
        files: &[PathBuf],
        diagnostics: &mut dyn Write,
    ) -> Result<Self, ArchiverError> {
        let mut lines = Vec::new();

        for file in files {
            let contents = match fs::read_to_string(root.join(file)) {
                Ok(contents) => contents,
                Err(error) if error.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(ArchiverError::IgnoreFile {
                        file: file.clone(),
                        source,
                    })
                }
            };

            let _ = writeln!(
                diagnostics,
                "Using pattern(s) from \"{}\" to include/exclude files...",
                file.display()
            );

            lines.extend(contents.lines().map(String::from));
        }

        debug!(lines = lines.len(), "compiling ignore patterns");

        Ok(Self::compile(root, lines)?)
    }

    /// Compile the provided lines into a matcher.
    ///
    /// Later lines take precedence over the earlier ones, which allows
    /// `!pattern` lines to re-include previously excluded paths.
    pub(crate) fn compile<I, S>(root: &Path, lines: I) -> Result<Self, ignore::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GitignoreBuilder::new(root);

        for line in lines {
            builder.add_line(None, line.as_ref())?;
        }

        Ok(Self {
            matcher: builder.build()?,
        })
    }

    /// Check if the relative, forward-slash separated `path` is excluded.
    ///
    /// A path is excluded when it, or any of its parent directories, matches.
    /// Re-included paths are checked before their parents.
    pub(crate) fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        self.matcher
            .matched_path_or_any_parents(path, is_dir)
            .is_ignore()
    }
}
