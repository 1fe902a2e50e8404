use std::{
    fs, io,
    path::{Path, PathBuf},
};

use derive_more::{Display, Error, From};
use tracing::debug;

/// Container file resolution errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum ContainerFileError {
    /// IO-related error.
    Io(io::Error),

    /// Provided directory does not contain any known container file.
    #[display(fmt = "container file not found in {}", "_0.display()")]
    #[from(ignore)]
    NotFound(#[error(not(source))] PathBuf),

    /// Provided path is neither a regular file nor a directory.
    #[display(fmt = "{} is neither a file nor a directory", "_0.display()")]
    #[from(ignore)]
    InvalidFileType(#[error(not(source))] PathBuf),
}

/// Container file, the contents of which are sent along with the build context.
pub(crate) struct ContainerFile {
    /// Resolved container file path.
    pub path: PathBuf,

    /// Container file contents.
    pub contents: String,
}

impl ContainerFile {
    /// Resolve the container file for an application.
    ///
    /// `path` may point to the file itself or to a directory, in which case
    /// well-known file names are tried in order, see [`candidates`].
    pub(crate) fn resolve(app: &str, path: &Path) -> Result<Self, ContainerFileError> {
        let metadata = fs::metadata(path)?;

        let path = if metadata.is_dir() {
            guess(app, path)?
        } else if metadata.is_file() {
            path.to_path_buf()
        } else {
            return Err(ContainerFileError::InvalidFileType(path.to_path_buf()));
        };

        debug!(path = %path.display(), "using container file");

        let contents = fs::read_to_string(&path)?;

        Ok(Self { path, contents })
    }

    /// Directory the container file resides in, used as the default build context.
    pub(crate) fn context_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Container file names, most specific first.
fn candidates(app: &str) -> [String; 6] {
    [
        format!("Dockerfile.{app}"),
        format!("Containerfile.{app}"),
        String::from("Dockerfile.paas"),
        String::from("Containerfile.paas"),
        String::from("Dockerfile"),
        String::from("Containerfile"),
    ]
}

/// Find the first regular file among [`candidates`] inside of `dir`.
fn guess(app: &str, dir: &Path) -> Result<PathBuf, ContainerFileError> {
    candidates(app)
        .into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| ContainerFileError::NotFound(dir.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::{ContainerFile, ContainerFileError};

    #[test]
    fn application_specific_file_wins() {
        let dir = tempfile::tempdir().expect("unable to create temporary directory");

        fs::write(dir.path().join("Dockerfile"), "FROM generic").unwrap();
        fs::write(dir.path().join("Containerfile.paas"), "FROM platform").unwrap();
        fs::write(dir.path().join("Containerfile.web"), "FROM web").unwrap();

        let file = ContainerFile::resolve("web", dir.path()).expect("unable to resolve");

        assert_eq!(file.path, dir.path().join("Containerfile.web"));
        assert_eq!(file.contents, "FROM web");
        assert_eq!(file.context_dir(), dir.path());
    }

    #[test]
    fn generic_file_is_a_fallback() {
        let dir = tempfile::tempdir().expect("unable to create temporary directory");

        fs::write(dir.path().join("Containerfile"), "FROM generic").unwrap();
        fs::write(dir.path().join("Dockerfile.other"), "FROM other").unwrap();

        let file = ContainerFile::resolve("web", dir.path()).expect("unable to resolve");

        assert_eq!(file.path, dir.path().join("Containerfile"));
    }

    #[test]
    fn directories_are_not_candidates() {
        let dir = tempfile::tempdir().expect("unable to create temporary directory");

        fs::create_dir(dir.path().join("Dockerfile")).unwrap();

        assert!(matches!(
            ContainerFile::resolve("web", dir.path()),
            Err(ContainerFileError::NotFound(_))
        ));
    }

    #[test]
    fn explicit_file() {
        let dir = tempfile::tempdir().expect("unable to create temporary directory");
        let path = dir.path().join("build.containerfile");

        fs::write(&path, "FROM scratch").unwrap();

        let file = ContainerFile::resolve("web", &path).expect("unable to resolve");

        assert_eq!(file.path, path);
        assert_eq!(file.contents, "FROM scratch");
    }

    #[test]
    fn relative_file_context() {
        let file = ContainerFile {
            path: PathBuf::from("Dockerfile"),
            contents: String::new(),
        };

        assert_eq!(file.context_dir(), PathBuf::from("."));
    }

    #[test]
    fn missing_path() {
        let dir = tempfile::tempdir().expect("unable to create temporary directory");

        assert!(matches!(
            ContainerFile::resolve("web", &dir.path().join("missing")),
            Err(ContainerFileError::Io(_))
        ));
    }
}
