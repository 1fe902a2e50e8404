use std::path::{Path, PathBuf};

use normalize_path::NormalizePath;

/// Resolve `path` against `working_dir`, returning its normalized absolute form
/// only if it stays inside of `working_dir`.
///
/// Resolution is purely lexical: `..` components are collapsed, symlinks are not followed.
/// Containment is therefore lexical only: `link/secret` passes even when `link`
/// is a symlink to a directory outside of `working_dir`.
/// The containment check compares whole path components, thus `/home/ab` is not considered
/// to be inside of `/home/a`.
pub(crate) fn resolve_within(working_dir: &Path, path: &Path) -> Option<PathBuf> {
    let absolute = working_dir.join(path).normalize();

    absolute.starts_with(working_dir).then_some(absolute)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::resolve_within;

    #[test]
    fn current_directory() {
        let working_dir = Path::new("/home/a");

        assert_eq!(
            resolve_within(working_dir, Path::new(".")),
            Some(PathBuf::from("/home/a"))
        );
        assert_eq!(
            resolve_within(working_dir, Path::new("./sub/..")),
            Some(PathBuf::from("/home/a"))
        );
        assert_eq!(
            resolve_within(working_dir, Path::new("/home/a/")),
            Some(PathBuf::from("/home/a"))
        );
    }

    #[test]
    fn nested_paths() {
        let working_dir = Path::new("/home/a");

        assert_eq!(
            resolve_within(working_dir, Path::new("sub/b.txt")),
            Some(PathBuf::from("/home/a/sub/b.txt"))
        );
        assert_eq!(
            resolve_within(working_dir, Path::new("sub/../c.txt")),
            Some(PathBuf::from("/home/a/c.txt"))
        );
        assert_eq!(
            resolve_within(working_dir, Path::new("/home/a/sub/")),
            Some(PathBuf::from("/home/a/sub"))
        );
    }

    #[test]
    fn outside_paths() {
        let working_dir = Path::new("/home/a");

        assert_eq!(resolve_within(working_dir, Path::new("..")), None);
        assert_eq!(
            resolve_within(working_dir, Path::new("../../../../var/www/html")),
            None
        );
        assert_eq!(resolve_within(working_dir, Path::new("/etc/passwd")), None);
        assert_eq!(resolve_within(working_dir, Path::new("../ab/file")), None);
        assert_eq!(resolve_within(working_dir, Path::new("/home/ab")), None);
    }

    #[test]
    fn symlinks_are_not_resolved() {
        let working_dir = Path::new("/home/a");

        assert_eq!(
            resolve_within(working_dir, Path::new("link/../secret")),
            Some(PathBuf::from("/home/a/secret"))
        );
        assert_eq!(
            resolve_within(working_dir, Path::new("link/secret")),
            Some(PathBuf::from("/home/a/link/secret"))
        );
    }
}
