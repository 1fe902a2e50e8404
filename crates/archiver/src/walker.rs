use std::{fs::Metadata, path::Path};

use walkdir::WalkDir;

use crate::error::ArchiverError;

/// Visit `root` and every entry below it, sorted by file name.
///
/// Symbolic links are never followed. `visit` receives each entry path and its
/// (non-followed) metadata and returns the number of archived entries,
/// which are summed up and returned.
///
/// The first read or stat failure stops the traversal.
pub(crate) fn walk<F>(root: &Path, mut visit: F) -> Result<usize, ArchiverError>
where
    F: FnMut(&Path, &Metadata) -> Result<usize, ArchiverError>,
{
    let mut added = 0;

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        let metadata = entry.metadata()?;

        added += visit(entry.path(), &metadata)?;
    }

    Ok(added)
}
