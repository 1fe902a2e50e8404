use std::{
    collections::{hash_map::Entry, HashMap},
    path::{Path, PathBuf},
};

use crate::entry::EntryKind;

/// Archive entry that claimed some name first.
#[derive(Clone, Debug)]
pub(crate) struct SeenEntry {
    /// Kind of the archived entry.
    pub kind: EntryKind,

    /// Filesystem path the entry was archived from.
    pub source: PathBuf,
}

/// Result of an attempt to claim an archive entry name.
#[derive(Debug)]
pub(crate) enum Claim {
    /// Name was not used before and now belongs to the caller.
    Accepted,

    /// Name is already taken by another entry.
    Taken(SeenEntry),
}

/// Set of entry names already written into a single archive.
#[derive(Default)]
pub(crate) struct SeenNames {
    /// Written entries, keyed by their archive names.
    entries: HashMap<String, SeenEntry>,
}

impl SeenNames {
    /// Claim the provided archive `name`.
    ///
    /// The first claim wins, subsequent claims of the same name are rejected
    /// with the information about the original entry.
    pub(crate) fn accept(&mut self, name: &str, kind: EntryKind, source: &Path) -> Claim {
        match self.entries.entry(name.to_owned()) {
            Entry::Occupied(entry) => Claim::Taken(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(SeenEntry {
                    kind,
                    source: source.to_path_buf(),
                });
                Claim::Accepted
            }
        }
    }
}
