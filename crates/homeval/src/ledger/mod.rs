//! The file ledger: which data files have already been ingested.
//!
//! Persisted as a newline-delimited list of filenames. Loading never fails
//! the caller (missing or unreadable state degrades to "nothing processed
//! yet"); committing is atomic and propagates errors so a training run can
//! refuse to consume the same files twice.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::data::schema::DATA_EXTENSION;
use crate::persist::write_atomic;

/// Errors raised by ledger commits and directory listings.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A source of candidate data filenames.
///
/// The trainer only ever sees filenames through this trait, so tests can
/// supply an in-memory listing instead of touching the filesystem.
pub trait DirectoryListing {
    /// All entries currently visible, as bare filenames.
    fn list(&self) -> Result<Vec<String>, LedgerError>;
}

/// Filesystem-backed directory listing.
#[derive(Debug, Clone)]
pub struct FsDirectory {
    dir: PathBuf,
}

impl FsDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory being listed.
    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl DirectoryListing for FsDirectory {
    fn list(&self) -> Result<Vec<String>, LedgerError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| LedgerError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LedgerError::Io {
                path: self.dir.clone(),
                source,
            })?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}

/// In-memory listing for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticListing {
    names: Vec<String>,
}

impl StaticListing {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl DirectoryListing for StaticListing {
    fn list(&self) -> Result<Vec<String>, LedgerError> {
        Ok(self.names.clone())
    }
}

/// The set of filenames already ingested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    known: HashSet<String>,
}

impl Ledger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load persisted state; a missing or unreadable file degrades to the
    /// empty set.
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Self::new();
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ledger unreadable, treating as empty");
                return Self::new();
            }
        };

        let known = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { known }
    }

    /// Number of known files.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// True when nothing has been ingested yet.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    /// Known filenames, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.known.iter().cloned().collect();
        names.sort();
        names
    }

    /// Data files in `listing` not yet ingested, sorted.
    ///
    /// Only names with the expected data extension count; everything else in
    /// the directory is ignored.
    pub fn diff(&self, listing: &[String]) -> Vec<String> {
        let mut delta: Vec<String> = listing
            .iter()
            .filter(|name| has_data_extension(name))
            .filter(|name| !self.known.contains(*name))
            .cloned()
            .collect();
        delta.sort();
        delta.dedup();
        delta
    }

    /// Record additional filenames as ingested.
    pub fn extend(&mut self, names: impl IntoIterator<Item = String>) {
        self.known.extend(names);
    }

    /// Persist the ledger atomically: sorted, de-duplicated, one name per
    /// line.
    pub fn commit(&self, path: &Path) -> Result<(), LedgerError> {
        let mut contents = self.names().join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        write_atomic(path, contents.as_bytes()).map_err(|source| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn has_data_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DATA_EXTENSION))
}
