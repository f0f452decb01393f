//! Archive manifest: the ordered list of logical entries to encode.
//!
//! A [`Manifest`] declares what the archive will contain; nothing is read
//! or compressed until the stream is driven. Entry order in the manifest is
//! the order of payloads in the output and of headers in the central
//! directory.
//!
//! # Example
//!
//! ```rust
//! use zipflow::{ArchivePath, BytesSource, Entry, FileSource, Manifest, Timestamp};
//!
//! # fn main() -> zipflow::Result<()> {
//! let mut manifest = Manifest::new();
//! manifest.push(Entry::new(
//!     ArchivePath::new("report/summary.txt")?,
//!     Timestamp::now(),
//!     BytesSource::new(b"quarterly numbers".to_vec()),
//! ));
//! manifest.push(Entry::new(
//!     ArchivePath::new("report/raw.csv")?,
//!     Timestamp::now(),
//!     FileSource::new("/tmp/raw.csv"),
//! ));
//! assert_eq!(manifest.len(), 2);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;

use crate::source::{BytesSource, FileSource, Source};
use crate::{ArchivePath, Error, Result, Timestamp};

/// A logical entry destined to become one file within the archive.
///
/// Immutable once constructed: the path and timestamp are fixed, and the
/// source descriptor is consumed exactly once when the entry's turn comes
/// in the stream.
pub struct Entry {
    path: ArchivePath,
    timestamp: Timestamp,
    source: Box<dyn Source>,
}

impl Entry {
    /// Creates an entry from a path, timestamp, and content source.
    pub fn new(path: ArchivePath, timestamp: Timestamp, source: impl Source + 'static) -> Self {
        Self {
            path,
            timestamp,
            source: Box::new(source),
        }
    }

    /// Creates an entry over in-memory bytes, stamped with the current time.
    pub fn from_bytes(path: ArchivePath, data: impl Into<Vec<u8>>) -> Self {
        Self::new(path, Timestamp::now(), BytesSource::new(data.into()))
    }

    /// Creates an entry reading a file from disk, stamped with the file's
    /// modification time when available and the current time otherwise.
    pub fn from_file(path: ArchivePath, disk_path: impl AsRef<std::path::Path>) -> Self {
        let disk_path = disk_path.as_ref();
        let timestamp = std::fs::metadata(disk_path)
            .and_then(|m| m.modified())
            .map(Timestamp::from_system_time)
            .unwrap_or_else(|_| Timestamp::now());
        Self::new(path, timestamp, FileSource::new(disk_path))
    }

    /// Returns the entry's archive path.
    pub fn path(&self) -> &ArchivePath {
        &self.path
    }

    /// Returns the entry's timestamp.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Splits the entry into its metadata and its source descriptor.
    pub(crate) fn into_parts(self) -> (ArchivePath, Timestamp, Box<dyn Source>) {
        (self.path, self.timestamp, self.source)
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("path", &self.path)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

/// An ordered collection of entries to be streamed into one archive.
#[derive(Debug, Default)]
pub struct Manifest {
    entries: Vec<Entry>,
}

impl Manifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry; it will be encoded after all entries already present.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the manifest holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validates the manifest.
    ///
    /// Individual paths are validated at [`ArchivePath`] construction; the
    /// manifest-level check rejects duplicate archive paths, which would
    /// produce a directory with colliding names.
    ///
    /// Called by [`ZipStream::start`](crate::ZipStream::start) before any
    /// bytes are produced.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !seen.insert(entry.path.as_str()) {
                return Err(Error::InvalidManifest(format!(
                    "duplicate archive path '{}'",
                    entry.path
                )));
            }
        }
        Ok(())
    }

    /// Consumes the manifest, yielding entries in declaration order.
    pub(crate) fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

impl FromIterator<Entry> for Manifest {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<Entry> for Manifest {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}
