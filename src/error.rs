//! Error types for streaming archive production.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when producing an archive stream, along with a convenient
//! [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. You can
//! handle errors using pattern matching or the `?` operator:
//!
//! ```rust,no_run
//! use zipflow::{Manifest, StreamOptions, ZipStream, Error};
//!
//! fn produce(manifest: Manifest) -> zipflow::Result<Vec<u8>> {
//!     let mut stream = ZipStream::start(manifest, StreamOptions::new())?;
//!     let mut out = Vec::new();
//!     while let Some(chunk) = stream.next_chunk() {
//!         match chunk {
//!             Ok(bytes) => out.extend_from_slice(&bytes),
//!             Err(Error::SourceRead { path, source }) => {
//!                 eprintln!("reading '{}' failed: {}", path, source);
//!                 return Err(Error::SourceRead { path, source });
//!             }
//!             Err(e) => return Err(e),
//!         }
//!     }
//!     Ok(out)
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants | Typical Cause |
//! |----------|----------|---------------|
//! | Validation | [`InvalidArchivePath`][Error::InvalidArchivePath], [`InvalidManifest`][Error::InvalidManifest] | Malformed manifest, always pre-stream |
//! | Sources | [`SourceResolution`][Error::SourceResolution], [`SourceRead`][Error::SourceRead] | Entry content unavailable; governed by the stream's error policy |
//! | I/O | [`Io`][Error::Io] | Sink or filesystem operations |
//! | Compression | [`Compression`][Error::Compression] | Deflate context failure (should not occur with valid input) |

use std::io;

/// The main error type for streaming archive production.
///
/// Manifest validation errors are always fatal and reported before any
/// bytes are produced. Source errors are subject to the stream's
/// [`ErrorPolicy`](crate::ErrorPolicy): under `Halt` they abort the stream,
/// under `Skip` they are recorded per entry and never surface here.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while draining the stream into a sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An archive path failed validation.
    ///
    /// Paths must be relative, slash-separated, free of NUL bytes and of
    /// `.`/`..` segments. See [`ArchivePath`](crate::ArchivePath).
    #[error("invalid archive path: {0}")]
    InvalidArchivePath(String),

    /// The manifest failed validation before streaming started.
    ///
    /// Reported by [`ZipStream::start`](crate::ZipStream::start), e.g. for
    /// duplicate archive paths.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// An entry's source descriptor could not become a readable provider.
    #[error("cannot resolve source for '{path}': {reason}")]
    SourceResolution {
        /// Archive path of the offending entry.
        path: String,
        /// Human-readable resolution failure reason.
        reason: String,
    },

    /// An entry's source failed mid-read.
    ///
    /// Bytes already emitted for this and prior entries are not retracted;
    /// under the `Halt` policy the resulting archive may be truncated.
    #[error("reading source for '{path}' failed: {source}")]
    SourceRead {
        /// Archive path of the offending entry.
        path: String,
        /// Underlying read error.
        #[source]
        source: io::Error,
    },

    /// The deflate context reported a failure.
    #[error("compression error: {0}")]
    Compression(#[from] flate2::CompressError),
}

/// A specialized `Result` type for streaming archive operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_source_read_preserves_cause() {
        let err = Error::SourceRead {
            path: "a.txt".into(),
            source: io::Error::new(io::ErrorKind::ConnectionReset, "reset"),
        };
        assert!(err.to_string().contains("a.txt"));
        assert!(err.to_string().contains("reset"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::InvalidManifest("duplicate path 'a'".into());
        assert_eq!(err.to_string(), "invalid manifest: duplicate path 'a'");

        let err = Error::SourceResolution {
            path: "b.txt".into(),
            reason: "file not found".into(),
        };
        assert!(err.to_string().contains("b.txt"));
        assert!(err.to_string().contains("file not found"));
    }
}
