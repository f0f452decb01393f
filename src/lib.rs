//! # zipflow
//!
//! A pure-Rust streaming producer of ZIP (with Zip64 extension) archives.
//!
//! This crate builds the byte stream of a valid archive incrementally from a
//! manifest of logical entries, without ever buffering the whole archive in
//! memory. The output is pulled chunk by chunk, which makes it a natural fit
//! for chunked HTTP responses, pipes, and other pull-based transports.
//!
//! ## Quick Start
//!
//! ```rust
//! use zipflow::{ArchivePath, BytesSource, Entry, Manifest, Result, Timestamp, ZipStream};
//!
//! fn main() -> Result<()> {
//!     let mut manifest = Manifest::new();
//!     manifest.push(Entry::new(
//!         ArchivePath::new("hello.txt")?,
//!         Timestamp::now(),
//!         BytesSource::new(b"Hello, World!".to_vec()),
//!     ));
//!
//!     let mut stream = ZipStream::start(manifest, Default::default())?;
//!     let mut archive = Vec::new();
//!     while let Some(chunk) = stream.next_chunk() {
//!         archive.extend_from_slice(&chunk?);
//!     }
//!     assert_eq!(stream.bytes_emitted(), archive.len() as u64);
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming Model
//!
//! A [`ZipStream`] moves through three phases:
//!
//! 1. **Encoding** — for each manifest entry in order: resolve its source,
//!    emit a local file header, pull chunks, deflate them, and close the
//!    entry with a data descriptor carrying the accumulated CRC-32 and
//!    sizes.
//! 2. **Journaling** — emit the central directory: one file header per
//!    successfully encoded entry, then exactly one end-of-directory record.
//! 3. **Done** — the advance operation yields `None` forever.
//!
//! Each call to [`ZipStream::next_chunk`] performs bounded work (one
//! read+compress step or one metadata record) and returns at most one
//! non-empty chunk. The caller drives the stream to completion; dropping it
//! mid-stream is a valid cancellation and releases all resources.
//!
//! ## Partial Failures
//!
//! Entry sources can fail to resolve or fail mid-read. A single policy,
//! fixed for the stream's lifetime, decides what happens:
//!
//! - [`ErrorPolicy::Halt`] (default): the stream fails immediately. Bytes
//!   already handed to the transport stand; the archive may be truncated.
//! - [`ErrorPolicy::Skip`]: the entry is dropped from the central directory
//!   and the stream continues. Bytes already emitted for the entry remain
//!   as unreferenced filler, so the archive stays parseable.
//!
//! ```rust,no_run
//! use zipflow::{ErrorPolicy, Manifest, StreamOptions, ZipStream};
//!
//! # fn main() -> zipflow::Result<()> {
//! let options = StreamOptions::new().on_error(ErrorPolicy::Skip).level(9);
//! let stream = ZipStream::start(Manifest::new(), options)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. See [`Error`] for the failure modes.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

/// Default buffer size for read operations (8 KiB).
pub(crate) const READ_BUFFER_SIZE: usize = 8192;

pub mod archive_path;
pub mod checksum;
pub mod codec;
pub mod error;
pub mod manifest;
pub mod records;
pub mod source;
pub mod stream;
pub mod timestamp;

pub use archive_path::ArchivePath;
pub use error::{Error, Result};
pub use timestamp::Timestamp;

// Re-export manifest API at crate root for convenience
pub use manifest::{Entry, Manifest};

// Re-export source API at crate root for convenience
pub use source::{BytesSource, FileSource, ReaderSource, Source, SourceReader};

// Re-export streaming API at crate root for convenience
pub use stream::{ErrorPolicy, Phase, StreamOptions, ZipStream};
