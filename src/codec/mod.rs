//! Compression codec adapters.
//!
//! ZIP entry payloads are stored as raw deflate streams (method 8), with
//! no zlib container header or trailer, so the compressed bytes embed
//! directly between an entry's local header and its data descriptor.
//!
//! The streaming encoder keeps a single [`DeflateContext`] alive for the
//! whole stream: created lazily when the first entry begins, reset between
//! entries, and dropped once when encoding is exhausted.

mod deflate;

pub use deflate::{DEFAULT_LEVEL, DeflateContext};

/// Compression method identifiers as stored in ZIP records.
pub mod method {
    /// Deflate (the only method this crate emits).
    pub const DEFLATE: u16 = 8;
}
