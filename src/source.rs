//! Entry content sources.
//!
//! A manifest entry names its content through a [`Source`]: an opaque,
//! pull-based descriptor that is resolved into a [`SourceReader`] only when
//! the entry's turn comes in the stream. Resolution and reads happen one
//! entry at a time, so a stream holds at most one open provider.
//!
//! Built-in sources cover the common cases: [`BytesSource`] for in-memory
//! data, [`FileSource`] for files on disk, and [`ReaderSource`] for any
//! [`Read`] implementation. Custom sources (object stores, HTTP bodies,
//! generated content) implement the two traits directly; both speak
//! [`std::io::Error`], which the stream wraps with entry context.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::READ_BUFFER_SIZE;

/// A descriptor for an entry's content, resolvable into a reader.
///
/// Resolution is deferred until the entry begins encoding, so constructing
/// a manifest never touches the underlying storage. Resolution consumes the
/// descriptor; each entry is encoded at most once.
pub trait Source: Send {
    /// Resolves this descriptor into a readable provider.
    ///
    /// # Errors
    ///
    /// Any I/O error; the stream maps it to
    /// [`Error::SourceResolution`](crate::Error::SourceResolution) with the
    /// entry's archive path attached, then applies the stream's error
    /// policy.
    fn resolve(self: Box<Self>) -> io::Result<Box<dyn SourceReader>>;
}

/// A resolved, pull-based provider of an entry's bytes.
pub trait SourceReader: Send {
    /// Pulls the next chunk of content.
    ///
    /// Returns `Ok(Some(bytes))` with a non-empty chunk, or `Ok(None)` once
    /// the content is exhausted. Chunk sizing is provider-defined.
    ///
    /// # Errors
    ///
    /// Any I/O error; the stream maps it to
    /// [`Error::SourceRead`](crate::Error::SourceRead) and applies the
    /// stream's error policy.
    fn read_chunk(&mut self) -> io::Result<Option<Vec<u8>>>;
}

/// Adapts any [`Read`] into chunked pulls of [`READ_BUFFER_SIZE`] bytes.
struct ChunkReader<R> {
    inner: R,
}

impl<R: Read + Send> SourceReader for ChunkReader<R> {
    fn read_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(Some(buf));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// In-memory source backed by a byte vector.
///
/// # Example
///
/// ```rust
/// use zipflow::{ArchivePath, BytesSource, Entry, Timestamp};
///
/// let entry = Entry::new(
///     ArchivePath::new("notes.txt").unwrap(),
///     Timestamp::now(),
///     BytesSource::new(b"jotted down".to_vec()),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct BytesSource {
    data: Vec<u8>,
}

impl BytesSource {
    /// Creates a source over the given bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for BytesSource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for BytesSource {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl Source for BytesSource {
    fn resolve(self: Box<Self>) -> io::Result<Box<dyn SourceReader>> {
        Ok(Box::new(ChunkReader {
            inner: io::Cursor::new(self.data),
        }))
    }
}

/// Source reading a file from the local filesystem.
///
/// The file is opened only when the entry begins encoding; a missing or
/// unreadable file surfaces as a resolution error at that point, subject to
/// the stream's error policy.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source for the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Source for FileSource {
    fn resolve(self: Box<Self>) -> io::Result<Box<dyn SourceReader>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(ChunkReader {
            inner: BufReader::new(file),
        }))
    }
}

/// Source wrapping an arbitrary reader.
///
/// Useful for piping generated or already-open content into an archive
/// without an intermediate buffer.
pub struct ReaderSource<R> {
    inner: R,
}

impl<R: Read + Send + 'static> ReaderSource<R> {
    /// Creates a source that pulls from `reader` until EOF.
    pub fn new(reader: R) -> Self {
        Self { inner: reader }
    }
}

impl<R> std::fmt::Debug for ReaderSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderSource").finish_non_exhaustive()
    }
}

impl<R: Read + Send + 'static> Source for ReaderSource<R> {
    fn resolve(self: Box<Self>) -> io::Result<Box<dyn SourceReader>> {
        Ok(Box::new(ChunkReader { inner: self.inner }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn drain(source: impl Source + 'static) -> io::Result<Vec<u8>> {
        let mut reader = Box::new(source).resolve()?;
        let mut out = Vec::new();
        while let Some(chunk) = reader.read_chunk()? {
            assert!(!chunk.is_empty());
            out.extend_from_slice(&chunk);
        }
        out.shrink_to_fit();
        Ok(out)
    }

    #[test]
    fn test_bytes_source() {
        let data = b"hello world".to_vec();
        assert_eq!(drain(BytesSource::new(data.clone())).unwrap(), data);
    }

    #[test]
    fn test_bytes_source_empty() {
        assert_eq!(drain(BytesSource::new(Vec::new())).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_bytes_source_chunked() {
        // Larger than one read buffer, so it takes several pulls
        let data = vec![0xAB; READ_BUFFER_SIZE * 3 + 17];
        let mut reader = Box::new(BytesSource::new(data.clone())).resolve().unwrap();
        let mut pulls = 0;
        let mut out = Vec::new();
        while let Some(chunk) = reader.read_chunk().unwrap() {
            pulls += 1;
            out.extend_from_slice(&chunk);
        }
        assert_eq!(out, data);
        assert_eq!(pulls, 4);
    }

    #[test]
    fn test_file_source() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"file content").unwrap();
        tmp.flush().unwrap();

        assert_eq!(drain(FileSource::new(tmp.path())).unwrap(), b"file content");
    }

    #[test]
    fn test_file_source_missing_fails_resolution() {
        let err = drain(FileSource::new("/nonexistent/zipflow-test")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_reader_source() {
        let cursor = io::Cursor::new(b"streamed".to_vec());
        assert_eq!(drain(ReaderSource::new(cursor)).unwrap(), b"streamed");
    }
}
