//! Encoding phase: per-entry resolution, reading, compression, and record
//! emission.
//!
//! The phase runs one entry at a time. Its sub-state is keyed by the
//! presence of a current entry:
//!
//! - no current entry, entries remaining → resolve the next source and
//!   emit its local file header;
//! - current entry → pull one chunk, deflate it, and emit the compressed
//!   bytes; at end of source, flush the deflater and emit the data
//!   descriptor;
//! - no current entry, nothing remaining → hand the accumulated entry
//!   metadata to the journaling phase.
//!
//! Each step consumes the state and returns the successor, so accumulators
//! are threaded explicitly and never shared.

use std::collections::VecDeque;

use log::{debug, trace, warn};

use crate::checksum::Crc32;
use crate::codec::DeflateContext;
use crate::manifest::Entry;
use crate::records;
use crate::source::SourceReader;
use crate::{ArchivePath, Error, Result, Timestamp};

use super::journal::JournalingState;
use super::options::{ErrorPolicy, StreamOptions};

/// Identity of an entry carried from encoding into journaling.
#[derive(Debug, Clone)]
pub(crate) struct EntryRecord {
    pub(crate) path: ArchivePath,
    pub(crate) timestamp: Timestamp,
}

/// Per-entry accumulator, finalized when the entry's source is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EntryInfo {
    /// Absolute byte position of the entry's local file header.
    pub(crate) offset: u64,
    /// CRC-32 over the uncompressed bytes, in read order.
    pub(crate) checksum: u32,
    /// Uncompressed byte count.
    pub(crate) size: u64,
    /// Compressed byte count, including the final deflate flush.
    pub(crate) size_compressed: u64,
}

/// How an entry ended: encoded into the stream, or failed and excluded
/// from the directory.
pub(crate) enum EntryOutcome {
    Encoded(EntryInfo),
    Failed {
        #[allow(dead_code)] // surfaced via logs; journaling only needs the tag
        reason: String,
    },
}

/// The entry currently being encoded.
///
/// Owns the resolved source reader and, while active, the stream's deflate
/// context; both return to the state (or drop) when the entry ends.
struct ActiveEntry {
    record: EntryRecord,
    reader: Box<dyn SourceReader>,
    deflate: DeflateContext,
    offset: u64,
    crc: Crc32,
    size: u64,
    size_compressed: u64,
}

impl ActiveEntry {
    fn finalize(&self) -> EntryInfo {
        EntryInfo {
            offset: self.offset,
            checksum: self.crc.finalize(),
            size: self.size,
            size_compressed: self.size_compressed,
        }
    }
}

/// Successor of one encoding step.
pub(crate) enum EncodeStep {
    /// Still encoding.
    Continue(EncodingState),
    /// All entries processed; journaling takes over.
    Journal(JournalingState),
}

impl std::fmt::Debug for EncodeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeStep::Continue(_) => f.write_str("Continue(..)"),
            EncodeStep::Journal(_) => f.write_str("Journal(..)"),
        }
    }
}

/// State of the encoding phase.
pub(crate) struct EncodingState {
    /// Entries not yet started, in manifest order.
    remaining: VecDeque<Entry>,
    /// The entry being encoded, absent between entries.
    current: Option<ActiveEntry>,
    /// Completed entries in completion order (manifest order for the
    /// successful ones), ready for the central directory.
    encoded: Vec<(EntryRecord, EntryOutcome)>,
    /// Total bytes emitted so far, across all records and payloads.
    bytes_emitted: u64,
    on_error: ErrorPolicy,
    /// Deflate context parked between entries; created on first use and
    /// reset, never reallocated, per entry. `None` before the first entry
    /// resolves and after the phase is exhausted.
    deflate: Option<DeflateContext>,
    level: u32,
}

impl EncodingState {
    pub(crate) fn new(entries: Vec<Entry>, options: &StreamOptions) -> Self {
        Self {
            remaining: entries.into(),
            current: None,
            encoded: Vec::new(),
            bytes_emitted: 0,
            on_error: options.on_error,
            deflate: None,
            level: options.level,
        }
    }

    /// Performs one bounded unit of work.
    ///
    /// Returns the bytes to emit (possibly empty) and the successor state.
    /// On error the state is consumed; everything it owned, including the
    /// deflate context and any open source reader, is released by drop.
    pub(crate) fn step(mut self) -> Result<(Vec<u8>, EncodeStep)> {
        if let Some(active) = self.current.take() {
            return self.step_active(active);
        }
        if let Some(entry) = self.remaining.pop_front() {
            return self.step_begin(entry);
        }

        // Exhausted: release the deflate context, hand off to journaling.
        self.deflate.take();
        debug!(
            "encoding exhausted: {} entries processed, {} bytes emitted",
            self.encoded.len(),
            self.bytes_emitted
        );
        let journal = JournalingState::new(self.encoded, self.bytes_emitted);
        Ok((Vec::new(), EncodeStep::Journal(journal)))
    }

    /// Idle-with-remaining: resolve the next entry's source and open it
    /// with a local file header.
    fn step_begin(mut self, entry: Entry) -> Result<(Vec<u8>, EncodeStep)> {
        let (path, timestamp, source) = entry.into_parts();
        let reader = match source.resolve() {
            Ok(reader) => reader,
            Err(e) => {
                return match self.on_error {
                    ErrorPolicy::Halt => Err(Error::SourceResolution {
                        path: path.to_string(),
                        reason: e.to_string(),
                    }),
                    ErrorPolicy::Skip => {
                        warn!("skipping entry '{}': source resolution failed: {}", path, e);
                        let record = EntryRecord { path, timestamp };
                        self.encoded.push((
                            record,
                            EntryOutcome::Failed {
                                reason: e.to_string(),
                            },
                        ));
                        Ok((Vec::new(), EncodeStep::Continue(self)))
                    }
                };
            }
        };

        let deflate = match self.deflate.take() {
            Some(mut ctx) => {
                ctx.reset();
                ctx
            }
            None => DeflateContext::new(self.level),
        };

        let header = records::local_file_header(&path, timestamp);
        let offset = self.bytes_emitted;
        self.bytes_emitted += header.len() as u64;
        debug!("entry '{}' begins at offset {}", path, offset);

        self.current = Some(ActiveEntry {
            record: EntryRecord { path, timestamp },
            reader,
            deflate,
            offset,
            crc: Crc32::new(),
            size: 0,
            size_compressed: 0,
        });
        Ok((header, EncodeStep::Continue(self)))
    }

    /// Active: pull one chunk from the current source.
    fn step_active(mut self, mut active: ActiveEntry) -> Result<(Vec<u8>, EncodeStep)> {
        match active.reader.read_chunk() {
            Ok(Some(chunk)) => {
                let out = active.deflate.compress_chunk(&chunk)?;
                active.crc.update(&chunk);
                active.size += chunk.len() as u64;
                active.size_compressed += out.len() as u64;
                self.bytes_emitted += out.len() as u64;
                trace!(
                    "entry '{}': {} bytes read, {} bytes emitted",
                    active.record.path,
                    chunk.len(),
                    out.len()
                );
                self.current = Some(active);
                Ok((out, EncodeStep::Continue(self)))
            }
            Ok(None) => {
                // Source exhausted: flush the deflate stream, then close the
                // entry with its data descriptor.
                let mut bytes = active.deflate.finish()?;
                active.size_compressed += bytes.len() as u64;
                let info = active.finalize();
                bytes.extend_from_slice(&records::data_descriptor(
                    info.checksum,
                    info.size_compressed,
                    info.size,
                ));
                self.bytes_emitted += bytes.len() as u64;
                debug!(
                    "entry '{}' encoded: {} bytes -> {} compressed, crc {:#010x}",
                    active.record.path, info.size, info.size_compressed, info.checksum
                );

                // Park the context for the next entry; drop the reader.
                self.deflate = Some(active.deflate);
                self.encoded
                    .push((active.record, EntryOutcome::Encoded(info)));
                Ok((bytes, EncodeStep::Continue(self)))
            }
            Err(e) => match self.on_error {
                ErrorPolicy::Halt => Err(Error::SourceRead {
                    path: active.record.path.to_string(),
                    source: e,
                }),
                ErrorPolicy::Skip => {
                    warn!(
                        "skipping entry '{}' after {} bytes: read failed: {}",
                        active.record.path, active.size, e
                    );
                    // Reclaim the context; its pending state is discarded by
                    // the reset when the next entry begins.
                    self.deflate = Some(active.deflate);
                    self.encoded.push((
                        active.record,
                        EntryOutcome::Failed {
                            reason: e.to_string(),
                        },
                    ));
                    Ok((Vec::new(), EncodeStep::Continue(self)))
                }
            },
        }
    }
}
