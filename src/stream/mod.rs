//! The streaming encoder: a pull-based producer of archive bytes.
//!
//! [`ZipStream`] sequences two phases behind one opaque pull contract.
//! The **encoding** phase walks the manifest and emits, per entry, a local
//! file header, the deflated payload, and a data descriptor. Once the
//! manifest is exhausted the **journaling** phase emits the central
//! directory from the metadata accumulated during encoding, closing with a
//! single end-of-directory record. After that the stream is done and yields
//! nothing, forever.
//!
//! Every advance performs bounded work — one read+compress step or one
//! metadata record — so a slow consumer never forces more than one source
//! chunk into memory. Byte accounting is exact: offsets recorded for the
//! directory equal the positions actually emitted.
//!
//! # Example
//!
//! ```rust
//! use zipflow::{Entry, ArchivePath, Manifest, StreamOptions, ZipStream};
//!
//! # fn main() -> zipflow::Result<()> {
//! let mut manifest = Manifest::new();
//! manifest.push(Entry::from_bytes(ArchivePath::new("a.txt")?, b"hello".to_vec()));
//!
//! let mut stream = ZipStream::start(manifest, StreamOptions::new())?;
//! let mut archive = Vec::new();
//! stream.write_to(&mut archive)?;
//! # Ok(())
//! # }
//! ```

mod encode;
mod journal;
mod options;

pub use options::{ErrorPolicy, StreamOptions};

use std::io::Write;
use std::mem;

use log::debug;

use crate::manifest::Manifest;
use crate::{Error, Result};

use encode::{EncodeStep, EncodingState};
use journal::{JournalStep, JournalingState};

/// Top-level stage of stream production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Emitting per-entry payload records.
    Encoding,
    /// Emitting the central directory.
    Journaling,
    /// All records emitted; the stream yields nothing further.
    Done,
    /// The stream was aborted by an error or cancelled; it yields nothing
    /// further.
    Failed,
}

/// Internal state, one variant per phase.
///
/// Steps consume the current state and produce the successor, so phase
/// data moves by value through the machine.
enum State {
    Encoding(EncodingState),
    Journaling(JournalingState),
    Done,
    Failed,
}

/// A pull-based producer of one ZIP archive's byte stream.
///
/// Created with [`start`](Self::start), driven with
/// [`next_chunk`](Self::next_chunk) (or the [`Iterator`] impl) until it
/// yields `None`. Dropping the stream at any point is a valid cancellation
/// and releases the compression context and any open source reader.
pub struct ZipStream {
    state: State,
    bytes_emitted: u64,
}

impl ZipStream {
    /// Validates the manifest and opens a stream over it.
    ///
    /// No source is touched and no byte is produced yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] if validation fails.
    pub fn start(manifest: Manifest, options: StreamOptions) -> Result<Self> {
        manifest.validate()?;
        debug!(
            "stream started: {} entries, policy {:?}, level {}",
            manifest.len(),
            options.on_error,
            options.level
        );
        Ok(Self {
            state: State::Encoding(EncodingState::new(manifest.into_entries(), &options)),
            bytes_emitted: 0,
        })
    }

    /// Returns the current phase.
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Encoding(_) => Phase::Encoding,
            State::Journaling(_) => Phase::Journaling,
            State::Done => Phase::Done,
            State::Failed => Phase::Failed,
        }
    }

    /// Returns `true` once the archive has been fully emitted.
    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done)
    }

    /// Total bytes emitted so far, across both phases.
    pub fn bytes_emitted(&self) -> u64 {
        self.bytes_emitted
    }

    /// Pulls the next chunk of archive bytes.
    ///
    /// Returns `Some(Ok(bytes))` with a non-empty chunk, `Some(Err(_))`
    /// exactly once if the stream fails, and `None` once the stream is
    /// done, failed, or cancelled. Internally this loops past steps that
    /// emit nothing (skipped entries, phase transitions), so callers never
    /// see empty chunks.
    pub fn next_chunk(&mut self) -> Option<Result<Vec<u8>>> {
        loop {
            match self.step()? {
                Ok(bytes) if bytes.is_empty() => continue,
                result => return Some(result),
            }
        }
    }

    /// Performs one bounded step of the state machine.
    fn step(&mut self) -> Option<Result<Vec<u8>>> {
        // On error the placeholder stands and the stream stays failed.
        match mem::replace(&mut self.state, State::Failed) {
            State::Encoding(state) => match state.step() {
                Ok((bytes, EncodeStep::Continue(next))) => {
                    self.state = State::Encoding(next);
                    self.bytes_emitted += bytes.len() as u64;
                    Some(Ok(bytes))
                }
                Ok((bytes, EncodeStep::Journal(next))) => {
                    debug!("phase transition: encoding -> journaling");
                    self.state = State::Journaling(next);
                    self.bytes_emitted += bytes.len() as u64;
                    Some(Ok(bytes))
                }
                Err(e) => Some(Err(e)),
            },
            State::Journaling(state) => {
                let (bytes, next) = state.step();
                self.state = match next {
                    JournalStep::Continue(next) => State::Journaling(next),
                    JournalStep::Done => {
                        debug!("phase transition: journaling -> done");
                        State::Done
                    }
                };
                self.bytes_emitted += bytes.len() as u64;
                Some(Ok(bytes))
            }
            State::Done => {
                self.state = State::Done;
                None
            }
            State::Failed => None,
        }
    }

    /// Cancels the stream, releasing the compression context and any open
    /// source reader.
    ///
    /// Safe to call in any phase, including after completion, and
    /// idempotent. A finished stream stays [`Phase::Done`]; an unfinished
    /// one moves to [`Phase::Failed`] and yields `None` from then on.
    /// Dropping the stream has the same effect.
    pub fn cancel(&mut self) {
        match self.state {
            State::Done | State::Failed => {}
            _ => {
                debug!("stream cancelled after {} bytes", self.bytes_emitted);
                self.state = State::Failed;
            }
        }
    }

    /// Drains the whole stream into a writer, returning the bytes written.
    ///
    /// # Errors
    ///
    /// Propagates the first stream error or sink [`Error::Io`].
    pub fn write_to<W: Write>(&mut self, mut sink: W) -> Result<u64> {
        let mut written = 0u64;
        while let Some(chunk) = self.next_chunk() {
            let chunk = chunk?;
            sink.write_all(&chunk).map_err(Error::Io)?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }
}

impl Iterator for ZipStream {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk()
    }
}

impl std::fmt::Debug for ZipStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipStream")
            .field("phase", &self.phase())
            .field("bytes_emitted", &self.bytes_emitted)
            .finish()
    }
}
