//! Journaling phase: emission of the central directory.
//!
//! Runs entirely on metadata accumulated during encoding; no source is
//! touched, so this phase cannot fail on I/O. Failed entries are discarded
//! silently, successful ones get one central file header each, and the
//! phase closes with exactly one end-of-directory record.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::records;

use super::encode::{EntryOutcome, EntryRecord};

/// Successor of one journaling step.
pub(crate) enum JournalStep {
    /// More directory records to emit.
    Continue(JournalingState),
    /// End record emitted; the stream is complete.
    Done,
}

/// State of the journaling phase.
pub(crate) struct JournalingState {
    /// Entry results inherited from encoding, in manifest order.
    remaining: VecDeque<(EntryRecord, EntryOutcome)>,
    /// Absolute byte position where the central directory begins.
    offset: u64,
    /// Central file headers emitted so far (successful entries only).
    entries_emitted: u64,
    /// Bytes of central file headers emitted so far.
    entries_size: u64,
    /// Continues the encoding phase's running total.
    bytes_emitted: u64,
}

impl JournalingState {
    /// Takes over from encoding at the current stream position.
    pub(crate) fn new(encoded: Vec<(EntryRecord, EntryOutcome)>, bytes_emitted: u64) -> Self {
        Self {
            remaining: encoded.into(),
            offset: bytes_emitted,
            entries_emitted: 0,
            entries_size: 0,
            bytes_emitted,
        }
    }

    /// Emits the next directory record.
    ///
    /// Infallible: everything needed was settled during encoding.
    pub(crate) fn step(mut self) -> (Vec<u8>, JournalStep) {
        match self.remaining.pop_front() {
            Some((record, EntryOutcome::Failed { .. })) => {
                trace!("entry '{}' failed; excluded from directory", record.path);
                (Vec::new(), JournalStep::Continue(self))
            }
            Some((record, EntryOutcome::Encoded(info))) => {
                let bytes = records::central_file_header(
                    info.offset,
                    &record.path,
                    info.checksum,
                    info.size_compressed,
                    info.size,
                    record.timestamp,
                );
                self.entries_size += bytes.len() as u64;
                self.bytes_emitted += bytes.len() as u64;
                self.entries_emitted += 1;
                (bytes, JournalStep::Continue(self))
            }
            None => {
                let bytes =
                    records::end_of_directory(self.entries_emitted, self.entries_size, self.offset);
                debug!(
                    "directory journaled: {} entries, {} bytes at offset {}",
                    self.entries_emitted, self.entries_size, self.offset
                );
                (bytes, JournalStep::Done)
            }
        }
    }

    /// Successful entry accumulators, for assertions.
    #[cfg(test)]
    pub(crate) fn encoded_infos(&self) -> Vec<super::encode::EntryInfo> {
        self.remaining
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                EntryOutcome::Encoded(info) => Some(*info),
                EntryOutcome::Failed { .. } => None,
            })
            .collect()
    }
}
