//! Reusable raw-deflate compression context.

use flate2::{Compress, Compression, FlushCompress, Status};

use crate::Result;

/// Default compression level (0-9 scale, balanced).
pub const DEFAULT_LEVEL: u32 = 6;

/// Output is grown in steps of this size while a call makes progress.
const OUTPUT_CHUNK: usize = 4096;

/// A reusable raw-deflate encoder context.
///
/// Unlike the `flate2` writer adapters, this wraps the low-level
/// [`Compress`] state directly so one allocation serves every entry in a
/// stream: [`reset`](Self::reset) rewinds the dictionary and counters
/// without reallocating. The stream produced is raw deflate (no zlib
/// framing), as ZIP's method 8 requires.
///
/// Usage per entry is strictly `compress_chunk`* then `finish` once;
/// callers must `reset` before reusing the context for the next entry.
pub struct DeflateContext {
    ctx: Compress,
}

impl std::fmt::Debug for DeflateContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeflateContext")
            .field("total_in", &self.ctx.total_in())
            .field("total_out", &self.ctx.total_out())
            .finish()
    }
}

impl DeflateContext {
    /// Creates a new context with the given compression level (clamped to 0-9).
    pub fn new(level: u32) -> Self {
        Self {
            // false = raw deflate, no zlib header/trailer
            ctx: Compress::new(Compression::new(level.min(9)), false),
        }
    }

    /// Rewinds the context to its initial state for the next entry.
    pub fn reset(&mut self) {
        self.ctx.reset();
    }

    /// Compresses one input chunk in continuation mode.
    ///
    /// Consumes the entire input and returns whatever compressed bytes the
    /// deflater produced for it, which may legitimately be empty while data
    /// sits in the deflate window.
    pub fn compress_chunk(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(input.len() / 2 + 64);
        let mut consumed = 0usize;
        while consumed < input.len() {
            if out.capacity() == out.len() {
                out.reserve(OUTPUT_CHUNK);
            }
            let before = self.ctx.total_in();
            self.ctx
                .compress_vec(&input[consumed..], &mut out, FlushCompress::None)?;
            consumed += (self.ctx.total_in() - before) as usize;
        }
        Ok(out)
    }

    /// Finishes the current entry's deflate stream.
    ///
    /// Flushes everything buffered in the deflate window and terminates the
    /// stream; the returned bytes complete the entry's compressed payload.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(OUTPUT_CHUNK);
        loop {
            if out.capacity() == out.len() {
                out.reserve(OUTPUT_CHUNK);
            }
            match self.ctx.compress_vec(&[], &mut out, FlushCompress::Finish)? {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => continue,
            }
        }
        Ok(out)
    }
}
