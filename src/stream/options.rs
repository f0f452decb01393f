//! Stream configuration options.

use crate::codec;

/// Policy applied when an entry's source fails to resolve or fails mid-read.
///
/// Fixed for the lifetime of a stream. Manifest validation errors are not
/// subject to this policy; they always fail [`ZipStream::start`](crate::ZipStream::start).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Abort the whole stream on the first source failure.
    ///
    /// Bytes already emitted (including any partial payload of the failing
    /// entry) have been handed to the transport and stand; the resulting
    /// archive may be truncated or structurally incomplete past that
    /// point. This is the accepted trade-off of unbuffered streaming.
    #[default]
    Halt,

    /// Record the offending entry as failed and keep streaming.
    ///
    /// The entry is excluded from the central directory. Bytes already
    /// emitted for it (if any) remain as unreferenced filler, so archives
    /// produced this way are not guaranteed minimal, but they stay
    /// parseable.
    Skip,
}

/// Options for a [`ZipStream`](crate::ZipStream), builder-style.
///
/// # Example
///
/// ```rust
/// use zipflow::{ErrorPolicy, StreamOptions};
///
/// let options = StreamOptions::new().on_error(ErrorPolicy::Skip).level(9);
/// ```
#[derive(Debug, Clone)]
pub struct StreamOptions {
    pub(crate) on_error: ErrorPolicy,
    pub(crate) level: u32,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::Halt,
            level: codec::DEFAULT_LEVEL,
        }
    }
}

impl StreamOptions {
    /// Creates options with the defaults: [`ErrorPolicy::Halt`], level 6.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the partial-failure policy.
    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    /// Sets the deflate compression level (0-9, clamped).
    pub fn level(mut self, level: u32) -> Self {
        self.level = level.min(9);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = StreamOptions::new();
        assert_eq!(opts.on_error, ErrorPolicy::Halt);
        assert_eq!(opts.level, 6);
    }

    #[test]
    fn test_builder() {
        let opts = StreamOptions::new().on_error(ErrorPolicy::Skip).level(100);
        assert_eq!(opts.on_error, ErrorPolicy::Skip);
        assert_eq!(opts.level, 9); // clamped
    }
}
