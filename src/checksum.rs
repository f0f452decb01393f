//! Checksum computation utilities.
//!
//! ZIP archives verify entry data with CRC-32 using the IEEE 802.3
//! polynomial. The checksum recorded in a data descriptor and in the
//! central directory covers the *uncompressed* bytes of an entry, in read
//! order, so the [`Crc32`] accumulator is updated on every source chunk
//! before compression.
//!
//! # Example
//!
//! ```rust
//! use zipflow::checksum::Crc32;
//!
//! let mut crc = Crc32::new();
//! crc.update(b"Hello, ");
//! crc.update(b"World!");
//! assert_eq!(crc.finalize(), 0xEC4AC3D0);
//!
//! // One-shot computation
//! assert_eq!(Crc32::compute(b"Hello, World!"), 0xEC4AC3D0);
//! ```

/// CRC-32 checksum calculator (IEEE 802.3 polynomial).
///
/// Wraps `crc32fast` and supports incremental updates; `finalize` does not
/// consume the accumulator, so the running value can be observed at any
/// point.
#[derive(Clone, Default)]
pub struct Crc32 {
    hasher: crc32fast::Hasher,
}

impl std::fmt::Debug for Crc32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crc32")
            .field("current", &self.hasher.clone().finalize())
            .finish()
    }
}

impl Crc32 {
    /// Creates a new CRC-32 calculator.
    pub fn new() -> Self {
        Self {
            hasher: crc32fast::Hasher::new(),
        }
    }

    /// Updates the checksum with additional data.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Returns the checksum over everything fed so far.
    pub fn finalize(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Resets the checksum to its initial state.
    pub fn reset(&mut self) {
        self.hasher.reset();
    }

    /// Computes the checksum of a single slice in one call.
    pub fn compute(data: &[u8]) -> u32 {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_known_value() {
        // "123456789" is the standard CRC-32 check vector
        assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
    }

    #[test]
    fn test_crc32_empty() {
        assert_eq!(Crc32::compute(b""), 0);
        assert_eq!(Crc32::new().finalize(), 0);
    }

    #[test]
    fn test_crc32_incremental_matches_oneshot() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let mut crc = Crc32::new();
        for chunk in data.chunks(7) {
            crc.update(chunk);
        }
        assert_eq!(crc.finalize(), Crc32::compute(data));
    }

    #[test]
    fn test_crc32_finalize_is_non_destructive() {
        let mut crc = Crc32::new();
        crc.update(b"partial");
        let first = crc.finalize();
        assert_eq!(crc.finalize(), first);
        crc.update(b" more");
        assert_ne!(crc.finalize(), first);
    }

    #[test]
    fn test_crc32_reset() {
        let mut crc = Crc32::new();
        crc.update(b"stale");
        crc.reset();
        crc.update(b"123456789");
        assert_eq!(crc.finalize(), 0xCBF43926);
    }
}
