//! Padded source storage.
//!
//! The reader wants two guarantees from its backing store: a NUL byte
//! directly after the content (so end-of-input falls out of ordinary byte
//! dispatch instead of bounds checks), and enough zeroed tail padding that
//! small fixed lookaheads never index out of bounds. [`SourceBuffer`]
//! provides both by copying the source into an allocation rounded up to a
//! 64-byte multiple.

/// Padding granularity; one cache line of zeroed tail is always present.
const PAD_ALIGN: usize = 64;

/// Source bytes plus sentinel and zeroed padding.
///
/// Content occupies `0..len`; byte `len` is the NUL sentinel; everything
/// after it up to the allocation boundary is zero.
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    bytes: Vec<u8>,
    /// Content length, excluding the sentinel and padding.
    len: u32,
}

impl SourceBuffer {
    /// Copy `source` into a padded, sentinel-terminated allocation.
    ///
    /// Offsets throughout the front end are `u32`, so sources past
    /// `u32::MAX` bytes are rejected outright.
    pub fn new(source: &str) -> Self {
        let len = u32::try_from(source.len()).unwrap_or_else(|_| {
            panic!("source of {} bytes exceeds the u32 offset space", source.len())
        });
        let padded = source
            .len()
            .checked_add(PAD_ALIGN)
            .map(|n| n / PAD_ALIGN * PAD_ALIGN)
            .unwrap_or(source.len() + 1);
        let mut bytes = Vec::with_capacity(padded);
        bytes.extend_from_slice(source.as_bytes());
        bytes.resize(padded, 0);
        SourceBuffer { bytes, len }
    }

    /// Content bytes only.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Content plus sentinel and padding; indexing past [`source_len`]
    /// (up to the allocation boundary) reads zeros.
    ///
    /// [`source_len`]: Self::source_len
    #[inline]
    pub(crate) fn padded(&self) -> &[u8] {
        &self.bytes
    }

    /// Content length in bytes.
    #[inline]
    pub fn source_len(&self) -> u32 {
        self.len
    }

    /// Content as text; the buffer was built from `&str`, so this cannot
    /// fail.
    #[allow(
        unsafe_code,
        reason = "content bytes are copied verbatim from a &str; re-validating on every call would put a UTF-8 scan on hot paths"
    )]
    pub fn as_str(&self) -> &str {
        // SAFETY: `new` copies from a `&str` unchanged.
        unsafe { std::str::from_utf8_unchecked(self.as_bytes()) }
    }

    /// Text between two offsets. Both must lie within the content and on
    /// character boundaries, which holds for offsets the reader hands out.
    #[allow(
        unsafe_code,
        reason = "same justification as as_str; reader offsets always sit on character boundaries"
    )]
    pub fn slice(&self, start: u32, end: u32) -> &str {
        debug_assert!(start <= end && end <= self.len);
        // SAFETY: see as_str.
        unsafe { std::str::from_utf8_unchecked(&self.bytes[start as usize..end as usize]) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_round_trips() {
        let buffer = SourceBuffer::new("class A {}");
        assert_eq!(buffer.as_bytes(), b"class A {}");
        assert_eq!(buffer.as_str(), "class A {}");
        assert_eq!(buffer.source_len(), 10);
    }

    #[test]
    fn sentinel_and_padding_are_zero() {
        let buffer = SourceBuffer::new("xy");
        let padded = buffer.padded();
        assert!(padded[2..].iter().all(|&b| b == 0));
        assert_eq!(padded.len() % PAD_ALIGN, 0);
    }

    #[test]
    fn empty_source_still_has_a_sentinel() {
        let buffer = SourceBuffer::new("");
        assert_eq!(buffer.source_len(), 0);
        assert_eq!(buffer.padded()[0], 0);
        assert!(buffer.as_str().is_empty());
    }

    #[test]
    fn allocation_rounds_to_pad_boundary() {
        // 63 content bytes leave exactly one byte for the sentinel
        let buffer = SourceBuffer::new(&"x".repeat(63));
        assert_eq!(buffer.padded().len(), 64);
        // one more content byte forces a second block
        let buffer = SourceBuffer::new(&"x".repeat(64));
        assert_eq!(buffer.padded().len(), 128);
        assert_eq!(buffer.padded()[64], 0);
    }

    #[test]
    fn slicing() {
        let buffer = SourceBuffer::new("int value;");
        assert_eq!(buffer.slice(0, 3), "int");
        assert_eq!(buffer.slice(4, 9), "value");
        assert_eq!(buffer.slice(9, 9), "");
    }
}
