//! Pattern buffer with efficient tail-search optimization.
//!
//! Only the last N bytes of unconsumed output are searched for prompt
//! patterns, rather than the entire backlog. For large outputs (a full
//! running configuration, say) this keeps prompt detection cheap.

use bytes::BytesMut;
use regex::bytes::Regex;

/// Buffer of unconsumed device output with pattern search and
/// consume-through-match semantics.
#[derive(Debug)]
pub struct PatternBuffer {
    /// Unconsumed, ANSI-stripped output.
    buffer: BytesMut,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            search_depth,
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = strip_ansi_escapes::strip(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Search the tail of the buffer for a pattern.
    ///
    /// Only the last `search_depth` bytes are scanned. Offsets in the
    /// returned `(start, end)` pair are absolute within the buffer so the
    /// caller can split consumed text at the match boundary.
    pub fn find(&self, pattern: &Regex) -> Option<(usize, usize)> {
        let tail_start = self.buffer.len().saturating_sub(self.search_depth);
        pattern
            .find(&self.buffer[tail_start..])
            .map(|m| (tail_start + m.start(), tail_start + m.end()))
    }

    /// Consume and return the first `at` bytes.
    pub fn take_until(&mut self, at: usize) -> Vec<u8> {
        self.buffer.split_to(at).to_vec()
    }

    /// Consume and return the entire buffer.
    pub fn take_all(&mut self) -> Vec<u8> {
        let len = self.buffer.len();
        self.buffer.split_to(len).to_vec()
    }

    /// Get a reference to the unconsumed contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the search depth setting.
    pub fn search_depth(&self) -> usize {
        self.search_depth
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extend() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"Hello, world!");
        assert_eq!(buffer.as_slice(), b"Hello, world!");
    }

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = PatternBuffer::new(100);
        // Typical ANSI color code: \x1b[32m (green)
        buffer.extend(b"\x1b[32mGreen text\x1b[0m");
        assert_eq!(buffer.as_slice(), b"Green text");
    }

    #[test]
    fn test_tail_search() {
        let mut buffer = PatternBuffer::new(20);

        // Filler, then a prompt at the end
        buffer.extend(&[b'x'; 100]);
        buffer.extend(b"\nrouter#");

        let pattern = Regex::new(r"router#").unwrap();
        assert!(buffer.find(&pattern).is_some());
    }

    #[test]
    fn test_tail_search_not_in_tail() {
        let mut buffer = PatternBuffer::new(10);

        // Prompt first, then enough filler to push it out of the tail
        buffer.extend(b"router#");
        buffer.extend(&[b'x'; 100]);

        let pattern = Regex::new(r"router#").unwrap();
        assert!(buffer.find(&pattern).is_none());
    }

    #[test]
    fn test_find_offsets_are_absolute() {
        let mut buffer = PatternBuffer::new(10);
        buffer.extend(&[b'x'; 50]);
        buffer.extend(b"router#");

        let pattern = Regex::new(r"router#").unwrap();
        let (start, end) = buffer.find(&pattern).unwrap();
        assert_eq!(start, 50);
        assert_eq!(end, 57);
    }

    #[test]
    fn test_consume_at_match_boundary() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"some output\nrouter#");

        let pattern = Regex::new(r"router#").unwrap();
        let (start, end) = buffer.find(&pattern).unwrap();

        let before = buffer.take_until(start);
        assert_eq!(before, b"some output\n");

        let matched = buffer.take_until(end - start);
        assert_eq!(matched, b"router#");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_take_all_clears_buffer() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"test data");
        assert_eq!(buffer.take_all(), b"test data");
        assert!(buffer.is_empty());
    }
}
