//! Pattern buffer with efficient tail-search optimization.
//!
//! Only the last N bytes of the buffer are searched for prompt patterns,
//! rather than the entire output. For large outputs (e.g., a full
//! `show interfaces` on a 48-port stack), this keeps prompt detection cheap.

use std::fmt;

use bytes::{Bytes, BytesMut};
use regex::bytes::Regex;

/// Buffer for accumulating output and efficiently searching for patterns.
///
/// Incoming data is run through a VT parser so ANSI escape sequences never
/// reach the buffer, even when a sequence is split across two reads.
pub struct PatternBuffer {
    /// The accumulated output buffer.
    buffer: BytesMut,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,

    /// Escape sequence parser, kept across chunks.
    parser: vte::Parser,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    ///
    /// # Arguments
    ///
    /// * `search_depth` - Number of bytes from the end to search for patterns.
    ///   Default recommendation is 1000 bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            search_depth,
            parser: vte::Parser::new(),
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let mut printable = Printable(&mut self.buffer);
        self.parser.advance(&mut printable, data);
    }

    /// Search only the tail of the buffer for the pattern.
    ///
    /// Returns the `(start, end)` of the match as offsets into the whole
    /// buffer.
    pub fn search_tail(&self, pattern: &Regex) -> Option<(usize, usize)> {
        let start = self.tail_start();
        pattern
            .find(&self.buffer[start..])
            .map(|m| (start + m.start(), start + m.end()))
    }

    /// Check if the tail contains a pattern match.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        self.search_tail(pattern).is_some()
    }

    /// Take everything up to `end` and keep the remainder buffered.
    pub fn take_through(&mut self, end: usize) -> Bytes {
        let end = end.min(self.buffer.len());
        self.buffer.split_to(end).freeze()
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer contents as a string (lossy UTF-8 conversion).
    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Get the search depth setting.
    pub fn search_depth(&self) -> usize {
        self.search_depth
    }

    fn tail_start(&self) -> usize {
        let mut start = self.buffer.len().saturating_sub(self.search_depth);
        // Never start the window in the middle of a UTF-8 sequence.
        while start > 0 && start < self.buffer.len() && (self.buffer[start] & 0xC0) == 0x80 {
            start -= 1;
        }
        start
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("len", &self.buffer.len())
            .field("search_depth", &self.search_depth)
            .finish()
    }
}

/// VT performer that keeps printable text and line control characters.
struct Printable<'a>(&'a mut BytesMut);

impl vte::Perform for Printable<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.0.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.0.extend_from_slice(&[byte]);
        }
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
    fn test_ansi_split_across_chunks() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"before\x1b[3");
        buffer.extend(b"2mafter");
        assert_eq!(buffer.as_slice(), b"beforeafter");
    }

    #[test]
    fn test_line_endings_kept() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"line one\r\nline two\n");
        assert_eq!(buffer.as_slice(), b"line one\r\nline two\n");
    }

    #[test]
    fn test_tail_search() {
        let mut buffer = PatternBuffer::new(20);

        buffer.extend(&[b'x'; 100]);
        buffer.extend(b"\nrouter#");

        let pattern = Regex::new(r"router#").unwrap();
        let (start, end) = buffer.search_tail(&pattern).unwrap();
        assert_eq!(&buffer.as_slice()[start..end], b"router#");
    }

    #[test]
    fn test_tail_search_not_in_tail() {
        let mut buffer = PatternBuffer::new(10);

        buffer.extend(b"router#");
        buffer.extend(&[b'x'; 100]);

        let pattern = Regex::new(r"router#").unwrap();
        assert!(!buffer.tail_contains(&pattern));
    }

    #[test]
    fn test_take_through_keeps_remainder() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"output\nrouter#trailing");
        let pattern = Regex::new(r"router#").unwrap();
        let (_, end) = buffer.search_tail(&pattern).unwrap();

        assert_eq!(&buffer.take_through(end)[..], b"output\nrouter#");
        assert_eq!(buffer.as_slice(), b"trailing");
    }

    #[test]
    fn test_take_clears_buffer() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"test data");
        assert_eq!(&buffer.take()[..], b"test data");
        assert!(buffer.is_empty());
    }
}
