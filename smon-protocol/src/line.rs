//! Line accumulation for the serial status link.
//!
//! Bytes arrive in arbitrary chunks. The reader collects them until a CR or
//! LF and hands out the trimmed record. Memory use is fixed: once a record
//! exceeds [`MAX_LINE_LEN`] the remaining bytes are counted as lost and the
//! whole record is rejected at its terminator.

use heapless::{String, Vec};

/// Maximum bytes buffered for a single record
pub const MAX_LINE_LEN: usize = 1536;

/// A complete, trimmed, non-empty record
pub type Line = String<MAX_LINE_LEN>;

/// Errors reported for a completed record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Record exceeded [`MAX_LINE_LEN`] and was discarded
    Overlong,
    /// Record was not valid UTF-8
    InvalidUtf8,
}

/// Accumulates serial bytes into newline-delimited records
#[derive(Debug, Clone)]
pub struct LineReader {
    buffer: Vec<u8, MAX_LINE_LEN>,
    /// Set once a byte had to be dropped for the current record
    overflowed: bool,
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LineReader {
    /// Create an empty reader
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
        }
    }

    /// Discard any partially received record
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Number of bytes held for the record in progress
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte to the reader
    ///
    /// Returns `Ok(Some(line))` when a terminator completes a non-empty
    /// record, `Ok(None)` when more bytes are needed (or the record was
    /// blank), or `Err` when the completed record has to be dropped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, LineError> {
        if byte != b'\n' && byte != b'\r' {
            if self.buffer.push(byte).is_err() {
                self.overflowed = true;
            }
            return Ok(None);
        }

        if self.overflowed {
            self.reset();
            return Err(LineError::Overlong);
        }

        let result = match core::str::from_utf8(&self.buffer) {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    Ok(None)
                } else {
                    let mut line = Line::new();
                    // Cannot fail: the trimmed text is no longer than the buffer
                    let _ = line.push_str(text);
                    Ok(Some(line))
                }
            }
            Err(_) => Err(LineError::InvalidUtf8),
        };

        self.buffer.clear();
        result
    }

    /// Drain a chunk of received bytes
    ///
    /// The returned iterator yields every record completed inside `bytes`.
    /// Bytes after the last terminator stay buffered for the next call.
    pub fn drain<'a>(&'a mut self, bytes: &'a [u8]) -> Lines<'a> {
        Lines {
            reader: self,
            bytes: bytes.iter(),
        }
    }
}

/// Iterator over the records completed by one chunk of bytes
pub struct Lines<'a> {
    reader: &'a mut LineReader,
    bytes: core::slice::Iter<'a, u8>,
}

impl Iterator for Lines<'_> {
    type Item = Result<Line, LineError>;

    fn next(&mut self) -> Option<Self::Item> {
        for &byte in self.bytes.by_ref() {
            match self.reader.feed(byte) {
                Ok(Some(line)) => return Some(Ok(line)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}
