//! Streaming segmentation of LISTSERV notebook logs into message transcripts.
//!
//! Reads the log line-by-line and emits one transcript per separator-bounded
//! block. Tolerant of malformed input: bytes that are not valid UTF-8 are
//! decoded best-effort instead of aborting the file.

use std::io::BufRead;

use crate::error::{Result, UnpackError};

/// The literal separator line between message transcripts: 73 `=` characters.
pub const EMAIL_SEP: &str =
    "=========================================================================";

/// Lazy iterator over the message transcripts of one log file.
///
/// Lines are accumulated verbatim (original terminators included) until a
/// separator line is seen, at which point the accumulated transcript is
/// emitted. Two deliberate edge cases, matching the archive format:
///
/// - A separator with nothing accumulated is a no-op; empty transcripts are
///   never emitted.
/// - Trailing content after the last separator is discarded at end of input,
///   not emitted.
///
/// Single-pass and forward-only; consuming the iterator exhausts the source.
pub struct LogSegmenter<R> {
    reader: R,
    buffer: String,
    line_buf: Vec<u8>,
}

impl<R: BufRead> LogSegmenter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::new(),
            line_buf: Vec::with_capacity(4096),
        }
    }
}

impl<R: BufRead> Iterator for LogSegmenter<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buf.clear();
            match self.reader.read_until(b'\n', &mut self.line_buf) {
                // EOF: any remaining accumulation is dropped.
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(UnpackError::from(e))),
            }

            let line = decode_line(&self.line_buf);
            if line.trim() == EMAIL_SEP {
                if !self.buffer.is_empty() {
                    return Some(Ok(std::mem::take(&mut self.buffer)));
                }
            } else {
                self.buffer.push_str(&line);
            }
        }
    }
}

/// Decode one raw line to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every
/// byte), so a single bad line can never abort the whole file.
fn decode_line(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => std::borrow::Cow::Borrowed(s),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            std::borrow::Cow::Owned(decoded.into_owned())
        }
    }
}
