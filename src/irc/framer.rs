//! # Line Framer
//!
//! Splits the inbound byte stream into CRLF-terminated lines and frames
//! outbound lines with exactly one CRLF.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Optional maximum line length
//! - 1.0.0: Initial framer with partial-line carry-over

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;

/// Framing errors
#[derive(Debug, thiserror::Error)]
pub enum FramerError {
    #[error("unterminated line exceeds maximum length ({0} bytes)")]
    LineTooLong(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Buffers raw inbound bytes and yields complete lines.
///
/// Bytes after the last terminator are kept and prefixed to the next feed.
/// Empty lines are yielded as empty strings.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: BytesMut,
    max_line_length: Option<usize>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject unterminated fragments longer than `max` bytes
    pub fn with_max_line_length(max: usize) -> Self {
        LineFramer {
            buf: BytesMut::new(),
            max_line_length: Some(max),
        }
    }

    /// Append `bytes` and return the lines they complete.
    ///
    /// The returned iterator drains lines lazily; lines it does not consume
    /// stay buffered for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Lines<'_>, FramerError> {
        self.buf.extend_from_slice(bytes);

        if let Some(max) = self.max_line_length {
            let tail_start = self
                .buf
                .windows(2)
                .rposition(|w| w == b"\r\n")
                .map_or(0, |pos| pos + 2);
            if self.buf.len() - tail_start > max {
                self.buf.clear();
                return Err(FramerError::LineTooLong(max));
            }
        }

        Ok(Lines { buf: &mut self.buf })
    }

    /// Bytes held back waiting for a terminator
    pub fn remaining(&self) -> &[u8] {
        &self.buf
    }
}

/// Lines completed by one [`LineFramer::feed`] call
pub struct Lines<'a> {
    buf: &'a mut BytesMut,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        split_line(self.buf)
    }
}

/// Take the first CRLF-terminated line off the front of `buf`.
fn split_line(buf: &mut BytesMut) -> Option<String> {
    let pos = buf.windows(2).position(|w| w == b"\r\n")?;
    let line = buf.split_to(pos);
    buf.advance(2);
    Some(String::from_utf8_lossy(&line).into_owned())
}

/// Outbound codec: one line in, one CRLF-terminated line out.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineCodec;

impl Encoder<String> for LineCodec {
    type Error = FramerError;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let line = item.trim_end_matches(['\r', '\n']);
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
