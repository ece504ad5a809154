//! Inbound frame reassembly.
//!
//! Responses stream in as notification chunks with no length prefix or
//! delimiter; the only framing is that each logical message is exactly
//! one JSON value. The buffer therefore re-attempts a full parse after
//! every chunk: failure means the frame is still partial (the expected
//! steady state mid-response), success yields the frame and resets the
//! buffer.
//!
//! The peer delivers chunks in order and the protocol is strictly
//! request-then-response, so at most one frame is ever pending.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tracing::trace;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Maximum bytes buffered before declaring the frame malformed.
///
/// Responses are small JSON objects; anything approaching this limit
/// means the stream can no longer converge on a parseable value.
pub const MAX_ASSEMBLY_BYTES: usize = 4096;

// ============================================================================
// AssemblyBuffer
// ============================================================================

/// Accumulates notification chunks until they parse as one JSON value.
#[derive(Debug)]
pub struct AssemblyBuffer {
    /// Bytes received since the last complete frame.
    buf: Vec<u8>,
    /// Chunks consumed since the last complete frame.
    chunks_since_frame: usize,
    /// Buffered-size cap.
    max_len: usize,
}

impl Default for AssemblyBuffer {
    fn default() -> Self {
        Self::new(MAX_ASSEMBLY_BYTES)
    }
}

impl AssemblyBuffer {
    /// Creates an empty buffer with the given size cap.
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            chunks_since_frame: 0,
            max_len,
        }
    }

    /// Appends one chunk and attempts frame extraction.
    ///
    /// Returns `Ok(Some(frame))` when the buffered bytes form a complete
    /// JSON value (the buffer is reset), `Ok(None)` while the frame is
    /// still partial.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] once the buffered size exceeds
    /// the cap without a successful parse; the buffer is reset so a
    /// subsequent exchange starts clean.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Option<Value>> {
        self.buf.extend_from_slice(chunk);
        self.chunks_since_frame += 1;

        match serde_json::from_slice::<Value>(&self.buf) {
            Ok(frame) => {
                trace!(
                    chunks = self.chunks_since_frame,
                    bytes = self.buf.len(),
                    "Frame extracted"
                );
                self.reset();
                Ok(Some(frame))
            }
            Err(_) if self.buf.len() > self.max_len => {
                let buffered = self.buf.len();
                self.reset();
                Err(Error::malformed_frame(buffered))
            }
            Err(_) => Ok(None),
        }
    }

    /// Returns `true` if no partial frame is buffered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Chunks consumed since the last complete frame.
    #[inline]
    #[must_use]
    pub fn chunks_since_frame(&self) -> usize {
        self.chunks_since_frame
    }

    /// Discards any partial frame.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.chunks_since_frame = 0;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_single_chunk_frame() {
        let mut buffer = AssemblyBuffer::default();

        let frame = buffer
            .push(br#"{"Result":"Success"}"#)
            .expect("push")
            .expect("complete frame");

        assert_eq!(frame, json!({"Result": "Success"}));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_frame_keeps_buffering() {
        let mut buffer = AssemblyBuffer::default();

        assert!(buffer.push(br#"{"Result":"#).expect("push").is_none());
        assert!(!buffer.is_empty());
        assert_eq!(buffer.chunks_since_frame(), 1);
    }

    #[test]
    fn test_multi_chunk_extraction() {
        // Every intermediate concatenation is invalid JSON; only the full
        // payload parses.
        let payload = json!({"Name": "ATTICFAN-1234", "Model": "Classic"}).to_string();
        let mut buffer = AssemblyBuffer::default();

        let chunks: Vec<&[u8]> = payload.as_bytes().chunks(7).collect();
        let (last, intermediate) = chunks.split_last().expect("chunks");

        for chunk in intermediate {
            assert!(buffer.push(chunk).expect("push").is_none());
        }

        let frame = buffer.push(last).expect("push").expect("complete frame");
        assert_eq!(frame["Name"], "ATTICFAN-1234");
        assert!(buffer.is_empty());
        assert_eq!(buffer.chunks_since_frame(), 0);
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut buffer = AssemblyBuffer::default();

        let first = buffer
            .push(br#"{"Result":"Success"}"#)
            .expect("push")
            .expect("frame");
        let second = buffer
            .push(br#"{"State":"Idle"}"#)
            .expect("push")
            .expect("frame");

        assert_eq!(first["Result"], "Success");
        assert_eq!(second["State"], "Idle");
    }

    #[test]
    fn test_overflow_fails_and_resets() {
        let mut buffer = AssemblyBuffer::new(16);

        // Never-completing JSON: an opening brace followed by filler.
        assert!(buffer.push(b"{").expect("push").is_none());
        let err = buffer.push(&[b' '; 32]).expect_err("overflow");

        assert!(matches!(err, Error::MalformedFrame { buffered: 33 }));
        assert!(buffer.is_empty());

        // The buffer is usable again after the failure.
        let frame = buffer.push(b"{}").expect("push").expect("frame");
        assert_eq!(frame, json!({}));
    }

    #[test]
    fn test_non_object_frames_parse() {
        // The framing rule is "one JSON value", not "one JSON object".
        let mut buffer = AssemblyBuffer::default();
        let frame = buffer.push(b"[1,2,3]").expect("push").expect("frame");
        assert_eq!(frame, json!([1, 2, 3]));
    }
}
