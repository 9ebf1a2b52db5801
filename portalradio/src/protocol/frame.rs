//! Sentinel-delimited framing for the controller's text protocol.
//!
//! ## Wire Format
//!
//! ```text
//! host -> device:  <command text>/#/                (no line break needed)
//! device -> host:  <line>\n
//!                  <line>\n
//!                  <line containing /#/>\n          (end of frame)
//! ```
//!
//! A frame ends at the first line that contains the sentinel anywhere in it,
//! not only at lines that consist of the sentinel alone.

use crate::error::Result;
use crate::protocol::line::LineReader;
use log::trace;
use std::io::Read;

/// Token marking the end of a protocol message in both directions.
pub const SENTINEL: &str = "/#/";

/// Check whether a line carries the frame sentinel.
pub fn contains_sentinel(line: &str) -> bool {
    line.contains(SENTINEL)
}

/// Encode a command for transmission: the text immediately followed by the
/// sentinel.
pub fn encode_command(command: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(command.len() + SENTINEL.len());
    frame.extend_from_slice(command.as_bytes());
    frame.extend_from_slice(SENTINEL.as_bytes());
    frame
}

/// Read one complete response frame.
///
/// Lines are accumulated until one contains [`SENTINEL`]; that line is
/// included. The returned vector is never empty. Fails with
/// [`Error::ReadTimeout`](crate::Error::ReadTimeout) or
/// [`Error::EndOfStream`](crate::Error::EndOfStream) if the transport gives up
/// before the frame is complete.
pub fn decode_response<R: Read>(reader: &mut LineReader<R>) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    loop {
        let line = reader.read_line()?;
        let done = contains_sentinel(&line);
        lines.push(line);
        if done {
            trace!("Frame complete ({} lines)", lines.len());
            return Ok(lines);
        }
    }
}
