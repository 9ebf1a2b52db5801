//! Line-buffered reading over a raw serial byte stream.
//!
//! Serial drivers hand back whatever bytes happen to be available, so a
//! single `read` may contain half a line or several lines. [`LineReader`]
//! hides that chunking from the framing logic.

use crate::error::{Error, Result};
use log::trace;
use std::io::{self, Read};

const CHUNK_SIZE: usize = 256;

/// Reads newline-terminated text lines from a byte stream.
///
/// Lines end at `\n`; a trailing `\r` is stripped. Bytes are decoded lossily
/// as UTF-8. Buffered bytes survive a timeout, so a later call resumes where
/// the previous one stopped.
pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
    eof: bool,
}

impl<R: Read> LineReader<R> {
    /// Wrap a byte source.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            eof: false,
        }
    }

    /// Read the next line, without its terminator.
    ///
    /// At end of stream a non-empty partial line is returned as the last
    /// line; after that, [`Error::EndOfStream`] is returned. A transport
    /// timeout yields [`Error::ReadTimeout`].
    pub fn read_line(&mut self) -> Result<String> {
        loop {
            if let Some(pos) = self
                .pending
                .iter()
                .position(|&b| b == b'\n')
            {
                let mut line: Vec<u8> = self
                    .pending
                    .drain(..=pos)
                    .collect();
                line.pop();
                return Ok(Self::finish_line(&line));
            }

            if self.eof {
                if self
                    .pending
                    .is_empty()
                {
                    return Err(Error::EndOfStream);
                }
                let line = std::mem::take(&mut self.pending);
                return Ok(Self::finish_line(&line));
            }

            self.fill()?;
        }
    }

    /// Number of bytes received but not yet returned as a line.
    pub fn buffered(&self) -> usize {
        self.pending
            .len()
    }

    /// Get a reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Get a mutable reference to the underlying source (e.g. to write).
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    fn fill(&mut self) -> Result<()> {
        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            match self
                .inner
                .read(&mut chunk)
            {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                },
                Ok(n) => {
                    trace!("RX {:?}", String::from_utf8_lossy(&chunk[..n]));
                    self.pending
                        .extend_from_slice(&chunk[..n]);
                    return Ok(());
                },
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
                Err(e) => return Err(Error::from_read(e)),
            }
        }
    }

    fn finish_line(bytes: &[u8]) -> String {
        let bytes = bytes
            .strip_suffix(b"\r")
            .unwrap_or(bytes);
        String::from_utf8_lossy(bytes).into_owned()
    }
}
