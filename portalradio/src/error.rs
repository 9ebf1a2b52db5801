//! Error types for portalradio.

use std::io;
use thiserror::Error;

/// Result type for portalradio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for portalradio operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (serial port, cache file).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serial port error outside of opening a port (enumeration, settings).
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// The port could not be opened.
    #[error("Failed to open {port}: {source}")]
    PortOpen {
        /// Port name/path.
        port: String,
        /// Underlying serial error.
        #[source]
        source: serialport::Error,
    },

    /// No line arrived before the transport read timeout elapsed.
    #[error("Timed out waiting for a response line")]
    ReadTimeout,

    /// The transport reported end of stream before a frame was complete.
    #[error("Serial stream ended before the response was complete")]
    EndOfStream,

    /// The INIT acknowledgement did not look like the expected protocol.
    #[error("Malformed handshake response: {0:?}")]
    MalformedHandshake(String),

    /// No enumerated port answered the handshake.
    #[error("No device answering the handshake was found")]
    NoDevice,

    /// The session has already been closed.
    #[error("Session is closed")]
    SessionClosed,

    /// I/O failure during an interactive session; the session is over.
    #[error("Session aborted: {0}")]
    Session(#[source] Box<Error>),
}

impl Error {
    /// Classify a transport `io::Error` into the protocol error taxonomy.
    pub(crate) fn from_read(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::ReadTimeout,
            io::ErrorKind::UnexpectedEof => Self::EndOfStream,
            _ => Self::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_read_classifies_timeouts() {
        let err = Error::from_read(io::Error::new(io::ErrorKind::TimedOut, "timeout"));
        assert!(matches!(err, Error::ReadTimeout));

        let err = Error::from_read(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(matches!(err, Error::EndOfStream));

        let err = Error::from_read(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_session_error_display_includes_cause() {
        let err = Error::Session(Box::new(Error::EndOfStream));
        assert_eq!(
            err.to_string(),
            "Session aborted: Serial stream ended before the response was complete"
        );
    }
}
