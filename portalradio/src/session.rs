//! Interactive command session with the controller.
//!
//! A session owns its port for its whole lifetime. It starts with an INIT
//! exchange to learn the device name, then forwards one command per input
//! line and prints the framed reply:
//!
//! ```text
//! Input: STATUS
//! Portal Radio: [RADIO ON, VOLUME 40, OK /#/]
//! ```
//!
//! Reads have no timeout ceiling since the user sets the pace. Any I/O
//! failure ends the session and closes the port.

use crate::error::{Error, Result};
use crate::port::{Port, PortOpener, SerialConfig};
use crate::protocol::{LineReader, command, decode_response, encode_command};
use log::{debug, trace, warn};
use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

/// Write timeout for session commands; reads have none.
pub const SESSION_WRITE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Prompt shown before each command.
pub const PROMPT: &str = "Input: ";

/// Format a reply the way the session prints it: `<device>: [<line>, ...]`.
pub fn format_reply(device_name: &str, answers: &[String]) -> String {
    format!("{device_name}: [{}]", answers.join(", "))
}

/// Request/response session over an exclusively owned port.
pub struct CommandSession<P: Port> {
    reader: LineReader<P>,
    device_name: String,
    closed: bool,
}

impl<P: Port> CommandSession<P> {
    /// Open `port_name` without a read timeout and start a session on it.
    pub fn open<O>(
        opener: &O,
        port_name: &str,
        baud_rate: u32,
        settle_delay: Duration,
    ) -> Result<Self>
    where
        O: PortOpener<Port = P> + ?Sized,
    {
        let config = SerialConfig::new(port_name, baud_rate)
            .with_read_timeout(None)
            .with_write_timeout(SESSION_WRITE_TIMEOUT);
        let port = opener.open(&config)?;
        Self::start(port, settle_delay)
    }

    /// Start a session on a freshly opened port.
    ///
    /// Waits `settle_delay` for the board to boot, then sends INIT; the first
    /// line of the reply becomes the device name.
    pub fn start(port: P, settle_delay: Duration) -> Result<Self> {
        debug!(
            "Starting session on {} (read timeout {:?}), waiting {settle_delay:?}",
            port.name(),
            port.read_timeout()
        );
        thread::sleep(settle_delay);

        let mut session = Self {
            reader: LineReader::new(port),
            device_name: String::new(),
            closed: false,
        };
        session.execute(command::INIT)?;
        Ok(session)
    }

    /// Name the device announced in its last INIT reply.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Name of the port the session runs on.
    pub fn port_name(&self) -> &str {
        self.reader
            .get_ref()
            .name()
    }

    /// Whether the port has been released.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Send one command and return the lines of its reply frame.
    ///
    /// A command containing `INIT` updates the device name from the first
    /// reply line. An I/O failure closes the session and is returned as
    /// [`Error::Session`].
    pub fn execute(&mut self, input: &str) -> Result<Vec<String>> {
        if self.closed {
            return Err(Error::SessionClosed);
        }

        match self.transact(input) {
            Ok(answers) => {
                if command::is_init(input) {
                    if let Some(first) = answers.first() {
                        self.device_name = first.clone();
                    }
                }
                Ok(answers)
            },
            Err(e) => {
                self.release();
                Err(Error::Session(Box::new(e)))
            },
        }
    }

    /// Run the interactive loop until `exit` or end of input.
    ///
    /// The port is closed when this returns, whatever the outcome.
    pub fn run<I: BufRead, W: Write>(&mut self, input: I, output: W) -> Result<()> {
        let result = self.repl(input, output);
        self.release();
        result
    }

    /// Close the port. Further commands fail with [`Error::SessionClosed`].
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.reader
            .get_mut()
            .close()
    }

    fn repl<I: BufRead, W: Write>(&mut self, mut input: I, mut output: W) -> Result<()> {
        let mut line = String::new();
        loop {
            write!(output, "{PROMPT}")?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                debug!("End of input, leaving session");
                return Ok(());
            }
            let terminal_input = line.trim_end_matches(['\r', '\n']);

            if command::is_exit(terminal_input) {
                debug!("Exit requested");
                return Ok(());
            }

            let answers = self.execute(terminal_input)?;
            writeln!(output, "{}", format_reply(&self.device_name, &answers))?;
        }
    }

    fn transact(&mut self, input: &str) -> Result<Vec<String>> {
        trace!("TX {input:?}");
        self.reader
            .get_mut()
            .write_all_bytes(&encode_command(input))?;
        decode_response(&mut self.reader)
    }

    fn release(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close {}: {e}", self.port_name());
        }
    }
}

impl<P: Port> Drop for CommandSession<P> {
    fn drop(&mut self) {
        self.release();
    }
}
