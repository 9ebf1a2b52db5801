//! INIT handshake used to recognise the controller among serial ports.
//!
//! Each candidate goes through the same fixed sequence:
//!
//! ```text
//! open (2 s read / 2 s write timeout)
//!   -> wait 4 s while the board reboots
//!   -> send "INIT/#/"
//!   -> read line 1 (device name) and line 2 (status)
//!   -> status must contain "OK" and "/#/"
//! ```
//!
//! Any failure along the way rejects the candidate and the next one is tried.
//! Candidates are probed one at a time, in enumeration order, and the port is
//! closed again before the next attempt begins.

use crate::cache::CachedPortRecord;
use crate::error::{Error, Result};
use crate::port::{DEFAULT_BAUD_RATE, Port, PortInfo, PortOpener, SerialConfig};
use crate::protocol::{LineReader, command, contains_sentinel, encode_command};
use log::{debug, info, warn};
use std::thread;
use std::time::Duration;

/// Read timeout while probing a candidate.
pub const PROBE_READ_TIMEOUT: Duration = Duration::from_millis(2000);

/// Write timeout while probing a candidate.
pub const PROBE_WRITE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Wait after opening a port before talking to the device.
///
/// Opening the port resets the board; the protocol is undefined until it has
/// finished booting.
pub const SETTLE_DELAY: Duration = Duration::from_millis(4000);

/// Marker the status line must contain for a successful handshake.
const STATUS_OK: &str = "OK";

/// Check the status line of an INIT reply.
///
/// Both `OK` and the sentinel must appear somewhere in the line; their order
/// and position are not checked.
pub fn validate_handshake(status_line: &str) -> bool {
    status_line.contains(STATUS_OK) && contains_sentinel(status_line)
}

/// Result of probing one candidate.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The device answered the handshake.
    Validated(CachedPortRecord),
    /// The candidate is not usable; the reason is kept for reporting.
    Rejected(Error),
}

/// Progress notifications emitted while probing candidates.
#[derive(Debug)]
pub enum ProbeEvent<'a> {
    /// About to probe a port.
    Testing {
        /// Port name.
        port: &'a str,
    },
    /// The port answered the handshake.
    Validated {
        /// Port name.
        port: &'a str,
        /// Device name from the INIT reply.
        device_name: &'a str,
    },
    /// The port was rejected.
    Rejected {
        /// Port name.
        port: &'a str,
        /// Why it was rejected.
        reason: &'a Error,
    },
}

/// Probes candidate ports with the INIT handshake.
pub struct HandshakeProber<O> {
    opener: O,
    baud_rate: u32,
    settle_delay: Duration,
}

impl<O: PortOpener> HandshakeProber<O> {
    /// Create a prober using the default baud rate and settle delay.
    pub fn new(opener: O) -> Self {
        Self {
            opener,
            baud_rate: DEFAULT_BAUD_RATE,
            settle_delay: SETTLE_DELAY,
        }
    }

    /// Use a different baud rate.
    #[must_use]
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Use a different settle delay.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Baud rate used for candidate ports.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Probe a single port.
    ///
    /// The port is always closed before this returns.
    pub fn probe_port(&self, port_name: &str) -> ProbeOutcome {
        let config = SerialConfig::new(port_name, self.baud_rate)
            .with_read_timeout(Some(PROBE_READ_TIMEOUT))
            .with_write_timeout(PROBE_WRITE_TIMEOUT);

        let mut port = match self
            .opener
            .open(&config)
        {
            Ok(port) => port,
            Err(e) => return ProbeOutcome::Rejected(e),
        };

        debug!("Opened {port_name}, waiting {:?} for the device", self.settle_delay);
        thread::sleep(self.settle_delay);

        let result = handshake(&mut port);
        if let Err(e) = port.close() {
            warn!("Failed to close {port_name}: {e}");
        }

        match result {
            Ok(device_name) => ProbeOutcome::Validated(CachedPortRecord::new(port_name, device_name)),
            Err(e) => ProbeOutcome::Rejected(e),
        }
    }

    /// Probe `ports` in order and return the first one that validates.
    ///
    /// Later candidates are not touched once one has validated.
    pub fn probe_candidates(
        &self,
        ports: &[PortInfo],
        observer: &mut dyn FnMut(&ProbeEvent<'_>),
    ) -> Option<CachedPortRecord> {
        for candidate in ports {
            let port = candidate
                .name
                .as_str();
            observer(&ProbeEvent::Testing { port });

            match self.probe_port(port) {
                ProbeOutcome::Validated(record) => {
                    info!("Device {:?} answered on {port}", record.device_name);
                    observer(&ProbeEvent::Validated {
                        port,
                        device_name: &record.device_name,
                    });
                    return Some(record);
                },
                ProbeOutcome::Rejected(reason) => {
                    debug!("Rejected {port}: {reason}");
                    observer(&ProbeEvent::Rejected {
                        port,
                        reason: &reason,
                    });
                },
            }
        }
        None
    }
}

/// Send INIT and read the two-line acknowledgement; returns the device name.
fn handshake<P: Port>(port: &mut P) -> Result<String> {
    port.write_all_bytes(&encode_command(command::INIT))?;

    let mut reader = LineReader::new(port);
    let device_name = reader.read_line()?;
    let status = reader.read_line()?;

    if !validate_handshake(&status) {
        return Err(Error::MalformedHandshake(status));
    }
    Ok(device_name)
}
