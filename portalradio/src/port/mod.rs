//! Port abstraction for serial communication with the controller.
//!
//! The protocol layers (framing, handshake probing, command sessions) only
//! ever see the traits defined here, so they can be driven by an in-memory
//! transport in tests and by the `serialport` crate on real hardware.
//!
//! ```text
//! +------------------------------+
//! |  probe / session / discovery |
//! +---------------+--------------+
//!                 |
//!                 v
//! +---------------+--------------+
//! | Port / PortOpener /          |
//! | PortEnumerator traits        |
//! +---------------+--------------+
//!                 |
//!                 v
//! +---------------+--------------+
//! |  NativeSerial (serialport)   |
//! +------------------------------+
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use portalradio::port::{NativeSerial, PortEnumerator};
//!
//! fn main() -> portalradio::Result<()> {
//!     for port in NativeSerial.list_ports()? {
//!         println!("{}", port.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod native;

use std::io::{Read, Write};
use std::time::Duration;

use crate::error::Result;

/// Baud rate the controller firmware talks at.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Serial port configuration.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Port name/path (e.g., "/dev/ttyACM0", "COM3").
    pub port_name: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Read timeout. `None` waits indefinitely for data.
    pub read_timeout: Option<Duration>,
    /// Write timeout.
    pub write_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Some(Duration::from_millis(2000)),
            write_timeout: Duration::from_millis(2000),
        }
    }
}

impl SerialConfig {
    /// Create a new configuration with port name and baud rate.
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            ..Default::default()
        }
    }

    /// Set the read timeout (`None` for no ceiling).
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the write timeout.
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// Serial port information, as supplied by a [`PortEnumerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortInfo {
    /// Port name/path.
    pub name: String,
    /// USB vendor ID (if available).
    pub vid: Option<u16>,
    /// USB product ID (if available).
    pub pid: Option<u16>,
    /// Manufacturer string (if available).
    pub manufacturer: Option<String>,
    /// Product string (if available).
    pub product: Option<String>,
    /// Serial number (if available).
    pub serial_number: Option<String>,
}

impl PortInfo {
    /// Port info carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vid: None,
            pid: None,
            manufacturer: None,
            product: None,
            serial_number: None,
        }
    }
}

/// An open, exclusively owned serial connection.
///
/// Dropping a port releases it; [`Port::close`] does the same explicitly and
/// may be called more than once.
pub trait Port: Read + Write + Send {
    /// Get the port name/path.
    fn name(&self) -> &str;

    /// Get the configured read timeout (`None` means no ceiling).
    fn read_timeout(&self) -> Option<Duration>;

    /// Close the port and release resources.
    ///
    /// After calling this method, the port cannot be used for further I/O.
    fn close(&mut self) -> Result<()>;

    /// Write all bytes, blocking until complete.
    fn write_all_bytes(&mut self, buf: &[u8]) -> Result<()> {
        std::io::Write::write_all(self, buf)?;
        std::io::Write::flush(self)?;
        Ok(())
    }
}

/// Source of candidate ports, in the order they should be probed.
pub trait PortEnumerator {
    /// List all available serial ports.
    fn list_ports(&self) -> Result<Vec<PortInfo>>;
}

/// Opens ports from a [`SerialConfig`].
pub trait PortOpener {
    /// Port type produced by this opener.
    type Port: Port;

    /// Open the port described by `config`.
    fn open(&self, config: &SerialConfig) -> Result<Self::Port>;
}

impl<T: PortEnumerator + ?Sized> PortEnumerator for &T {
    fn list_ports(&self) -> Result<Vec<PortInfo>> {
        (**self).list_ports()
    }
}

impl<T: PortOpener + ?Sized> PortOpener for &T {
    type Port = T::Port;

    fn open(&self, config: &SerialConfig) -> Result<Self::Port> {
        (**self).open(config)
    }
}

pub use native::{NativePort, NativeSerial};
