//! Native serial port implementation using the `serialport` crate.
//!
//! This module provides the serial port implementation for native platforms
//! (Linux, macOS, Windows, FreeBSD, etc.).

use {
    crate::{
        error::{Error, Result},
        port::{Port, PortEnumerator, PortInfo, PortOpener, SerialConfig},
    },
    log::trace,
    std::{
        io::{self, Read, Write},
        time::Duration,
    },
};

/// Driver-level poll interval used when reads have no timeout ceiling.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Native serial port implementation.
///
/// `serialport` has a single timeout for both directions, so the port swaps
/// between the configured read and write timeouts as needed.
pub struct NativePort {
    port: Option<Box<dyn serialport::SerialPort>>,
    name: String,
    read_timeout: Option<Duration>,
    write_timeout: Duration,
    applied_timeout: Duration,
}

impl NativePort {
    /// Open a serial port with the given configuration.
    ///
    /// The controller always talks 8N1 without flow control.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let initial_timeout = config
            .read_timeout
            .unwrap_or(IDLE_POLL_INTERVAL);

        let port = serialport::new(&config.port_name, config.baud_rate)
            .timeout(initial_timeout)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|source| Error::PortOpen {
                port: config
                    .port_name
                    .clone(),
                source,
            })?;

        trace!(
            "Opened {} at {} baud (read timeout {:?})",
            config.port_name, config.baud_rate, config.read_timeout
        );

        Ok(Self {
            port: Some(port),
            name: config
                .port_name
                .clone(),
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
            applied_timeout: initial_timeout,
        })
    }

    fn inner_mut(&mut self) -> io::Result<&mut Box<dyn serialport::SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "port closed"))
    }

    fn apply_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        if self.applied_timeout != timeout {
            self.inner_mut()?
                .set_timeout(timeout)
                .map_err(io::Error::from)?;
            self.applied_timeout = timeout;
        }
        Ok(())
    }
}

impl Port for NativePort {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    fn close(&mut self) -> Result<()> {
        // Take ownership of the port and let it drop (close)
        if self
            .port
            .take()
            .is_some()
        {
            trace!("Closed {}", self.name);
        }
        Ok(())
    }
}

impl Read for NativePort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let indefinite = self
            .read_timeout
            .is_none();
        self.apply_timeout(
            self.read_timeout
                .unwrap_or(IDLE_POLL_INTERVAL),
        )?;

        let port = self.inner_mut()?;
        loop {
            match port.read(buf) {
                Err(e) if indefinite && e.kind() == io::ErrorKind::TimedOut => {},
                result => return result,
            }
        }
    }
}

impl Write for NativePort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.apply_timeout(self.write_timeout)?;
        self.inner_mut()?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner_mut()?
            .flush()
    }
}

/// Native serial backend: enumerates and opens ports through `serialport`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSerial;

impl PortEnumerator for NativeSerial {
    fn list_ports(&self) -> Result<Vec<PortInfo>> {
        let ports = serialport::available_ports().map_err(Error::Serial)?;

        Ok(ports
            .into_iter()
            .map(|p| {
                let (vid, pid, manufacturer, product, serial_number) = match p.port_type {
                    serialport::SerialPortType::UsbPort(info) => (
                        Some(info.vid),
                        Some(info.pid),
                        info.manufacturer,
                        info.product,
                        info.serial_number,
                    ),
                    _ => (None, None, None, None, None),
                };

                PortInfo {
                    name: p.port_name,
                    vid,
                    pid,
                    manufacturer,
                    product,
                    serial_number,
                }
            })
            .collect())
    }
}

impl PortOpener for NativeSerial {
    type Port = NativePort;

    fn open(&self, config: &SerialConfig) -> Result<NativePort> {
        NativePort::open(config)
    }
}
