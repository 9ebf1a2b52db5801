//! # portalradio
//!
//! Find and talk to the portal radio controller over a serial link.
//!
//! The controller speaks a line-oriented ASCII protocol in which every
//! message ends with the sentinel `/#/`. This crate provides:
//!
//! - Sentinel framing over a line-buffered serial stream
//! - INIT handshake probing of candidate serial ports
//! - A one-line cache of the last port that answered, so later runs can skip
//!   probing
//! - An interactive command session that aggregates multi-line replies
//!
//! ## Features
//!
//! - `serde`: Serialization support for data types
//!
//! ## Example
//!
//! ```rust,no_run
//! use portalradio::{CommandSession, HandshakeProber, NativeSerial, PortCache, SETTLE_DELAY};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let prober = HandshakeProber::new(NativeSerial);
//!     let cache = PortCache::default();
//!
//!     let found = portalradio::discover(&NativeSerial, &prober, Some(&cache), &mut |_| {})?;
//!
//!     let mut session = CommandSession::open(
//!         &NativeSerial,
//!         &found.record.port_name,
//!         prober.baud_rate(),
//!         SETTLE_DELAY,
//!     )?;
//!     let reply = session.execute("STATUS")?;
//!     println!("{}: {:?}", session.device_name(), reply);
//!     session.close()?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod discovery;
pub mod error;
pub mod port;
pub mod probe;
pub mod protocol;
pub mod session;

// Re-exports for convenience
pub use {
    cache::{CachedPortRecord, DEFAULT_CACHE_FILE, PortCache},
    discovery::{Discovery, DiscoverySource, discover},
    error::{Error, Result},
    port::{
        DEFAULT_BAUD_RATE, NativePort, NativeSerial, Port, PortEnumerator, PortInfo, PortOpener,
        SerialConfig,
    },
    probe::{
        HandshakeProber, PROBE_READ_TIMEOUT, PROBE_WRITE_TIMEOUT, ProbeEvent, ProbeOutcome,
        SETTLE_DELAY, validate_handshake,
    },
    protocol::{LineReader, SENTINEL, decode_response, encode_command},
    session::{CommandSession, SESSION_WRITE_TIMEOUT, format_reply},
};
