//! Locate the controller: trust the cached port if it is still present,
//! otherwise probe every enumerated port and remember the winner.

use crate::cache::{CachedPortRecord, PortCache};
use crate::error::{Error, Result};
use crate::port::{PortEnumerator, PortOpener};
use crate::probe::{HandshakeProber, ProbeEvent};
use log::{debug, info, warn};

/// Where a discovered port came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DiscoverySource {
    /// The cached record still matched an enumerated port; nothing was probed.
    Cached,
    /// Found by probing candidates.
    Probed,
}

/// A port ready to host a command session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Discovery {
    /// Port and device name.
    pub record: CachedPortRecord,
    /// How the port was found.
    pub source: DiscoverySource,
}

/// Find the controller's port.
///
/// With a cache, a record naming a currently enumerated port is returned as
/// is. Otherwise the ports are probed in enumeration order and, on success,
/// the cache is overwritten. A failure to write the cache is logged and does
/// not fail discovery.
///
/// Returns [`Error::NoDevice`] if no port answers the handshake.
pub fn discover<E, O>(
    enumerator: &E,
    prober: &HandshakeProber<O>,
    cache: Option<&PortCache>,
    observer: &mut dyn FnMut(&ProbeEvent<'_>),
) -> Result<Discovery>
where
    E: PortEnumerator + ?Sized,
    O: PortOpener,
{
    let ports = enumerator.list_ports()?;
    debug!("Enumerated {} port(s)", ports.len());

    if let Some(cache) = cache {
        match cache.load() {
            Some(record) if PortCache::is_valid(&record, &ports) => {
                info!("Using cached port {}", record.port_name);
                return Ok(Discovery {
                    record,
                    source: DiscoverySource::Cached,
                });
            },
            Some(record) => {
                info!(
                    "Cached port {} is not present, searching for the device",
                    record.port_name
                );
            },
            None => info!("No cached port, searching for the device"),
        }
    }

    let record = prober
        .probe_candidates(&ports, observer)
        .ok_or(Error::NoDevice)?;

    if let Some(cache) = cache {
        if let Err(e) = cache.save(&record) {
            warn!(
                "Could not save port cache {}: {e}",
                cache
                    .path()
                    .display()
            );
        }
    }

    Ok(Discovery {
        record,
        source: DiscoverySource::Probed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::mock::{MockBus, MockPort};
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn run(bus: &MockBus, cache: Option<&PortCache>) -> Result<Discovery> {
        let prober = HandshakeProber::new(bus).with_settle_delay(Duration::ZERO);
        discover(bus, &prober, cache, &mut |_| {})
    }

    #[test]
    fn test_valid_cache_skips_probing() {
        let dir = tempdir().unwrap();
        let cache = PortCache::new(dir.path().join("port.txt"));
        cache
            .save(&CachedPortRecord::new("COM2", "Radio"))
            .unwrap();

        let bus = MockBus::new()
            .with_port("COM1", MockPort::replying("COM1", b"Other\nOK /#/\n"))
            .with_port("COM2", MockPort::replying("COM2", b"Radio\nOK /#/\n"));

        let found = run(&bus, Some(&cache)).unwrap();

        assert_eq!(found.source, DiscoverySource::Cached);
        assert_eq!(found.record, CachedPortRecord::new("COM2", "Radio"));
        assert!(bus.opened_names().is_empty());
    }

    #[test]
    fn test_stale_cache_probes_and_overwrites() {
        let dir = tempdir().unwrap();
        let cache = PortCache::new(dir.path().join("port.txt"));
        cache
            .save(&CachedPortRecord::new("COM9", "Old Radio"))
            .unwrap();

        let bus = MockBus::new()
            .with_port("COM1", MockPort::replying("COM1", b"Modem\nATZ\n"))
            .with_port("COM2", MockPort::replying("COM2", b"New Radio\nOK /#/\n"));

        let found = run(&bus, Some(&cache)).unwrap();

        assert_eq!(found.source, DiscoverySource::Probed);
        assert_eq!(found.record, CachedPortRecord::new("COM2", "New Radio"));
        assert_eq!(bus.opened_names(), vec!["COM1", "COM2"]);
        assert_eq!(
            fs::read_to_string(cache.path()).unwrap(),
            "COM2 New Radio\n"
        );
    }

    #[test]
    fn test_corrupt_cache_falls_back_to_probing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("port.txt");
        fs::write(&path, "\n\n").unwrap();
        let cache = PortCache::new(&path);

        let bus = MockBus::new().with_port("COM1", MockPort::replying("COM1", b"Radio\nOK /#/\n"));

        let found = run(&bus, Some(&cache)).unwrap();
        assert_eq!(found.source, DiscoverySource::Probed);
        assert_eq!(cache.load(), Some(CachedPortRecord::new("COM1", "Radio")));
    }

    #[test]
    fn test_no_device_leaves_cache_untouched() {
        let dir = tempdir().unwrap();
        let cache = PortCache::new(dir.path().join("port.txt"));
        cache
            .save(&CachedPortRecord::new("COM9", "Old Radio"))
            .unwrap();

        let bus = MockBus::new().with_dead_port("COM1");

        assert!(matches!(run(&bus, Some(&cache)), Err(Error::NoDevice)));
        assert_eq!(cache.load(), Some(CachedPortRecord::new("COM9", "Old Radio")));
    }

    #[test]
    fn test_without_cache_always_probes() {
        let bus = MockBus::new().with_port("COM1", MockPort::replying("COM1", b"Radio\nOK /#/\n"));
        let found = run(&bus, None).unwrap();
        assert_eq!(found.source, DiscoverySource::Probed);
        assert_eq!(bus.opened_names(), vec!["COM1"]);
    }

    #[test]
    fn test_unwritable_cache_does_not_fail_discovery() {
        let dir = tempdir().unwrap();
        // A directory cannot be written as a file.
        let cache = PortCache::new(dir.path());
        let bus = MockBus::new().with_port("COM1", MockPort::replying("COM1", b"Radio\nOK /#/\n"));

        let found = run(&bus, Some(&cache)).unwrap();
        assert_eq!(found.record.port_name, "COM1");
    }

    #[test]
    fn test_no_ports_is_no_device() {
        let bus = MockBus::new();
        assert!(matches!(run(&bus, None), Err(Error::NoDevice)));
    }
}
