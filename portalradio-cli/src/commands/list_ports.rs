//! Serial port listing command.

use anyhow::{Context, Result};
use console::style;
use portalradio::{NativeSerial, PortCache, PortEnumerator, PortInfo};

use crate::Settings;

/// Format one port for the human-readable listing.
fn describe_port(port: &PortInfo, cached: bool) -> String {
    let vid_pid = if let (Some(vid), Some(pid)) = (port.vid, port.pid) {
        format!(" ({vid:04X}:{pid:04X})")
    } else {
        String::new()
    };

    let product = port
        .product
        .as_ref()
        .map(|p| format!(" - {}", style(p).dim()))
        .unwrap_or_default();

    let marker = if cached {
        format!(" {}", style("[cached]").yellow())
    } else {
        String::new()
    };

    format!(
        "  {} {}{}{}{}",
        style("•").green(),
        style(&port.name).cyan(),
        vid_pid,
        product,
        marker
    )
}

/// List ports command implementation.
pub(crate) fn cmd_list_ports(settings: &Settings, json: bool) -> Result<()> {
    let ports = NativeSerial
        .list_ports()
        .context("Failed to enumerate serial ports")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }

    eprintln!("{}", style("Available serial ports:").bold().underlined());

    if ports.is_empty() {
        eprintln!("  {}", style("No serial ports found").dim());
        return Ok(());
    }

    let cached = settings
        .cache
        .as_ref()
        .and_then(PortCache::load)
        .filter(|record| PortCache::is_valid(record, &ports));

    for port in &ports {
        let is_cached = cached
            .as_ref()
            .is_some_and(|record| record.port_name == port.name);
        eprintln!("{}", describe_port(port, is_cached));
    }

    Ok(())
}
