//! Controller discovery command.

use anyhow::{Context, Result};
use console::style;
use log::warn;
use portalradio::{Discovery, DiscoverySource, HandshakeProber, NativeSerial, ProbeEvent};

use crate::Settings;

/// Render a probe event as a one-line status message.
fn describe_event(event: &ProbeEvent<'_>) -> String {
    match event {
        ProbeEvent::Testing { port } => format!("{} Testing {port}", style("⏳").yellow()),
        ProbeEvent::Validated { device_name, .. } => format!(
            "{} Communication successful: {}",
            style("✓").green(),
            style(device_name).bold()
        ),
        ProbeEvent::Rejected { port, reason } => {
            format!("{} {port}: {reason}", style("✗").red())
        },
    }
}

/// Find the controller, using the cache when it is still valid.
pub(crate) fn locate(settings: &Settings) -> Result<Discovery> {
    let prober = HandshakeProber::new(NativeSerial).with_baud_rate(settings.baud);

    if !settings.quiet {
        eprintln!(
            "{} Looking for the controller at {} baud",
            style("🔍").cyan(),
            settings.baud
        );
    }

    let mut report = |event: &ProbeEvent<'_>| {
        if !settings.quiet {
            eprintln!("{}", describe_event(event));
        }
    };

    let discovery = portalradio::discover(
        &NativeSerial,
        &prober,
        settings
            .cache
            .as_ref(),
        &mut report,
    )
    .context("Could not find the portal radio controller")?;

    if !settings.quiet && discovery.source == DiscoverySource::Cached {
        eprintln!(
            "{} Using cached port {}",
            style("ℹ").blue(),
            style(&discovery.record.port_name).green()
        );
    }

    Ok(discovery)
}

/// Discover command implementation: print the port (and device name) found.
pub(crate) fn cmd_discover(settings: &Settings, json: bool) -> Result<()> {
    if let Some(port) = &settings.port {
        warn!("Ignoring fixed port {port}: discover always probes");
    }

    let discovery = locate(settings)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&discovery)?);
    } else {
        println!(
            "{} {}",
            discovery.record.port_name, discovery.record.device_name
        );
    }

    Ok(())
}
