//! Interactive session command.

use anyhow::{Context, Result};
use console::style;
use log::info;
use portalradio::protocol::command::COMMANDS;
use portalradio::{CommandSession, NativeSerial, SETTLE_DELAY};
use std::io;

use super::discover::locate;
use crate::Settings;

/// Print the commands the controller understands.
fn print_menu() {
    eprintln!("{}", style("The following commands are available:").bold());
    for (name, description) in COMMANDS {
        eprintln!("  {:<24} {}", style(name).cyan(), style(description).dim());
    }
}

/// Run command implementation: find the controller and start the session.
pub(crate) fn cmd_run(settings: &Settings) -> Result<()> {
    let port_name = if let Some(port) = &settings.port {
        info!("Using configured port {port}, skipping discovery");
        port.clone()
    } else {
        locate(settings)?
            .record
            .port_name
    };

    if !settings.quiet {
        eprintln!(
            "{} Suitable device found at {}. Starting session",
            style("🔌").cyan(),
            style(&port_name).green()
        );
        eprintln!(
            "{} Waiting {}s for the device to boot",
            style("⏳").yellow(),
            SETTLE_DELAY.as_secs()
        );
    }

    let mut session = CommandSession::open(&NativeSerial, &port_name, settings.baud, SETTLE_DELAY)
        .with_context(|| format!("Failed to start a session on {port_name}"))?;

    if !settings.quiet {
        eprintln!(
            "{} Connected to {}",
            style("✓").green(),
            style(session.device_name()).bold()
        );
        print_menu();
    }

    session
        .run(io::stdin().lock(), io::stdout().lock())
        .context("Session ended with an error")?;

    if !settings.quiet {
        eprintln!("{} Session finished", style("✓").green());
    }

    Ok(())
}
