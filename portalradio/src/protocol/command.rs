//! Controller command catalogue.
//!
//! Commands are opaque text to the framing layer. Only two are special:
//! `INIT` makes the device re-announce its name, and `exit` ends a session
//! on the host side without anything being sent.

/// Command that (re)initialises the device; its reply starts with the
/// device name.
pub const INIT: &str = "INIT";

/// Host-side command that ends an interactive session.
pub const EXIT: &str = "exit";

/// Commands understood by the controller firmware, with a short description.
pub const COMMANDS: &[(&str, &str)] = &[
    ("INIT", "re-initialise the device and report its name"),
    ("STATUS", "report radio, volume and speaker state"),
    ("RADIO ON|OFF", "switch the radio on or off"),
    ("VOLUME HOME|<percent>", "home the volume knob or set it in percent"),
    ("SPEAKER RESET", "reset the speaker"),
    ("exit", "leave the session"),
];

/// Check whether user input asks the device to re-initialise.
pub fn is_init(input: &str) -> bool {
    input.contains(INIT)
}

/// Check whether user input ends the session.
pub fn is_exit(input: &str) -> bool {
    input.contains(EXIT)
}
