//! Text protocol spoken by the portal radio controller.
//!
//! - [`line`]: line-buffered reader over the raw serial stream
//! - [`frame`]: sentinel framing (`/#/`) for commands and responses
//! - [`command`]: known commands and the `INIT`/`exit` special cases

pub mod command;
pub mod frame;
pub mod line;

pub use frame::{SENTINEL, contains_sentinel, decode_response, encode_command};
pub use line::LineReader;
