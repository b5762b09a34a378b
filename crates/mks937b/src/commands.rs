//! Mnemonic construction and reply parsing shared by the typed operations.
//!
//! All of these are pure: they build the text that goes into a frame or turn
//! the text that came back into a Rust value.

use std::str::FromStr;

use mks937b_core::error::{Error, Result};

/// Append a channel digit to a mnemonic (`"CSP", 3` -> `"CSP3"`).
pub fn channel_mnemonic(base: &str, channel: u8) -> String {
    format!("{base}{channel}")
}

/// Parameter text for an ON/OFF setting.
pub fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

/// An ON/OFF reply is on only when it reads `ON`.
pub fn parse_on_off(reply: &str) -> bool {
    reply.trim() == "ON"
}

pub fn parse_f64(command: &str, reply: &str) -> Result<f64> {
    parse_number(command, reply)
}

pub fn parse_u32(command: &str, reply: &str) -> Result<u32> {
    parse_number(command, reply)
}

fn parse_number<T: FromStr>(command: &str, reply: &str) -> Result<T> {
    reply.trim().parse().map_err(|_| Error::InvalidValue {
        command: command.to_string(),
        got: reply.to_string(),
    })
}
