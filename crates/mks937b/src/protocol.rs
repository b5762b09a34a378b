//! MKS 937B ASCII frame encoder/decoder.
//!
//! Every exchange with the controller is one request frame followed by one
//! response frame. This module builds request frames and verifies response
//! frames; it performs no I/O.
//!
//! # Frame format
//!
//! ```text
//! query:    @<addr><mnemonic>?;FF
//! set:      @<addr><mnemonic>!<parameter>;FF
//! response: @<addr>ACK<value>;FF    or    @<addr>NAK<code>;FF
//! ```
//!
//! - `addr`: the controller address, 1-254, as three zero-padded digits.
//! - `mnemonic`: the command code, optionally ending in a channel digit
//!   (`PR1`, `CSP3`, `AD`).
//! - Terminator: the literal `;FF`.
//!
//! A set response echoes the parameter that was written; that echo is the
//! only confirmation the value took effect, so [`verify_set`] requires it to
//! match byte for byte.

use std::sync::LazyLock;

use bytes::{BufMut, BytesMut};
use regex::Regex;

use mks937b_core::error::{Error, Result};

/// Start-of-frame marker.
pub const START: u8 = b'@';

/// Frame terminator, also the delimiter handed to `Transport::read_until`.
pub const TERMINATOR: &[u8] = b";FF";

/// Query operator.
pub const QUERY: u8 = b'?';

/// Set operator.
pub const SET: u8 = b'!';

static RESPONSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@([0-9]+)(ACK|NAK)(.*?);FF$").expect("response grammar is a valid regex")
});

/// Acknowledgement tag of a response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledge {
    Ack,
    Nak,
}

/// A decoded response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Address digits exactly as received.
    pub address: String,
    pub ack: Acknowledge,
    /// Returned value (query), echoed parameter (set) or error code (NAK).
    pub value: String,
}

/// Format a controller address as used on the wire (`48` -> `"048"`).
pub fn format_address(address: u32) -> String {
    format!("{address:03}")
}

fn encode(address: u32, mnemonic: &str, operator: u8, parameter: &str) -> Vec<u8> {
    let capacity = 1 + 3 + mnemonic.len() + 1 + parameter.len() + TERMINATOR.len();
    let mut buf = BytesMut::with_capacity(capacity);
    buf.put_u8(START);
    buf.put_slice(format_address(address).as_bytes());
    buf.put_slice(mnemonic.as_bytes());
    buf.put_u8(operator);
    buf.put_slice(parameter.as_bytes());
    buf.put_slice(TERMINATOR);
    buf.to_vec()
}

/// Encode a query frame.
///
/// ```
/// use mks937b::protocol::encode_query;
///
/// assert_eq!(encode_query(48, "PR1"), b"@048PR1?;FF");
/// ```
pub fn encode_query(address: u32, mnemonic: &str) -> Vec<u8> {
    encode(address, mnemonic, QUERY, "")
}

/// Encode a set frame.
///
/// ```
/// use mks937b::protocol::encode_set;
///
/// assert_eq!(encode_set(48, "BR", "9600"), b"@048BR!9600;FF");
/// ```
pub fn encode_set(address: u32, mnemonic: &str, parameter: &str) -> Vec<u8> {
    encode(address, mnemonic, SET, parameter)
}

/// Decode a response frame.
///
/// The whole frame must match `@<digits>(ACK|NAK)<value>;FF`; surrounding
/// ASCII whitespace is ignored. `sent` is only used to build the
/// [`Error::UnexpectedReply`] on mismatch.
pub fn decode_response(sent: &[u8], raw: &[u8]) -> Result<Response> {
    let unexpected = || Error::UnexpectedReply {
        sent: String::from_utf8_lossy(sent).into_owned(),
        got: String::from_utf8_lossy(raw).into_owned(),
    };

    let text = std::str::from_utf8(raw).map_err(|_| unexpected())?;
    let caps = RESPONSE.captures(text.trim()).ok_or_else(unexpected)?;

    let ack = match &caps[2] {
        "ACK" => Acknowledge::Ack,
        _ => Acknowledge::Nak,
    };
    Ok(Response {
        address: caps[1].to_string(),
        ack,
        value: caps[3].to_string(),
    })
}

/// Decode a response and check it answers `mnemonic` sent to `address`.
///
/// Address mismatch is reported before a NAK so that a reply from the wrong
/// controller is never mistaken for a rejection.
fn verify(address: u32, mnemonic: &str, sent: &[u8], raw: &[u8]) -> Result<String> {
    let response = decode_response(sent, raw)?;

    let expected = format_address(address);
    if response.address != expected {
        return Err(Error::UnexpectedAddress {
            expected,
            got: response.address,
        });
    }
    if response.ack == Acknowledge::Nak {
        return Err(Error::Nak {
            command: mnemonic.to_string(),
            code: response.value,
        });
    }
    Ok(response.value)
}

/// Verify the response to a query and return the value verbatim.
pub fn verify_query(address: u32, mnemonic: &str, sent: &[u8], raw: &[u8]) -> Result<String> {
    verify(address, mnemonic, sent, raw)
}

/// Verify the response to a set: the echoed parameter must equal `parameter`.
pub fn verify_set(
    address: u32,
    mnemonic: &str,
    parameter: &str,
    sent: &[u8],
    raw: &[u8],
) -> Result<()> {
    let echoed = verify(address, mnemonic, sent, raw)?;
    if echoed != parameter {
        return Err(Error::UnexpectedParameter {
            expected: parameter.to_string(),
            got: echoed,
        });
    }
    Ok(())
}

/// Format a value in the controller's scientific notation, C `%.2E` style.
///
/// ```
/// use mks937b::protocol::format_sci;
///
/// assert_eq!(format_sci(1.4e-3), "1.40E-03");
/// assert_eq!(format_sci(0.0), "0.00E+00");
/// ```
pub fn format_sci(value: f64) -> String {
    let s = format!("{value:.2E}");
    match s.split_once('E') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}E{sign}{digits:0>2}")
        }
        // NaN and infinities have no exponent.
        None => s,
    }
}

/// Format a value with one decimal place, C `%.1f` style.
pub fn format_fixed1(value: f64) -> String {
    format!("{value:.1}")
}
