//! Transport trait for controller communication.
//!
//! The [`Transport`] trait abstracts over the physical link to an MKS 937B:
//! an RS-232/RS-485 serial port, a TCP socket to a serial device server, or
//! the scripted mock from the `mks937b-test-harness` crate.
//!
//! The protocol layer only ever writes one complete frame and then reads up
//! to the frame terminator, so the trait exposes a delimiter-based read
//! rather than a raw byte stream. Timeouts are the transport's concern.

use async_trait::async_trait;

use crate::error::Result;

/// Asynchronous delimiter-framed transport to a controller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the underlying link.
    ///
    /// Calling `connect()` on an already-connected transport is a no-op.
    async fn connect(&mut self) -> Result<()>;

    /// Close the underlying link.
    ///
    /// After `disconnect()`, subsequent `write()` and `read_until()` calls
    /// return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn disconnect(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;

    /// Write all bytes to the link.
    async fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read until `delimiter` has been received.
    ///
    /// The returned bytes include the delimiter. Bytes received after the
    /// delimiter are kept for the next call. Returns
    /// [`Error::Timeout`](crate::error::Error::Timeout) if the delimiter
    /// does not arrive within the transport's read timeout.
    async fn read_until(&mut self, delimiter: &[u8]) -> Result<Vec<u8>>;
}

/// Return the end offset (exclusive) of the first `delimiter` in `buf`.
///
/// Shared by the transport implementations to split their receive buffers.
///
/// ```
/// use mks937b_core::transport::find_delimiter;
///
/// assert_eq!(find_delimiter(b"@048ACK9600;FF@048", b";FF"), Some(14));
/// assert_eq!(find_delimiter(b"@048ACK9600;F", b";FF"), None);
/// ```
pub fn find_delimiter(buf: &[u8], delimiter: &[u8]) -> Option<usize> {
    if delimiter.is_empty() || buf.len() < delimiter.len() {
        return None;
    }
    buf.windows(delimiter.len())
        .position(|w| w == delimiter)
        .map(|pos| pos + delimiter.len())
}
