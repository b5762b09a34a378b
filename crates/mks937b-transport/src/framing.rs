//! Delimiter framing shared by the stream transports.

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use mks937b_core::error::{Error, Result};
use mks937b_core::transport::find_delimiter;

const READ_CHUNK: usize = 256;

/// How long the link must stay silent before a drain is considered done.
pub(crate) const DRAIN_QUIET: Duration = Duration::from_millis(20);

/// Map an I/O error on an established link to the matching [`Error`].
pub(crate) fn map_io_error(e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::ConnectionAborted
        | std::io::ErrorKind::NotConnected
        | std::io::ErrorKind::UnexpectedEof => Error::ConnectionLost,
        std::io::ErrorKind::TimedOut => Error::Timeout,
        _ => Error::Io(e),
    }
}

/// Write and flush `data`, bounded by `timeout`.
pub(crate) async fn write_all<W>(writer: &mut W, data: &[u8], timeout: Duration) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let send = async {
        writer.write_all(data).await.map_err(map_io_error)?;
        writer.flush().await.map_err(map_io_error)
    };
    tokio::time::timeout(timeout, send)
        .await
        .map_err(|_| Error::Timeout)?
}

/// Read from `reader` into `pending` until `delimiter` is present, then
/// split off and return everything up to and including it.
///
/// The whole call is bounded by `timeout`. Bytes that arrived before the
/// deadline stay in `pending`.
pub(crate) async fn read_until<R>(
    reader: &mut R,
    pending: &mut BytesMut,
    delimiter: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let fill = async {
        loop {
            if let Some(end) = find_delimiter(pending, delimiter) {
                return Ok(pending.split_to(end).to_vec());
            }
            pending.reserve(READ_CHUNK);
            let n = reader.read_buf(pending).await.map_err(map_io_error)?;
            if n == 0 {
                return Err(Error::ConnectionLost);
            }
        }
    };
    tokio::time::timeout(timeout, fill)
        .await
        .map_err(|_| Error::Timeout)?
}

/// Discard input until `reader` has been silent for `quiet`, or `limit` has
/// passed. Clears `pending` too and returns the number of bytes dropped.
///
/// Run after a read timeout: a reply that arrived late must not be read as
/// the answer to the next request.
pub(crate) async fn drain<R>(
    reader: &mut R,
    pending: &mut BytesMut,
    quiet: Duration,
    limit: Duration,
) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut dropped = pending.len();
    pending.clear();
    let deadline = tokio::time::Instant::now() + limit;

    loop {
        let left = deadline.saturating_duration_since(tokio::time::Instant::now());
        if left.is_zero() {
            return Ok(dropped);
        }
        pending.reserve(READ_CHUNK);
        match tokio::time::timeout(quiet.min(left), reader.read_buf(pending)).await {
            Err(_) => return Ok(dropped),
            Ok(Ok(0)) => return Err(Error::ConnectionLost),
            Ok(Ok(n)) => {
                dropped += n;
                pending.clear();
            }
            Ok(Err(e)) => return Err(map_io_error(e)),
        }
    }
}
