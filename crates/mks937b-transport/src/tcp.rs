//! TCP transport for controllers behind a serial device server.
//!
//! MKS 937B units are usually reached over Ethernet through an RS-485/RS-232
//! device server (Moxa NPort and similar) that exposes the serial line as a
//! raw TCP socket. [`TcpTransport`] implements the [`Transport`] trait for
//! that setup.
//!
//! # Example
//!
//! ```no_run
//! use mks937b_core::transport::Transport;
//! use mks937b_transport::{TcpConfig, TcpTransport};
//!
//! # async fn example() -> mks937b_core::Result<()> {
//! let mut transport = TcpTransport::new("10.0.4.135:4001", TcpConfig::default());
//! transport.connect().await?;
//!
//! transport.write(b"@048PR1?;FF").await?;
//! let reply = transport.read_until(b";FF").await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::net::TcpStream;

use mks937b_core::error::{Error, Result};
use mks937b_core::transport::Transport;

use crate::framing;

/// TCP connection settings.
#[derive(Debug, Clone)]
pub struct TcpConfig {
    /// Maximum time to wait for the connection to be established.
    pub connect_timeout: Duration,
    /// Maximum time a single `read_until` may take.
    pub read_timeout: Duration,
    /// Maximum time a single `write` may take.
    pub write_timeout: Duration,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_millis(500),
            write_timeout: Duration::from_millis(500),
        }
    }
}

/// TCP transport to a controller.
///
/// Created disconnected; the socket is opened by [`Transport::connect`].
#[derive(Debug)]
pub struct TcpTransport {
    /// The underlying TCP stream, `None` while disconnected.
    stream: Option<TcpStream>,
    /// `host:port` of the device server.
    addr: String,
    config: TcpConfig,
    /// Bytes received past the last delimiter.
    pending: BytesMut,
    /// Set when a read timed out; a late reply may still be on its way.
    stale: bool,
}

impl TcpTransport {
    /// Create a transport for `addr` (`host:port`, e.g. `"10.0.4.135:4001"`).
    pub fn new(addr: &str, config: TcpConfig) -> Self {
        Self {
            stream: None,
            addr: addr.to_string(),
            config,
            pending: BytesMut::new(),
            stale: false,
        }
    }

    /// Wrap an existing `TcpStream`.
    ///
    /// This is useful when the connection has already been established
    /// externally (e.g., accepted from a listener in tests).
    pub fn from_stream(stream: TcpStream, addr: String, config: TcpConfig) -> Self {
        tracing::debug!(addr = %addr, "Wrapping existing TCP stream");
        Self {
            stream: Some(stream),
            addr,
            config,
            pending: BytesMut::new(),
            stale: false,
        }
    }

    /// Get the address string this transport connects to.
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        tracing::debug!(
            addr = %self.addr,
            timeout_ms = self.config.connect_timeout.as_millis(),
            "Connecting to TCP endpoint"
        );

        let stream = tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect(self.addr.as_str()),
        )
        .await
        .map_err(|_| {
            tracing::error!(addr = %self.addr, "TCP connection timed out");
            Error::Timeout
        })?
        .map_err(|e| {
            tracing::error!(addr = %self.addr, error = %e, "TCP connection failed");
            Error::Transport(format!("failed to connect to {}: {}", self.addr, e))
        })?;

        // Frames are a dozen bytes; don't let Nagle hold them back.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::warn!(
                addr = %self.addr,
                error = %e,
                "Failed to set TCP_NODELAY (continuing anyway)"
            );
        }

        tracing::info!(addr = %self.addr, "TCP connection established");

        self.stream = Some(stream);
        self.pending.clear();
        self.stale = false;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if self.stream.take().is_some() {
            tracing::info!(addr = %self.addr, "TCP connection closed");
        }
        self.pending.clear();
        self.stale = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        if self.stale {
            let drained = framing::drain(
                stream,
                &mut self.pending,
                framing::DRAIN_QUIET,
                self.config.read_timeout,
            )
            .await;
            match drained {
                Ok(0) => {}
                Ok(bytes) => tracing::warn!(
                    addr = %self.addr,
                    bytes,
                    "Discarded late reply after timeout"
                ),
                Err(e) => {
                    tracing::error!(addr = %self.addr, error = %e, "Link failed while draining");
                    if matches!(e, Error::ConnectionLost) {
                        self.stream = None;
                    }
                    return Err(e);
                }
            }
            self.stale = false;
        }
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        if !self.pending.is_empty() {
            tracing::warn!(
                addr = %self.addr,
                bytes = self.pending.len(),
                "Discarding stale input before write"
            );
            self.pending.clear();
        }

        tracing::trace!(
            addr = %self.addr,
            data = %String::from_utf8_lossy(data),
            "Sending data"
        );

        framing::write_all(stream, data, self.config.write_timeout)
            .await
            .inspect_err(|e| {
                tracing::error!(addr = %self.addr, error = %e, "Failed to send data");
            })
    }

    async fn read_until(&mut self, delimiter: &[u8]) -> Result<Vec<u8>> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let frame = framing::read_until(
            stream,
            &mut self.pending,
            delimiter,
            self.config.read_timeout,
        )
        .await;

        match &frame {
            Ok(bytes) => tracing::trace!(
                addr = %self.addr,
                data = %String::from_utf8_lossy(bytes),
                "Received data"
            ),
            Err(Error::Timeout) => tracing::debug!(
                addr = %self.addr,
                timeout_ms = self.config.read_timeout.as_millis(),
                "Timeout waiting for delimiter"
            ),
            Err(e) => tracing::error!(addr = %self.addr, error = %e, "Failed to receive data"),
        }

        match &frame {
            Err(Error::Timeout) => self.stale = true,
            Err(Error::ConnectionLost) => self.stream = None,
            _ => {}
        }
        frame
    }
}
