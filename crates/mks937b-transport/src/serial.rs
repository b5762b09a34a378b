//! Serial port transport for directly attached controllers.
//!
//! The MKS 937B speaks its ASCII protocol over RS-232 or RS-485. The
//! factory character format is 8 data bits, 1 stop bit, no parity at
//! 9600 baud; the baud rate and parity can be changed from the front panel
//! or with the `BR`/`PAR` commands, in which case [`SerialConfig`] must
//! follow.
//!
//! # Example
//!
//! ```no_run
//! use mks937b_core::transport::Transport;
//! use mks937b_transport::{SerialConfig, SerialTransport};
//!
//! # async fn example() -> mks937b_core::Result<()> {
//! let mut transport = SerialTransport::new("/dev/ttyUSB0", SerialConfig::default());
//! transport.connect().await?;
//!
//! transport.write(b"@253PR1?;FF").await?;
//! let reply = transport.read_until(b";FF").await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use mks937b_core::error::{Error, Result};
use mks937b_core::transport::Transport;
use mks937b_core::types::{BaudRate, Parity};

use crate::framing;

/// Serial port configuration.
///
/// Defaults match the controller's factory settings: 9600 baud, 8 data
/// bits, 1 stop bit, no parity, no flow control.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Baud rate; must match the controller's `BR` setting.
    pub baud_rate: BaudRate,
    /// Number of data bits (8 for the 937B)
    pub data_bits: DataBits,
    /// Number of stop bits (1 for the 937B)
    pub stop_bits: StopBits,
    /// Parity; must match the controller's `PAR` setting.
    pub parity: Parity,
    /// Flow control (none for RS-485)
    pub flow_control: FlowControl,
    /// Maximum time a single `read_until` may take.
    pub read_timeout: Duration,
    /// Maximum time a single `write` may take.
    pub write_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: BaudRate::B9600,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
            read_timeout: Duration::from_millis(500),
            write_timeout: Duration::from_millis(500),
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
}

impl From<DataBits> for tokio_serial::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Seven => tokio_serial::DataBits::Seven,
            DataBits::Eight => tokio_serial::DataBits::Eight,
        }
    }
}

/// Number of stop bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for tokio_serial::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => tokio_serial::StopBits::One,
            StopBits::Two => tokio_serial::StopBits::Two,
        }
    }
}

/// Flow control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
    Software,
    Hardware,
}

impl From<FlowControl> for tokio_serial::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => tokio_serial::FlowControl::None,
            FlowControl::Software => tokio_serial::FlowControl::Software,
            FlowControl::Hardware => tokio_serial::FlowControl::Hardware,
        }
    }
}

fn serial_parity(parity: Parity) -> tokio_serial::Parity {
    match parity {
        Parity::None => tokio_serial::Parity::None,
        Parity::Even => tokio_serial::Parity::Even,
        Parity::Odd => tokio_serial::Parity::Odd,
    }
}

/// Serial port transport to a controller.
///
/// Created disconnected; the port is opened by [`Transport::connect`].
pub struct SerialTransport {
    /// The underlying serial port stream, `None` while disconnected.
    port: Option<SerialStream>,
    /// Port name for logging/debugging
    port_name: String,
    config: SerialConfig,
    /// Bytes received past the last delimiter.
    pending: BytesMut,
    /// Set when a read timed out; a late reply may still be on its way.
    stale: bool,
}

impl SerialTransport {
    /// Create a transport for `port` (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn new(port: &str, config: SerialConfig) -> Self {
        Self {
            port: None,
            port_name: port.to_string(),
            config,
            pending: BytesMut::new(),
            stale: false,
        }
    }

    /// Wrap an already open serial stream.
    ///
    /// Useful with `SerialStream::pair` pseudo-terminals in tests.
    pub fn from_stream(stream: SerialStream, port_name: &str, config: SerialConfig) -> Self {
        tracing::debug!(port = %port_name, "Wrapping existing serial stream");
        Self {
            port: Some(stream),
            port_name: port_name.to_string(),
            config,
            pending: BytesMut::new(),
            stale: false,
        }
    }

    /// Get the name of the serial port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Get the port configuration.
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.port.is_some() {
            return Ok(());
        }

        let config = &self.config;
        tracing::debug!(
            port = %self.port_name,
            baud_rate = config.baud_rate.bps(),
            data_bits = ?config.data_bits,
            stop_bits = ?config.stop_bits,
            parity = %config.parity,
            flow_control = ?config.flow_control,
            "Opening serial port"
        );

        let stream = tokio_serial::new(&self.port_name, config.baud_rate.bps())
            .data_bits(config.data_bits.into())
            .stop_bits(config.stop_bits.into())
            .parity(serial_parity(config.parity))
            .flow_control(config.flow_control.into())
            .open_native_async()
            .map_err(|e| {
                tracing::error!(port = %self.port_name, error = %e, "Failed to open serial port");
                Error::Transport(format!(
                    "failed to open serial port {}: {}",
                    self.port_name, e
                ))
            })?;

        tracing::info!(
            port = %self.port_name,
            baud_rate = config.baud_rate.bps(),
            "Serial port opened successfully"
        );

        self.port = Some(stream);
        self.pending.clear();
        self.stale = false;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            tracing::info!(port = %self.port_name, "Serial port closed");
        }
        self.pending.clear();
        self.stale = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        if self.stale {
            let drained = framing::drain(
                port,
                &mut self.pending,
                framing::DRAIN_QUIET,
                self.config.read_timeout,
            )
            .await;
            match drained {
                Ok(0) => {}
                Ok(bytes) => tracing::warn!(
                    port = %self.port_name,
                    bytes,
                    "Discarded late reply after timeout"
                ),
                Err(e) => {
                    tracing::error!(port = %self.port_name, error = %e, "Port failed while draining");
                    if link_lost(&e) {
                        self.port = None;
                    }
                    return Err(e);
                }
            }
            self.stale = false;
        }
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        if !self.pending.is_empty() {
            tracing::warn!(
                port = %self.port_name,
                bytes = self.pending.len(),
                "Discarding stale input before write"
            );
            self.pending.clear();
        }

        tracing::trace!(
            port = %self.port_name,
            data = %String::from_utf8_lossy(data),
            "Sending data"
        );

        framing::write_all(port, data, self.config.write_timeout)
            .await
            .inspect_err(|e| {
                tracing::error!(port = %self.port_name, error = %e, "Failed to send data");
            })
    }

    async fn read_until(&mut self, delimiter: &[u8]) -> Result<Vec<u8>> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        let frame =
            framing::read_until(port, &mut self.pending, delimiter, self.config.read_timeout)
                .await;

        match &frame {
            Ok(bytes) => tracing::trace!(
                port = %self.port_name,
                data = %String::from_utf8_lossy(bytes),
                "Received data"
            ),
            Err(Error::Timeout) => tracing::debug!(
                port = %self.port_name,
                timeout_ms = self.config.read_timeout.as_millis(),
                "Timeout waiting for delimiter"
            ),
            Err(e) => tracing::error!(port = %self.port_name, error = %e, "Failed to receive data"),
        }

        match &frame {
            Err(Error::Timeout) => self.stale = true,
            Err(e) if link_lost(e) => {
                tracing::info!(port = %self.port_name, "Serial port lost, closing");
                self.port = None;
            }
            _ => {}
        }
        frame
    }
}

/// An unplugged USB adapter shows up as EOF or as a raw I/O error (EIO).
fn link_lost(e: &Error) -> bool {
    matches!(e, Error::ConnectionLost | Error::Io(_))
}
