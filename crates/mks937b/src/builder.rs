//! Mks937bBuilder -- fluent builder for [`Mks937b`] instances.
//!
//! Separates link configuration from construction: pick a serial port or a
//! TCP device server, adjust its settings, then [`build`](Mks937bBuilder::build)
//! to open the link.
//!
//! # Example
//!
//! ```no_run
//! use mks937b::builder::Mks937bBuilder;
//! use mks937b::BaudRate;
//! use std::time::Duration;
//!
//! # async fn example() -> mks937b::Result<()> {
//! let gauge = Mks937bBuilder::new(1)
//!     .serial_port("/dev/ttyUSB0")
//!     .baud_rate(BaudRate::B19200)
//!     .read_timeout(Duration::from_millis(300))
//!     .build()
//!     .await?;
//! let unit = gauge.get_pressure_unit().await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use mks937b_core::error::{Error, Result};
use mks937b_core::transport::Transport;
use mks937b_core::types::{BaudRate, Parity};
use mks937b_transport::{SerialConfig, SerialTransport, TcpConfig, TcpTransport};

use crate::gauge::Mks937b;
use crate::validate;

/// Fluent builder for [`Mks937b`].
///
/// Serial defaults are the controller's factory settings (9600 baud, 8N1);
/// TCP defaults come from [`TcpConfig::default`].
#[derive(Debug, Clone)]
pub struct Mks937bBuilder {
    address: u32,
    serial_port: Option<String>,
    serial_config: SerialConfig,
    tcp_addr: Option<String>,
    tcp_config: TcpConfig,
}

impl Mks937bBuilder {
    /// Create a builder for the controller at `address` (1-254).
    pub fn new(address: u32) -> Self {
        Mks937bBuilder {
            address,
            serial_port: None,
            serial_config: SerialConfig::default(),
            tcp_addr: None,
            tcp_config: TcpConfig::default(),
        }
    }

    /// Use a serial port (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Replace the whole serial configuration.
    pub fn serial_config(mut self, config: SerialConfig) -> Self {
        self.serial_config = config;
        self
    }

    /// Serial baud rate; must match the controller's `BR` setting.
    pub fn baud_rate(mut self, baud_rate: BaudRate) -> Self {
        self.serial_config.baud_rate = baud_rate;
        self
    }

    /// Serial parity; must match the controller's `PAR` setting.
    pub fn parity(mut self, parity: Parity) -> Self {
        self.serial_config.parity = parity;
        self
    }

    /// Use a TCP serial device server at `addr` (`host:port`).
    pub fn tcp(mut self, addr: &str) -> Self {
        self.tcp_addr = Some(addr.to_string());
        self
    }

    /// Replace the whole TCP configuration.
    pub fn tcp_config(mut self, config: TcpConfig) -> Self {
        self.tcp_config = config;
        self
    }

    /// How long to wait for a reply before failing with
    /// [`Error::Timeout`] (default: 500ms). Applies to either link.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.serial_config.read_timeout = timeout;
        self.tcp_config.read_timeout = timeout;
        self
    }

    /// Build an [`Mks937b`] over a caller-provided transport.
    ///
    /// The transport is used as is; call [`Mks937b::connect`] if it is not
    /// already connected. This is the entry point for tests (pass a
    /// `MockTransport` from `mks937b-test-harness`).
    pub fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<Mks937b> {
        validate::address(self.address)?;
        Ok(Mks937b::new(self.address, transport))
    }

    /// Build an [`Mks937b`] over the configured serial port or TCP address
    /// and connect it.
    ///
    /// Exactly one of [`serial_port`](Self::serial_port) and
    /// [`tcp`](Self::tcp) must have been called.
    pub async fn build(self) -> Result<Mks937b> {
        validate::address(self.address)?;
        let transport: Box<dyn Transport> = match (&self.serial_port, &self.tcp_addr) {
            (Some(port), None) => Box::new(SerialTransport::new(port, self.serial_config.clone())),
            (None, Some(addr)) => Box::new(TcpTransport::new(addr, self.tcp_config.clone())),
            (Some(_), Some(_)) => {
                return Err(Error::InvalidParameter(
                    "serial_port and tcp cannot both be set".into(),
                ));
            }
            (None, None) => {
                return Err(Error::InvalidParameter(
                    "serial_port or tcp is required for build()".into(),
                ));
            }
        };

        let gauge = Mks937b::new(self.address, transport);
        gauge.connect().await?;
        Ok(gauge)
    }
}
