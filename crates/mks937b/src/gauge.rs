//! Mks937b -- the command gateway to one controller.
//!
//! Every request goes through [`Mks937b::query`] or [`Mks937b::set`], which
//! hold the transport lock for the whole exchange: encode, write, read up to
//! the `;FF` terminator, verify. The controller is half-duplex and answers
//! one frame per request, so at most one request is ever outstanding per
//! instance; concurrent callers wait their turn.
//!
//! The typed getters and setters live next to the parameters they control
//! (`readings`, `system`, `control`, `sensor`) and all reduce to these two
//! calls.

use tokio::sync::Mutex;
use tracing::{debug, trace};

use mks937b_core::error::{Error, Result};
use mks937b_core::transport::Transport;

use crate::protocol;
use crate::validate;

/// An MKS 937B controller reached through a [`Transport`].
///
/// Constructed directly with [`Mks937b::new`] or through
/// [`Mks937bBuilder`](crate::builder::Mks937bBuilder). The address is fixed
/// for the life of the instance; it is validated on [`connect`](Self::connect)
/// and again before every exchange.
pub struct Mks937b {
    address: u32,
    transport: Mutex<Box<dyn Transport>>,
}

impl Mks937b {
    /// Create a gateway for the controller at `address` over `transport`.
    ///
    /// No I/O happens until [`connect`](Self::connect).
    pub fn new(address: u32, transport: Box<dyn Transport>) -> Self {
        Mks937b {
            address,
            transport: Mutex::new(transport),
        }
    }

    /// The controller address this instance talks to.
    pub fn address(&self) -> u32 {
        self.address
    }

    /// Open the link to the controller.
    ///
    /// Fails with [`Error::InvalidAddress`] before touching the transport if
    /// the address is outside 1..=254.
    pub async fn connect(&self) -> Result<()> {
        validate::address(self.address)?;
        let mut transport = self.transport.lock().await;
        transport.connect().await?;
        debug!(address = self.address, "connected");
        Ok(())
    }

    /// Close the link to the controller.
    pub async fn disconnect(&self) -> Result<()> {
        let mut transport = self.transport.lock().await;
        transport.disconnect().await?;
        debug!(address = self.address, "disconnected");
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.transport.lock().await.is_connected()
    }

    /// Send a query for `mnemonic` and return the value the controller
    /// answered with, verbatim.
    pub async fn query(&self, mnemonic: &str) -> Result<String> {
        let mut transport = self.transport.lock().await;
        self.ensure_ready(transport.as_ref())?;

        let frame = protocol::encode_query(self.address, mnemonic);
        let raw = exchange(transport.as_mut(), &frame).await?;
        protocol::verify_query(self.address, mnemonic, &frame, &raw)
    }

    /// Send a set for `mnemonic` with `parameter` and require the controller
    /// to echo the parameter back unchanged.
    pub async fn set(&self, mnemonic: &str, parameter: &str) -> Result<()> {
        let mut transport = self.transport.lock().await;
        self.ensure_ready(transport.as_ref())?;

        let frame = protocol::encode_set(self.address, mnemonic, parameter);
        let raw = exchange(transport.as_mut(), &frame).await?;
        protocol::verify_set(self.address, mnemonic, parameter, &frame, &raw)
    }

    fn ensure_ready(&self, transport: &dyn Transport) -> Result<()> {
        if !transport.is_connected() {
            return Err(Error::NotConnected);
        }
        validate::address(self.address)?;
        Ok(())
    }
}

/// Write one frame and read one reply. The caller holds the transport lock.
async fn exchange(transport: &mut dyn Transport, frame: &[u8]) -> Result<Vec<u8>> {
    trace!(frame = %String::from_utf8_lossy(frame), "tx");
    transport.write(frame).await?;
    let raw = transport.read_until(protocol::TERMINATOR).await?;
    trace!(frame = %String::from_utf8_lossy(&raw), "rx");
    Ok(raw)
}

impl std::fmt::Debug for Mks937b {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mks937b")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
