//! Transport implementations for the MKS 937B client.
//!
//! This crate provides concrete implementations of the
//! [`Transport`](mks937b_core::Transport) trait from `mks937b-core`:
//!
//! - [`SerialTransport`]: RS-232/RS-485 ports, including USB adapters
//! - [`TcpTransport`]: raw TCP sockets to a serial device server
//!
//! Both are created disconnected, open their link on `connect()`, and
//! implement `read_until` over an internal receive buffer bounded by a
//! configurable read timeout.

mod framing;
pub mod serial;
pub mod tcp;

pub use serial::{DataBits, FlowControl, SerialConfig, SerialTransport, StopBits};
pub use tcp::{TcpConfig, TcpTransport};
