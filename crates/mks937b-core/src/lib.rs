//! mks937b-core: error, transport and parameter types for the MKS 937B client.
//!
//! This crate holds the pieces shared by the protocol crate, the concrete
//! transports and the test harness. Applications that only need to name a
//! parameter or match on an error can depend on it without pulling in tokio.
//!
//! # Key types
//!
//! - [`Transport`] -- delimiter-framed link to a controller
//! - [`Error`] / [`Result`] -- error handling
//! - [`BaudRate`], [`PressureUnit`], [`ControlMode`], ... -- enumerated parameters

pub mod error;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
pub use transport::Transport;
pub use types::*;
