//! Client for the MKS 937B vacuum gauge controller.
//!
//! The 937B speaks a line-oriented ASCII protocol over RS-232/RS-485 or a
//! TCP serial device server. Each request is one addressed frame and each
//! reply is one acknowledgement frame. This crate provides:
//!
//! - **Frame codec** ([`protocol`]) -- encode query/set frames and verify
//!   `ACK`/`NAK` replies against the request that produced them.
//! - **Reading decoder** ([`readings`]) -- turn a pressure field into a
//!   number or a sensor status such as `LO<` or `MISCONN`.
//! - **Validation** ([`validate`]) -- channel, address and range checks run
//!   before anything is sent.
//! - **Gateway** ([`gauge`]) -- [`Mks937b`], which owns the address and the
//!   transport and serializes every exchange. Typed getters and setters for
//!   the controller's parameters are defined in [`system`], [`control`],
//!   [`sensor`] and [`readings`].
//! - **Builder** ([`builder`]) -- open a serial or TCP link and get a
//!   connected [`Mks937b`].
//!
//! # Example
//!
//! ```
//! use mks937b::protocol::{encode_query, verify_query};
//! use mks937b::readings::{parse_reading, PressureStatus};
//!
//! let frame = encode_query(1, "PR1");
//! assert_eq!(frame, b"@001PR1?;FF");
//!
//! // Simulate the controller's answer.
//! let value = verify_query(1, "PR1", &frame, b"@001ACKLO<;FF").unwrap();
//! let reading = parse_reading(&value).unwrap();
//! assert_eq!(reading.status, PressureStatus::BelowRange);
//! ```

pub mod builder;
pub mod commands;
pub mod control;
pub mod gauge;
pub mod protocol;
pub mod readings;
pub mod sensor;
pub mod system;
pub mod validate;

// Re-export the primary types for ergonomic `use mks937b::*`.
pub use builder::Mks937bBuilder;
pub use gauge::Mks937b;
pub use mks937b_core::{Error, Result, Transport, types::*};
pub use readings::{PressureStatus, Reading};
