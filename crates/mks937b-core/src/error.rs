//! Error types for the MKS 937B client.
//!
//! All fallible operations across the workspace return [`Result<T>`], which
//! uses [`Error`] as the error type. Parameter validation, frame verification,
//! reading decode and transport failures are all captured here so callers can
//! match on a single enum.

/// The error type for all MKS 937B operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A query or set was attempted while the transport is not connected.
    #[error("device not connected")]
    NotConnected,

    /// Device address outside 1..=254.
    #[error("address must be an integer value between 1 and 254, got {got}")]
    InvalidAddress { got: u32 },

    /// Pressure channel outside the range accepted by the command.
    #[error("channel must be an integer value between {min} and {max}, got {got}")]
    InvalidChannel { min: u8, max: u8, got: u8 },

    /// Control/sensor channel other than 1, 3 or 5.
    #[error("channel must be an integer value among 1, 3 or 5, got {got}")]
    InvalidChannelControl { got: u8 },

    #[error("baud rate must be 9600, 19200, 38400, 57600 or 115200, got {got}")]
    InvalidBaudRate { got: String },

    #[error("parity must be NONE, EVEN or ODD, got {got}")]
    InvalidParity { got: String },

    #[error("unit must be Torr, MBAR, PASCAL or Micron, got {got}")]
    InvalidUnit { got: String },

    #[error("control mode must be AUTO, SAFE or OFF, got {got}")]
    InvalidControlMode { got: String },

    #[error("control channel must be A1, A2, B1, B2, C1, C2 or OFF, got {got}")]
    InvalidCSE { got: String },

    #[error("filament must be 1 or 2, got {got}")]
    InvalidFilament { got: String },

    #[error("emission current must be 20UA, 100UA, AUTO20 or AUTO100, got {got}")]
    InvalidEmissionCurrent { got: String },

    #[error("gas type must be NITROGEN, ARGON or HELIUM, got {got}")]
    InvalidGas { got: String },

    /// Protection set point neither 0 (disabled) nor inside its range.
    #[error("protection target must be 0 (disabled) or between {min:.2E} and {max:.2E}, got {got:.2E}")]
    InvalidPRO { min: f64, max: f64, got: f64 },

    /// Numeric parameter outside its documented bounds.
    #[error("value must be between {min:.2E} and {max:.2E}, got {got:.2E}")]
    InvalidRangeExp { min: f64, max: f64, got: f64 },

    /// The response does not match the `@<addr>(ACK|NAK)<value>;FF` grammar.
    #[error("unexpected reply, sent {sent} got {got}")]
    UnexpectedReply { sent: String, got: String },

    /// The response came from a different address than the request targeted.
    #[error("unexpected address, expected {expected} got {got}")]
    UnexpectedAddress { expected: String, got: String },

    /// The echoed parameter of a set command differs from the one sent.
    #[error("unexpected parameter, expected {expected} got {got}")]
    UnexpectedParameter { expected: String, got: String },

    /// The controller rejected the command with a negative acknowledgement.
    #[error("{command} rejected by controller (NAK{code})")]
    Nak { command: String, code: String },

    /// A pressure field is neither a status token nor a number.
    #[error("invalid pressure reading: {got:?}")]
    InvalidReading { got: String },

    /// A query reply could not be parsed into the expected type.
    #[error("invalid value for {command}: {got:?}")]
    InvalidValue { command: String, got: String },

    /// Invalid client configuration, such as a builder with no link set.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A transport-level error (serial port, TCP socket).
    #[error("transport error: {0}")]
    Transport(String),

    /// Timed out waiting for the controller.
    #[error("timeout waiting for response")]
    Timeout,

    /// The connection to the controller was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_invalid_address() {
        let e = Error::InvalidAddress { got: 255 };
        assert_eq!(
            e.to_string(),
            "address must be an integer value between 1 and 254, got 255"
        );
    }

    #[test]
    fn error_display_invalid_channel() {
        let e = Error::InvalidChannel {
            min: 1,
            max: 6,
            got: 7,
        };
        assert_eq!(
            e.to_string(),
            "channel must be an integer value between 1 and 6, got 7"
        );
    }

    #[test]
    fn error_display_range_uses_scientific() {
        let e = Error::InvalidRangeExp {
            min: 5.0,
            max: 240.0,
            got: 300.0,
        };
        assert_eq!(e.to_string(), "value must be between 5.00E0 and 2.40E2, got 3.00E2");
    }

    #[test]
    fn error_display_unexpected_reply() {
        let e = Error::UnexpectedReply {
            sent: "@048PR1?;FF".into(),
            got: "garbage".into(),
        };
        assert_eq!(e.to_string(), "unexpected reply, sent @048PR1?;FF got garbage");
    }

    #[test]
    fn error_display_nak() {
        let e = Error::Nak {
            command: "CSP1".into(),
            code: "172".into(),
        };
        assert_eq!(e.to_string(), "CSP1 rejected by controller (NAK172)");
    }

    #[test]
    fn error_display_timeout() {
        assert_eq!(Error::Timeout.to_string(), "timeout waiting for response");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
