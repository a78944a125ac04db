//! Error types for rtulink.
//!
//! All fallible operations across the workspace return [`Result<T>`], which
//! uses [`Error`] as the error type. Argument validation, frame validation,
//! device exceptions, and transport failures are all captured here.

use crate::types::{ExceptionCode, FunctionCode};

/// The error type for all rtulink operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An argument was rejected before anything was sent on the wire.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The checksum recomputed over a received frame does not match the
    /// frame's trailer.
    #[error("checksum mismatch: computed 0x{computed:04X}, received 0x{received:04X}")]
    Checksum {
        /// Checksum recomputed over the received header and body.
        computed: u16,
        /// Checksum carried in the frame's trailing two bytes.
        received: u16,
    },

    /// A structurally valid response that does not answer the request
    /// (wrong function code, echo mismatch, wrong byte count).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The device answered with an exception response.
    #[error("device exception for {function}: {code}")]
    Exception {
        /// Function the failed request used.
        function: FunctionCode,
        /// Exception code reported by the device.
        code: ExceptionCode,
    },

    /// A transport-level error (serial port open or configuration failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// Timed out waiting for response bytes.
    ///
    /// This typically indicates the device is unpowered, the baud rate is
    /// wrong, or the device is still rebooting after the port was opened.
    #[error("timeout waiting for response")]
    Timeout,

    /// No connection has been established, or it was closed.
    #[error("not connected")]
    NotConnected,

    /// The connection was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
