//! Register data model shared by the codec, the client, and the device side.

use std::fmt;

use crate::error::{Error, Result};

/// Address of a single 16-bit holding register.
pub type RegisterAddress = u16;

/// Value stored in a holding register. Opaque to the protocol.
pub type RegisterValue = u16;

/// Unit identifier of the addressed device. Fixed; never negotiated.
pub const UNIT_ID: u8 = 1;

/// Bit set in the function byte of an exception response.
pub const EXCEPTION_FLAG: u8 = 0x80;

/// Number of registers requested in one read.
///
/// Always in `1..=127`. Zero and anything from 128 upward are rejected at
/// construction, so a `RegisterCount` can never put an out-of-range quantity
/// on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterCount(u8);

impl RegisterCount {
    /// Smallest valid count.
    pub const MIN: u16 = 1;

    /// Largest valid count.
    pub const MAX: u16 = 127;

    /// Validate a raw register count.
    ///
    /// Returns [`Error::InvalidArgument`] if `count` is 0 or 128 and above.
    pub fn new(count: u16) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&count) {
            Ok(RegisterCount(count as u8))
        } else {
            Err(Error::InvalidArgument(format!(
                "register count {count} outside {}..={}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// The count as a plain integer.
    pub fn get(self) -> u16 {
        self.0 as u16
    }

    /// Number of data bytes a response carries for this many registers.
    pub fn byte_count(self) -> usize {
        2 * self.0 as usize
    }
}

impl TryFrom<u16> for RegisterCount {
    type Error = Error;

    fn try_from(count: u16) -> Result<Self> {
        RegisterCount::new(count)
    }
}

impl fmt::Display for RegisterCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two operations this protocol supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCode {
    /// Read a contiguous block of holding registers (code 3).
    ReadHoldingRegisters,
    /// Write one holding register (code 6).
    WriteSingleRegister,
}

impl FunctionCode {
    /// Wire value of this function code.
    pub fn code(self) -> u8 {
        match self {
            FunctionCode::ReadHoldingRegisters => 0x03,
            FunctionCode::WriteSingleRegister => 0x06,
        }
    }

    /// Function byte a device uses when reporting an exception for this code.
    pub fn exception_code(self) -> u8 {
        self.code() | EXCEPTION_FLAG
    }
}

impl TryFrom<u8> for FunctionCode {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0x03 => Ok(FunctionCode::ReadHoldingRegisters),
            0x06 => Ok(FunctionCode::WriteSingleRegister),
            other => Err(Error::Protocol(format!(
                "unknown function code 0x{other:02X}"
            ))),
        }
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionCode::ReadHoldingRegisters => write!(f, "read holding registers"),
            FunctionCode::WriteSingleRegister => write!(f, "write single register"),
        }
    }
}

/// Exception code carried in a device's exception response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionCode {
    /// The device does not implement the requested function.
    IllegalFunction,
    /// The register address is not valid on this device.
    IllegalDataAddress,
    /// A value in the request (e.g. the register count) is not acceptable.
    IllegalDataValue,
    /// The device failed while handling the request, including a request
    /// that arrived with a bad checksum.
    ServerDeviceFailure,
    /// Any other code.
    Unknown(u8),
}

impl ExceptionCode {
    /// Wire value of this exception code.
    pub fn code(self) -> u8 {
        match self {
            ExceptionCode::IllegalFunction => 0x01,
            ExceptionCode::IllegalDataAddress => 0x02,
            ExceptionCode::IllegalDataValue => 0x03,
            ExceptionCode::ServerDeviceFailure => 0x04,
            ExceptionCode::Unknown(code) => code,
        }
    }
}

impl From<u8> for ExceptionCode {
    fn from(code: u8) -> Self {
        match code {
            0x01 => ExceptionCode::IllegalFunction,
            0x02 => ExceptionCode::IllegalDataAddress,
            0x03 => ExceptionCode::IllegalDataValue,
            0x04 => ExceptionCode::ServerDeviceFailure,
            other => ExceptionCode::Unknown(other),
        }
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExceptionCode::IllegalFunction => write!(f, "illegal function"),
            ExceptionCode::IllegalDataAddress => write!(f, "illegal data address"),
            ExceptionCode::IllegalDataValue => write!(f, "illegal data value"),
            ExceptionCode::ServerDeviceFailure => write!(f, "server device failure"),
            ExceptionCode::Unknown(code) => write!(f, "exception 0x{code:02X}"),
        }
    }
}

/// Confirmation that a single-register write was echoed by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteAck {
    /// Register that was written.
    pub address: RegisterAddress,
    /// Value the device stored.
    pub value: RegisterValue,
}
