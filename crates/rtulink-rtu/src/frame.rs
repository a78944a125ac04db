//! RTU request frame encoder.
//!
//! # Frame format
//!
//! ```text
//! <unit> <function> <addr hi> <addr lo> <operand hi> <operand lo> <crc lo> <crc hi>
//! ```
//!
//! - `unit`: always [`UNIT_ID`]
//! - `function`: `0x06` write single register, `0x03` read holding registers
//! - `addr`: register address, big-endian
//! - `operand`: the value to write, or the number of registers to read, big-endian
//! - `crc`: CRC-16 of the six preceding bytes, low byte first

use bytes::{BufMut, BytesMut};
use rtulink_core::{
    FunctionCode, RegisterAddress, RegisterCount, RegisterValue, Result, UNIT_ID,
};

use crate::crc::{crc16, CRC_LEN};

/// Length of every request frame, and of a write acknowledgement.
pub const REQUEST_LEN: usize = 8;

/// Length of the fixed part of a read response: unit, function, byte count,
/// and the checksum trailer.
pub const READ_RESPONSE_OVERHEAD: usize = 3 + CRC_LEN;

/// A complete request frame, checksum included.
///
/// Built by [`encode_write`] or [`encode_read`] and never modified
/// afterwards. The fields the frame was built from are kept alongside the
/// bytes so the response decoder can check the reply against them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    function: FunctionCode,
    address: RegisterAddress,
    operand: u16,
    bytes: Vec<u8>,
}

impl Frame {
    fn build(function: FunctionCode, address: RegisterAddress, operand: u16) -> Frame {
        let mut buf = BytesMut::with_capacity(REQUEST_LEN);
        buf.put_u8(UNIT_ID);
        buf.put_u8(function.code());
        buf.put_u16(address);
        buf.put_u16(operand);
        let crc = crc16(&buf);
        buf.put_u16_le(crc);

        Frame {
            function,
            address,
            operand,
            bytes: buf.to_vec(),
        }
    }

    /// Function code this frame requests.
    pub fn function(&self) -> FunctionCode {
        self.function
    }

    /// Register address this frame targets.
    pub fn address(&self) -> RegisterAddress {
        self.address
    }

    /// Value to write (write frames) or register count (read frames).
    pub fn operand(&self) -> u16 {
        self.operand
    }

    /// Number of registers requested, for read frames.
    pub fn register_count(&self) -> Option<RegisterCount> {
        match self.function {
            FunctionCode::ReadHoldingRegisters => RegisterCount::new(self.operand).ok(),
            FunctionCode::WriteSingleRegister => None,
        }
    }

    /// Length of the successful response this request should produce.
    pub fn expected_response_len(&self) -> usize {
        match self.register_count() {
            Some(count) => READ_RESPONSE_OVERHEAD + count.byte_count(),
            None => REQUEST_LEN,
        }
    }

    /// The wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the frame, returning its wire bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Build a write-single-register request.
///
/// ```
/// use rtulink_rtu::frame::encode_write;
///
/// let frame = encode_write(0x0000, 0x1234);
/// assert_eq!(frame.as_bytes(), &[0x01, 0x06, 0x00, 0x00, 0x12, 0x34, 0x84, 0xBD]);
/// ```
pub fn encode_write(address: RegisterAddress, value: RegisterValue) -> Frame {
    Frame::build(FunctionCode::WriteSingleRegister, address, value)
}

/// Build a read-holding-registers request for `count` registers.
///
/// Fails with [`Error::InvalidArgument`](rtulink_core::Error::InvalidArgument)
/// if `count` is 0 or 128 and above.
///
/// ```
/// use rtulink_rtu::frame::encode_read;
///
/// let frame = encode_read(0x1234, 4).unwrap();
/// assert_eq!(frame.as_bytes(), &[0x01, 0x03, 0x12, 0x34, 0x00, 0x04, 0x00, 0xBF]);
/// assert!(encode_read(0x1234, 128).is_err());
/// ```
pub fn encode_read(address: RegisterAddress, count: u16) -> Result<Frame> {
    let count = RegisterCount::new(count)?;
    Ok(Frame::build(
        FunctionCode::ReadHoldingRegisters,
        address,
        count.get(),
    ))
}
