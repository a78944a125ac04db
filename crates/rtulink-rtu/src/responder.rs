//! Device-side request handling.
//!
//! [`Responder`] answers RTU requests on behalf of a device, backed by any
//! [`RegisterBank`]. It produces exactly the replies the client in this
//! crate expects: the request echoed for a write, a byte-counted register
//! block for a read, and a 5-byte exception frame when the request cannot be
//! served.
//!
//! | Request                              | Reply                         |
//! |--------------------------------------|-------------------------------|
//! | addressed to another unit            | none                          |
//! | function other than 3 or 6           | exception `IllegalFunction`   |
//! | not exactly 8 bytes                  | none                          |
//! | bad checksum                         | exception `ServerDeviceFailure` |
//! | read of 0 or too many registers      | exception `IllegalDataValue`  |
//! | bank refuses the read or write       | exception with the bank's code |

use std::collections::BTreeMap;

use bytes::{BufMut, BytesMut};
use rtulink_core::{
    ExceptionCode, FunctionCode, RegisterAddress, RegisterCount, RegisterValue, UNIT_ID,
};

use crate::crc::{crc16, verify_crc};
use crate::frame::REQUEST_LEN;
use crate::registers::registers_to_be;

/// Storage a [`Responder`] reads from and writes to.
pub trait RegisterBank {
    /// Return `count` registers starting at `address`.
    fn read_holding(
        &mut self,
        address: RegisterAddress,
        count: u16,
    ) -> Result<Vec<RegisterValue>, ExceptionCode>;

    /// Store `value` at `address`.
    fn write_holding(
        &mut self,
        address: RegisterAddress,
        value: RegisterValue,
    ) -> Result<(), ExceptionCode>;
}

/// In-memory register bank. Every register reads as zero until written.
#[derive(Debug, Clone, Default)]
pub struct RegisterMap {
    registers: BTreeMap<RegisterAddress, RegisterValue>,
}

impl RegisterMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of one register.
    pub fn get(&self, address: RegisterAddress) -> RegisterValue {
        self.registers.get(&address).copied().unwrap_or(0)
    }

    /// Set one register directly, bypassing the protocol.
    pub fn set(&mut self, address: RegisterAddress, value: RegisterValue) {
        self.registers.insert(address, value);
    }
}

impl RegisterBank for RegisterMap {
    fn read_holding(
        &mut self,
        address: RegisterAddress,
        count: u16,
    ) -> Result<Vec<RegisterValue>, ExceptionCode> {
        let end = address as u32 + count as u32;
        if end > u16::MAX as u32 + 1 {
            return Err(ExceptionCode::IllegalDataAddress);
        }
        Ok((address as u32..end).map(|a| self.get(a as u16)).collect())
    }

    fn write_holding(
        &mut self,
        address: RegisterAddress,
        value: RegisterValue,
    ) -> Result<(), ExceptionCode> {
        self.set(address, value);
        Ok(())
    }
}

/// Answers requests addressed to [`UNIT_ID`] using a [`RegisterBank`].
#[derive(Debug)]
pub struct Responder<B> {
    bank: B,
    max_read: u16,
}

impl<B: RegisterBank> Responder<B> {
    /// Create a responder that serves reads of up to
    /// [`RegisterCount::MAX`] registers.
    pub fn new(bank: B) -> Self {
        Responder {
            bank,
            max_read: RegisterCount::MAX,
        }
    }

    /// Limit how many registers one read may request. Larger reads get an
    /// `IllegalDataValue` exception, as on a device with a small buffer.
    pub fn with_max_read(mut self, max_read: u16) -> Self {
        self.max_read = max_read.min(RegisterCount::MAX);
        self
    }

    /// The backing register bank.
    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Mutable access to the backing register bank.
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    /// Handle one complete request frame.
    ///
    /// Returns the reply frame, or `None` when the device stays silent.
    pub fn handle(&mut self, request: &[u8]) -> Option<Vec<u8>> {
        if request.len() < 2 || request[0] != UNIT_ID {
            return None;
        }

        let function = match FunctionCode::try_from(request[1]) {
            Ok(function) => function,
            Err(_) => {
                tracing::debug!(function = request[1], "illegal function");
                return Some(exception_frame(request[1], ExceptionCode::IllegalFunction));
            }
        };

        if request.len() != REQUEST_LEN {
            tracing::debug!(len = request.len(), "incomplete request ignored");
            return None;
        }
        if verify_crc(request).is_err() {
            return Some(exception_frame(
                request[1],
                ExceptionCode::ServerDeviceFailure,
            ));
        }

        let address = u16::from_be_bytes([request[2], request[3]]);
        let operand = u16::from_be_bytes([request[4], request[5]]);

        let outcome = match function {
            FunctionCode::ReadHoldingRegisters => self.read(address, operand),
            FunctionCode::WriteSingleRegister => self
                .bank
                .write_holding(address, operand)
                .map(|()| request.to_vec()),
        };

        Some(outcome.unwrap_or_else(|code| exception_frame(request[1], code)))
    }

    fn read(&mut self, address: RegisterAddress, count: u16) -> Result<Vec<u8>, ExceptionCode> {
        if count == 0 || count > self.max_read {
            return Err(ExceptionCode::IllegalDataValue);
        }

        let values = self.bank.read_holding(address, count)?;
        if values.len() != count as usize {
            return Err(ExceptionCode::ServerDeviceFailure);
        }

        let data = registers_to_be(&values);
        let mut buf = BytesMut::with_capacity(3 + data.len() + 2);
        buf.put_u8(UNIT_ID);
        buf.put_u8(FunctionCode::ReadHoldingRegisters.code());
        buf.put_u8(data.len() as u8);
        buf.put_slice(&data);
        let crc = crc16(&buf);
        buf.put_u16_le(crc);
        Ok(buf.to_vec())
    }
}

/// Build the 5-byte exception reply for a request with function byte
/// `function`.
pub fn exception_frame(function: u8, code: ExceptionCode) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(5);
    buf.put_u8(UNIT_ID);
    buf.put_u8(function | rtulink_core::EXCEPTION_FLAG);
    buf.put_u8(code.code());
    let crc = crc16(&buf);
    buf.put_u16_le(crc);
    buf.to_vec()
}
