//! CRC-16 checksum used to protect every RTU frame.
//!
//! Reflected polynomial `0xA001`, initial value `0xFFFF`, no final XOR.
//! The checksum is appended to a frame low byte first.

use rtulink_core::{Error, Result};

/// Length of the checksum trailer in bytes.
pub const CRC_LEN: usize = 2;

const POLYNOMIAL: u16 = 0xA001;
const INITIAL: u16 = 0xFFFF;

/// Fold one byte into a running checksum.
pub fn crc16_update(crc: u16, byte: u8) -> u16 {
    let mut crc = crc ^ byte as u16;
    for _ in 0..8 {
        if crc & 0x0001 != 0 {
            crc = (crc >> 1) ^ POLYNOMIAL;
        } else {
            crc >>= 1;
        }
    }
    crc
}

/// Compute the checksum of `data`.
///
/// ```
/// use rtulink_rtu::crc::crc16;
///
/// assert_eq!(crc16(&[0x01, 0x03, 0x12, 0x34, 0x00, 0x04]), 0xBF00);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(INITIAL, |crc, &byte| crc16_update(crc, byte))
}

/// Check the trailing two bytes of `frame` against the checksum of
/// everything before them.
///
/// Fails with [`Error::Protocol`] if the frame is too short to carry a
/// trailer and [`Error::Checksum`] if the values differ.
pub fn verify_crc(frame: &[u8]) -> Result<()> {
    if frame.len() < CRC_LEN {
        return Err(Error::Protocol(format!(
            "frame of {} bytes has no checksum trailer",
            frame.len()
        )));
    }
    let (body, trailer) = frame.split_at(frame.len() - CRC_LEN);
    let received = u16::from_le_bytes([trailer[0], trailer[1]]);
    let computed = crc16(body);
    if computed != received {
        tracing::debug!(computed, received, "checksum mismatch");
        return Err(Error::Checksum { computed, received });
    }
    Ok(())
}
