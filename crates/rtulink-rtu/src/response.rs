//! RTU response decoder and validator.
//!
//! A response is read in two steps: a fixed 3-byte header, then however
//! many bytes [`response_len`] says follow it. The complete frame is then
//! handed to [`decode_write_response`] or [`decode_read_response`].
//!
//! # Response formats
//!
//! ```text
//! write:      <unit> 0x06 <addr hi> <addr lo> <value hi> <value lo> <crc lo> <crc hi>
//! read:       <unit> 0x03 <byte count> <data: byte count bytes> <crc lo> <crc hi>
//! exception:  <unit> <function | 0x80> <exception code> <crc lo> <crc hi>
//! ```
//!
//! A write response is the request echoed back unchanged. Validation is
//! fail-fast: the first check that fails decides the error and no register
//! data is returned.

use rtulink_core::{Error, ExceptionCode, RegisterValue, Result, WriteAck, UNIT_ID};

use crate::crc::{verify_crc, CRC_LEN};
use crate::frame::Frame;
use crate::registers::registers_from_be;

/// Length of the response header: unit, function, and a third byte whose
/// meaning depends on the function.
pub const HEADER_LEN: usize = 3;

/// Length of an exception response.
pub const EXCEPTION_LEN: usize = HEADER_LEN + CRC_LEN;

/// Total length of the response whose first bytes are `header`.
///
/// Fails with [`Error::Protocol`] if the function byte answers neither the
/// request nor signals an exception for it.
pub fn response_len(request: &Frame, header: &[u8]) -> Result<usize> {
    if header.len() < HEADER_LEN {
        return Err(truncated(header.len()));
    }

    let function = header[1];
    if function == request.function().code() {
        Ok(request.expected_response_len())
    } else if function == request.function().exception_code() {
        Ok(EXCEPTION_LEN)
    } else {
        Err(unexpected_function(request, function))
    }
}

/// Validate the echo of a write-single-register request.
pub fn decode_write_response(request: &Frame, response: &[u8]) -> Result<WriteAck> {
    if request.register_count().is_some() {
        return Err(Error::InvalidArgument(
            "decode_write_response needs a write request".into(),
        ));
    }

    check_function(request, response)?;

    if response != request.as_bytes() {
        return Err(Error::Protocol(format!(
            "write echo mismatch: sent {:02X?}, received {:02X?}",
            request.as_bytes(),
            response
        )));
    }
    verify_crc(response)?;

    Ok(WriteAck {
        address: request.address(),
        value: request.operand(),
    })
}

/// Validate a read-holding-registers response and extract its registers.
pub fn decode_read_response(request: &Frame, response: &[u8]) -> Result<Vec<RegisterValue>> {
    let count = request.register_count().ok_or_else(|| {
        Error::InvalidArgument("decode_read_response needs a read request".into())
    })?;

    check_function(request, response)?;

    let expected_len = request.expected_response_len();
    if response.len() != expected_len {
        return Err(Error::Protocol(format!(
            "expected {expected_len}-byte response, got {} bytes",
            response.len()
        )));
    }
    verify_crc(response)?;

    if response[0] != UNIT_ID {
        return Err(Error::Protocol(format!(
            "response from unit {}, expected {UNIT_ID}",
            response[0]
        )));
    }
    let byte_count = response[2] as usize;
    if byte_count != count.byte_count() {
        return Err(Error::Protocol(format!(
            "byte count {byte_count} does not match {count} requested registers"
        )));
    }

    registers_from_be(&response[HEADER_LEN..expected_len - CRC_LEN], count)
}

/// Check the function byte, turning a well-formed exception response into
/// [`Error::Exception`].
fn check_function(request: &Frame, response: &[u8]) -> Result<()> {
    if response.len() < HEADER_LEN {
        return Err(truncated(response.len()));
    }

    let function = response[1];
    if function == request.function().code() {
        return Ok(());
    }
    if function != request.function().exception_code() {
        return Err(unexpected_function(request, function));
    }

    if response.len() != EXCEPTION_LEN {
        return Err(Error::Protocol(format!(
            "exception response of {} bytes, expected {EXCEPTION_LEN}",
            response.len()
        )));
    }
    verify_crc(response)?;
    Err(Error::Exception {
        function: request.function(),
        code: ExceptionCode::from(response[2]),
    })
}

fn truncated(len: usize) -> Error {
    Error::Protocol(format!(
        "truncated response: {len} bytes, header needs {HEADER_LEN}"
    ))
}

fn unexpected_function(request: &Frame, function: u8) -> Error {
    Error::Protocol(format!(
        "unexpected response: function 0x{function:02X} to a 0x{:02X} request",
        request.function().code()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::crc16;
    use crate::frame::{encode_read, encode_write};
    use rtulink_core::FunctionCode;

    /// Append a valid checksum trailer.
    fn with_crc(mut bytes: Vec<u8>) -> Vec<u8> {
        let crc = crc16(&bytes);
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes
    }

    // ---------------------------------------------------------------
    // response_len
    // ---------------------------------------------------------------

    #[test]
    fn response_len_for_read() {
        let request = encode_read(0x1234, 4).unwrap();
        assert_eq!(response_len(&request, &[0x01, 0x03, 0x08]).unwrap(), 13);
    }

    #[test]
    fn response_len_for_write() {
        let request = encode_write(0, 0x1234);
        assert_eq!(response_len(&request, &[0x01, 0x06, 0x00]).unwrap(), 8);
    }

    #[test]
    fn response_len_for_exception() {
        let request = encode_read(0x1234, 4).unwrap();
        assert_eq!(
            response_len(&request, &[0x01, 0x83, 0x02]).unwrap(),
            EXCEPTION_LEN
        );
    }

    #[test]
    fn response_len_rejects_other_function() {
        let request = encode_read(0x1234, 4).unwrap();
        assert!(matches!(
            response_len(&request, &[0x01, 0x06, 0x08]),
            Err(Error::Protocol(_))
        ));
        assert!(matches!(
            response_len(&request, &[0x01, 0x86, 0x08]),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn response_len_short_header() {
        let request = encode_write(0, 0);
        assert!(matches!(
            response_len(&request, &[0x01]),
            Err(Error::Protocol(_))
        ));
    }

    // ---------------------------------------------------------------
    // Write responses
    // ---------------------------------------------------------------

    #[test]
    fn write_echo_accepted() {
        let request = encode_write(0x2143, 0x5678);
        let echo = request.as_bytes().to_vec();
        let ack = decode_write_response(&request, &echo).unwrap();
        assert_eq!(
            ack,
            WriteAck {
                address: 0x2143,
                value: 0x5678
            }
        );
    }

    #[test]
    fn write_echo_mismatch_is_protocol_error() {
        let request = encode_write(0x0001, 0x5678);
        // A device that stored a different value, with a valid checksum.
        let echo = with_crc(vec![0x01, 0x06, 0x00, 0x01, 0x56, 0x79]);
        assert!(matches!(
            decode_write_response(&request, &echo),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn write_echo_truncated() {
        let request = encode_write(0x0001, 0x5678);
        let echo = &request.as_bytes()[..6];
        assert!(matches!(
            decode_write_response(&request, echo),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn write_exception_response() {
        let request = encode_write(0x2143, 0x5678);
        let response = [0x01, 0x86, 0x03, 0x02, 0x61];
        match decode_write_response(&request, &response) {
            Err(Error::Exception { function, code }) => {
                assert_eq!(function, FunctionCode::WriteSingleRegister);
                assert_eq!(code, ExceptionCode::IllegalDataValue);
            }
            other => panic!("expected Exception, got {other:?}"),
        }
    }

    #[test]
    fn write_response_wrong_function_with_valid_checksum() {
        let request = encode_write(0, 0x1234);
        // Same payload answered as a read, checksum recomputed.
        let response = with_crc(vec![0x01, 0x03, 0x00, 0x00, 0x12, 0x34]);
        match decode_write_response(&request, &response) {
            Err(Error::Protocol(msg)) => assert!(msg.contains("unexpected response")),
            other => panic!("expected Protocol error, got {other:?}"),
        }
    }

    #[test]
    fn write_decoder_rejects_read_request() {
        let request = encode_read(0, 1).unwrap();
        assert!(matches!(
            decode_write_response(&request, request.as_bytes()),
            Err(Error::InvalidArgument(_))
        ));
    }

    // ---------------------------------------------------------------
    // Read responses
    // ---------------------------------------------------------------

    #[test]
    fn read_response_decodes_in_order() {
        let request = encode_read(0x1234, 4).unwrap();
        let response = [
            0x01, 0x03, 0x08, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x93, 0xA6,
        ];
        assert_eq!(
            decode_read_response(&request, &response).unwrap(),
            vec![0x0001, 0x0203, 0x0405, 0x0607]
        );
    }

    #[test]
    fn read_response_bad_checksum() {
        let request = encode_read(0x1234, 4).unwrap();
        // Trailer sent high byte first.
        let response = [
            0x01, 0x03, 0x08, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0xA6, 0x93,
        ];
        match decode_read_response(&request, &response) {
            Err(Error::Checksum { computed, received }) => {
                assert_eq!(computed, 0xA693);
                assert_eq!(received, 0x93A6);
            }
            other => panic!("expected Checksum error, got {other:?}"),
        }
    }

    #[test]
    fn read_response_wrong_function_with_valid_checksum() {
        let request = encode_read(0, 1).unwrap();
        let response = with_crc(vec![0x01, 0x04, 0x02, 0x12, 0x34]);
        assert!(matches!(
            decode_read_response(&request, &response),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn read_response_wrong_byte_count_with_valid_checksum() {
        let request = encode_read(0, 1).unwrap();
        let response = with_crc(vec![0x01, 0x03, 0x04, 0x12, 0x34]);
        assert!(matches!(
            decode_read_response(&request, &response),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn read_response_wrong_unit_with_valid_checksum() {
        let request = encode_read(0, 1).unwrap();
        let response = with_crc(vec![0x02, 0x03, 0x02, 0x12, 0x34]);
        assert!(matches!(
            decode_read_response(&request, &response),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn read_response_wrong_length() {
        let request = encode_read(0, 2).unwrap();
        let response = with_crc(vec![0x01, 0x03, 0x02, 0x12, 0x34]);
        assert!(matches!(
            decode_read_response(&request, &response),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn read_exception_response() {
        let request = encode_read(0x1234, 4).unwrap();
        let response = [0x01, 0x83, 0x02, 0xC0, 0xF1];
        match decode_read_response(&request, &response) {
            Err(Error::Exception { function, code }) => {
                assert_eq!(function, FunctionCode::ReadHoldingRegisters);
                assert_eq!(code, ExceptionCode::IllegalDataAddress);
            }
            other => panic!("expected Exception, got {other:?}"),
        }
    }

    #[test]
    fn read_exception_with_bad_checksum() {
        let request = encode_read(0x1234, 4).unwrap();
        let response = [0x01, 0x83, 0x02, 0x00, 0x00];
        assert!(matches!(
            decode_read_response(&request, &response),
            Err(Error::Checksum { .. })
        ));
    }

    #[test]
    fn read_decoder_rejects_write_request() {
        let request = encode_write(0, 1);
        assert!(matches!(
            decode_read_response(&request, request.as_bytes()),
            Err(Error::InvalidArgument(_))
        ));
    }
}
