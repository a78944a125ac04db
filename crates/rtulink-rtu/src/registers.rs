//! Register byte-order conversion.
//!
//! Registers travel most-significant byte first. Conversion reads each byte
//! pair as big-endian directly, so the result is the same on any host.

use rtulink_core::{Error, RegisterCount, RegisterValue, Result};

/// Convert validated response data into `count` register values, in the
/// order they were requested.
///
/// Fails with [`Error::Protocol`] unless `data` holds exactly two bytes per
/// register.
pub fn registers_from_be(data: &[u8], count: RegisterCount) -> Result<Vec<RegisterValue>> {
    if data.len() != count.byte_count() {
        return Err(Error::Protocol(format!(
            "expected {} data bytes for {} registers, got {}",
            count.byte_count(),
            count,
            data.len()
        )));
    }

    Ok(data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}

/// Serialize register values for the wire, most-significant byte first.
pub fn registers_to_be(values: &[RegisterValue]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(n: u16) -> RegisterCount {
        RegisterCount::new(n).unwrap()
    }

    #[test]
    fn pairs_are_big_endian() {
        let data = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert_eq!(
            registers_from_be(&data, count(4)).unwrap(),
            vec![0x0001, 0x0203, 0x0405, 0x0607]
        );
    }

    #[test]
    fn single_register() {
        assert_eq!(
            registers_from_be(&[0xBE, 0xEF], count(1)).unwrap(),
            vec![0xBEEF]
        );
    }

    #[test]
    fn length_must_match_count() {
        assert!(matches!(
            registers_from_be(&[0x00, 0x01, 0x02], count(2)),
            Err(Error::Protocol(_))
        ));
        assert!(matches!(
            registers_from_be(&[0x00, 0x01, 0x02, 0x03], count(1)),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn to_be_is_inverse() {
        let values = [0x1234, 0x5678, 0x1020, 0x3040];
        let wire = registers_to_be(&values);
        assert_eq!(wire, vec![0x12, 0x34, 0x56, 0x78, 0x10, 0x20, 0x30, 0x40]);
        assert_eq!(registers_from_be(&wire, count(4)).unwrap(), values);
    }
}
