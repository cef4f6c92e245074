/// CRC-16 as computed by the CRC1 engine: arbitrary polynomial, MSB first,
/// result register cleared to zero, no reflection and no final xor.
///
/// The polynomial is given without its implicit x^16 term, so `x^16 + 1`
/// is `0x0001`. The engine can't do lower degree polynomials.

/// CRC-16/XMODEM (CCITT) polynomial
pub const CCITT: u16 = 0x1021;
/// CRC-16/BUYPASS polynomial
pub const IBM: u16 = 0x8005;

pub fn compute_crc16(polynomial: u16, data: &[u8]) -> crate::AResult<u16> {
	ensure_config!(0 != polynomial & 0x0001, "CRC polynomial 0x{:04x} lacks the x^0 term", polynomial);
	ensure_config!(!data.is_empty(), "CRC over zero bytes");

	let mut crc: u16 = 0;
	for &b in data {
		crc ^= u16::from(b) << 8;
		for _ in 0..8 {
			crc = if 0 != crc & 0x8000 {
				(crc << 1) ^ polynomial
			} else {
				crc << 1
			};
		}
	}
	trace!("CRC-16 (0x{:04x}) over {} bytes: 0x{:04x}", polynomial, data.len(), crc);
	Ok(crc)
}

#[cfg(test)]
mod test {
	use super::*;

	fn check_crc(polynomial: u16, data: &[u8], crc: u16) {
		assert_eq!(compute_crc16(polynomial, data).unwrap(), crc, "polynomial 0x{:04x}, data {:?}", polynomial, data);
	}

	#[test]
	fn check_values() {
		check_crc(CCITT, b"123456789", 0x31c3);
		check_crc(IBM, b"123456789", 0xfee8);
		check_crc(CCITT, b"A", 0x58e5);
		check_crc(CCITT, &[0x00], 0x0000);
	}

	#[test]
	fn x16_plus_one() {
		// x^16 = 1: the register rotates left once per bit
		check_crc(0x0001, &[0x80], 0x0080);
		check_crc(0x0001, &[0x12, 0x34], 0x1234);
		check_crc(0x0001, &[0x12, 0x34, 0x56], 0x3444);
	}

	#[test]
	fn invalid_input() {
		let e = compute_crc16(0x1020, b"123").unwrap_err();
		assert!(crate::PeripheralError::is_config(&e));
		let e = compute_crc16(CCITT, &[]).unwrap_err();
		assert!(crate::PeripheralError::is_config(&e));
	}
}
