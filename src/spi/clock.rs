/// SPI0CKR setting; SCK runs at `SYSCLK / (2 * (SPI0CKR + 1))`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SpiClock {
	pub spi0ckr: u8,
	pub sck_hz: u32,
}

/// fastest SCK not exceeding `max_sck_hz`
pub fn clock_divider(sysclk_hz: u32, max_sck_hz: u32) -> crate::AResult<SpiClock> {
	ensure_config!(max_sck_hz > 0, "maximum SCK frequency must be positive");
	let divider = sysclk_hz / max_sck_hz / 2;
	ensure_config!(divider <= 0xff,
		"SCK of {} Hz too slow for system clock {} Hz (SPI0CKR would be {})", max_sck_hz, sysclk_hz, divider
	);
	Ok(SpiClock {
		spi0ckr: divider as u8,
		sck_hz: sysclk_hz / (2 * (divider + 1)),
	})
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn eeprom_clock() {
		let clock = clock_divider(24_500_000, 2_000_000).unwrap();
		assert_eq!(clock.spi0ckr, 6);
		assert_eq!(clock.sck_hz, 1_750_000);
	}

	#[test]
	fn never_faster_than_requested() {
		for &max in [100_000u32, 1_000_000, 2_000_000, 3_000_000, 12_250_000, 20_000_000].iter() {
			let clock = clock_divider(24_500_000, max).unwrap();
			assert!(clock.sck_hz <= max, "{:?} exceeds {} Hz", clock, max);
		}
	}

	#[test]
	fn out_of_range() {
		assert!(clock_divider(24_500_000, 0).is_err());
		let e = clock_divider(24_500_000, 40_000).unwrap_err();
		assert!(crate::PeripheralError::is_config(&e));
	}
}
