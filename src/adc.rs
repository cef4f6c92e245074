/// ADC0 helpers: SAR clock setup and averaging of conversion results.

use crate::signal::Publisher;

/// internal voltage reference of the demo boards
pub const VREF_MV: u32 = 2440;
/// right-justified 10-bit result
pub const FULL_SCALE: u32 = 1023;
/// conversions averaged per printed value
pub const DEFAULT_WINDOW: u32 = 2048;

/// ADC0CF bits 7..3 (AD0SC): SAR clock = SYSCLK / (AD0SC + 1)
pub fn sar_clock_bits(sysclk_hz: u32, sar_hz: u32) -> crate::AResult<u8> {
	ensure_config!(sar_hz > 0, "SAR clock must be positive");
	ensure_config!(sysclk_hz >= sar_hz, "SAR clock {} Hz faster than system clock {} Hz", sar_hz, sysclk_hz);
	let divider = sysclk_hz / sar_hz - 1;
	ensure_config!(divider <= 0x1f, "SAR clock {} Hz too slow for system clock {} Hz", sar_hz, sysclk_hz);
	Ok((divider as u8) << 3)
}

pub fn to_millivolts(average: u32, vref_mv: u32, full_scale: u32) -> crate::AResult<u32> {
	ensure_config!(full_scale > 0, "ADC full scale must be positive");
	let mv = u64::from(average) * u64::from(vref_mv) / u64::from(full_scale);
	ensure_config!(mv <= u64::from(u32::max_value()),
		"{} / {} of {} mV doesn't fit 32 bits", average, full_scale, vref_mv
	);
	Ok(mv as u32)
}

/// Sums `window` conversions, then yields their (truncated) average.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Averager {
	window: u32,
	remaining: u32,
	accumulator: u64,
}

impl Averager {
	pub fn new(window: u32) -> crate::AResult<Self> {
		ensure_config!(window > 0, "averaging window must be positive");
		Ok(Averager {
			window,
			remaining: window,
			accumulator: 0,
		})
	}

	pub fn window(&self) -> u32 {
		self.window
	}

	pub fn push(&mut self, sample: u16) -> Option<u32> {
		self.accumulator += u64::from(sample);
		self.remaining -= 1;
		if 0 != self.remaining {
			return None;
		}
		let average = (self.accumulator / u64::from(self.window)) as u32;
		self.accumulator = 0;
		self.remaining = self.window;
		Some(average)
	}
}

/// conversion complete handler: averages and publishes millivolts
pub struct VoltageMonitor<'a> {
	averager: Averager,
	publisher: Publisher<'a>,
}

impl<'a> VoltageMonitor<'a> {
	pub fn new(window: u32, publisher: Publisher<'a>) -> crate::AResult<Self> {
		Ok(VoltageMonitor {
			averager: Averager::new(window)?,
			publisher,
		})
	}

	pub fn on_conversion(&mut self, sample: u16) -> crate::AResult<()> {
		if let Some(average) = self.averager.push(sample) {
			let mv = to_millivolts(average, VREF_MV, FULL_SCALE)?;
			debug!("ADC average {} -> {} mV", average, mv);
			self.publisher.publish(mv);
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::signal::Mailbox;

	#[test]
	fn sar_clock() {
		assert_eq!(sar_clock_bits(24_500_000, 3_000_000).unwrap(), 0x38);
		assert_eq!(sar_clock_bits(3_000_000, 3_000_000).unwrap(), 0x00);
		assert!(sar_clock_bits(24_500_000, 100_000).is_err());
		assert!(sar_clock_bits(1_000_000, 3_000_000).is_err());
		assert!(sar_clock_bits(1_000_000, 0).is_err());
	}

	#[test]
	fn scaling() {
		assert_eq!(to_millivolts(0, VREF_MV, FULL_SCALE).unwrap(), 0);
		assert_eq!(to_millivolts(1023, VREF_MV, FULL_SCALE).unwrap(), 2440);
		assert_eq!(to_millivolts(512, VREF_MV, FULL_SCALE).unwrap(), 1221);
	}

	#[test]
	fn scaling_rejects_bad_reference() {
		let e = to_millivolts(512, VREF_MV, 0).unwrap_err();
		assert!(crate::PeripheralError::is_config(&e));
		let e = to_millivolts(u32::max_value(), u32::max_value(), 1).unwrap_err();
		assert!(crate::PeripheralError::is_config(&e));
		// large intermediate product is fine as long as the result fits
		assert_eq!(to_millivolts(u32::max_value(), u32::max_value(), u32::max_value()).unwrap(), u32::max_value());
	}

	#[test]
	fn averaging_window() {
		let mut avg = Averager::new(4).unwrap();
		assert_eq!(avg.push(10), None);
		assert_eq!(avg.push(11), None);
		assert_eq!(avg.push(12), None);
		assert_eq!(avg.push(14), Some(11));
		// accumulator restarted
		for _ in 0..3 {
			assert_eq!(avg.push(1023), None);
		}
		assert_eq!(avg.push(1023), Some(1023));
		assert!(Averager::new(0).is_err());
	}

	#[test]
	fn monitor_publishes_millivolts() {
		let mut mailbox = Mailbox::new();
		let (publisher, mut subscriber) = mailbox.split();
		let mut monitor = VoltageMonitor::new(DEFAULT_WINDOW, publisher).unwrap();
		for i in 0..DEFAULT_WINDOW {
			monitor.on_conversion(if i % 2 == 0 { 511 } else { 513 }).unwrap();
			if i + 1 < DEFAULT_WINDOW {
				assert_eq!(subscriber.take(), None);
			}
		}
		assert_eq!(subscriber.take(), Some(1221));
	}
}
