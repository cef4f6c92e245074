/// Programmable Counter Array helpers: capture-mode period measurement and
/// frequency output mode.

use crate::signal::Publisher;

/// PCA0CPHn value for frequency output mode; the output toggles every
/// `PCA0CPHn` timebase ticks (0 means 256).
///
/// `timebase_divisor` is the SYSCLK divisor selected in PCA0MD (12 in the
/// demo).
pub fn frequency_output(sysclk_hz: u32, timebase_divisor: u32, frequency_hz: u32) -> crate::AResult<u8> {
	ensure_config!(timebase_divisor > 0, "PCA timebase divisor must be positive");
	ensure_config!(frequency_hz > 0, "output frequency must be positive");
	let ticks = (sysclk_hz / timebase_divisor) / frequency_hz / 2;
	ensure_config!(ticks > 0 && ticks <= 256,
		"{} Hz not reachable with a PCA timebase of {} Hz ({} ticks per half period)",
		frequency_hz, sysclk_hz / timebase_divisor, ticks
	);
	Ok(ticks as u8) // 256 wraps to 0
}

/// frequency of a signal whose period measured `ticks` timebase ticks
pub fn period_to_hz(ticks: u16, timebase_hz: u32) -> Option<u32> {
	if 0 == ticks {
		None
	} else {
		Some(timebase_hz / u32::from(ticks))
	}
}

/// Interrupt side of a capture channel: turns consecutive capture
/// register snapshots into periods.
pub struct CaptureProducer<'a> {
	publisher: Publisher<'a>,
	previous: Option<u16>,
}

impl<'a> CaptureProducer<'a> {
	pub fn new(publisher: Publisher<'a>) -> Self {
		CaptureProducer {
			publisher,
			previous: None,
		}
	}

	/// call with PCA0CPn on each capture event (CCFn set). The first edge
	/// only establishes a reference point.
	pub fn on_capture(&mut self, captured: u16) -> Option<u16> {
		let period = self.previous.map(|previous| captured.wrapping_sub(previous));
		self.previous = Some(captured);
		if let Some(period) = period {
			self.publisher.publish(u32::from(period));
		}
		period
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::signal::Mailbox;
	use crate::timing::{
		CounterWidth,
		reload_for_ticks,
	};

	#[test]
	fn frequency_output_register() {
		// 24.5 MHz / 12, 50 kHz
		assert_eq!(frequency_output(24_500_000, 12, 50_000).unwrap(), 20);
		// exactly 256 ticks is encoded as 0
		assert_eq!(frequency_output(256 * 2 * 12 * 10, 12, 10).unwrap(), 0);
		let e = frequency_output(24_500_000, 12, 10).unwrap_err();
		assert!(crate::PeripheralError::is_config(&e));
		assert!(frequency_output(24_500_000, 12, 0).is_err());
		assert!(frequency_output(24_500_000, 12, 5_000_000).is_err());
	}

	#[test]
	fn capture_period_wraps() {
		let mut mailbox = Mailbox::new();
		let (publisher, mut subscriber) = mailbox.split();
		let mut capture = CaptureProducer::new(publisher);

		assert_eq!(capture.on_capture(0xfff0), None);
		assert_eq!(subscriber.take(), None);
		assert_eq!(capture.on_capture(0x0022), Some(0x32));
		assert_eq!(subscriber.take(), Some(0x32));
		assert_eq!(capture.on_capture(0x0054), Some(0x32));
		assert_eq!(capture.on_capture(0x0086), Some(0x32));
		assert_eq!(subscriber.take(), Some(0x32));
		assert_eq!(subscriber.overruns(), 1);
	}

	#[test]
	fn capture_demo_numbers() {
		// Timer0 overflows every 245 SYSCLKs and clocks the PCA: 100 kHz
		let t0 = reload_for_ticks(245, CounterWidth::Eight).unwrap();
		assert_eq!(t0.value(), 11);
		let timebase_hz = 24_500_000 / t0.ticks();
		assert_eq!(timebase_hz, 100_000);

		// test signal toggles every 6125 SYSCLKs: 2 kHz, 50 PCA ticks
		let period_ticks = (2 * 6125 / t0.ticks()) as u16;
		assert_eq!(period_ticks, 50);
		assert_eq!(period_to_hz(period_ticks, timebase_hz), Some(2000));
		assert_eq!(period_to_hz(0, timebase_hz), None);
	}
}
