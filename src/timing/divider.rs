/// Counts timer overflows inside an interrupt handler and fires every
/// `rate` overflows, e.g. toggling an LED every 100 one-millisecond ticks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct OverflowDivider {
	rate: u32,
	count: u32,
}

impl OverflowDivider {
	pub fn new(rate: u32) -> crate::AResult<Self> {
		ensure_config!(rate > 0, "overflow divider rate must be positive");
		Ok(OverflowDivider { rate, count: 0 })
	}

	pub fn rate(&self) -> u32 {
		self.rate
	}

	/// call once per overflow; true on every `rate`-th call
	pub fn tick(&mut self) -> bool {
		self.count += 1;
		if self.count == self.rate {
			self.count = 0;
			true
		} else {
			false
		}
	}

	pub fn reset(&mut self) {
		self.count = 0;
	}
}

#[cfg(test)]
mod test {
	use super::OverflowDivider;

	#[test]
	fn fires_every_rate_ticks() {
		let mut div = OverflowDivider::new(3).unwrap();
		let fired: Vec<bool> = (0..9).map(|_| div.tick()).collect();
		assert_eq!(fired, [false, false, true, false, false, true, false, false, true]);
	}

	#[test]
	fn rate_one() {
		let mut div = OverflowDivider::new(1).unwrap();
		assert!(div.tick());
		assert!(div.tick());
	}

	#[test]
	fn reset_restarts_count() {
		let mut div = OverflowDivider::new(2).unwrap();
		assert!(!div.tick());
		div.reset();
		assert!(!div.tick());
		assert!(div.tick());
	}

	#[test]
	fn zero_rate() {
		assert!(OverflowDivider::new(0).is_err());
	}
}
