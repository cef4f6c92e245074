use super::{
	ClockConfig,
	CounterWidth,
	PeriodUnit,
	Reload,
	reload_for_period,
};

/// Timer2 (16 bit, clocked from SYSCLK) reload for a busy-wait of `micros`
pub fn delay_reload(sysclk_hz: u32, micros: u32) -> crate::AResult<Reload> {
	let clock = ClockConfig::new(sysclk_hz, 1)?;
	reload_for_period(clock, micros, PeriodUnit::Microseconds, CounterWidth::Sixteen)
}

/// Millisecond delays are built from repeated short timer delays, so the
/// 16-bit counter never needs to span a whole millisecond.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct DelayPlan {
	pub step: Reload,
	pub step_us: u32,
	pub steps: u32,
}

impl DelayPlan {
	pub const STEP_US: u32 = 100;

	pub fn millis(sysclk_hz: u32, millis: u32) -> crate::AResult<Self> {
		let steps = match millis.checked_mul(1000 / Self::STEP_US) {
			Some(s) => s,
			None => return Err(crate::PeripheralError::config(format!("delay of {} ms too long", millis))),
		};
		Ok(DelayPlan {
			step: delay_reload(sysclk_hz, Self::STEP_US)?,
			step_us: Self::STEP_US,
			steps,
		})
	}

	pub fn total_us(&self) -> u64 {
		u64::from(self.step_us) * u64::from(self.steps)
	}
}
