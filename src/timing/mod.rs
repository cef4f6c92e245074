/// Timer arithmetic for the 8051 counters.
///
/// All counters count *up* and raise their overflow flag when wrapping from
/// the all-ones value to zero. To get an overflow after `n` ticks the counter
/// is (re)loaded with `2^width - n`, i.e. the two's complement of `n`
/// truncated to the counter width.
///
/// Counter layouts:
/// - 8 bit (mode 2 / mode 3): a single register (TLx or THx)
/// - 13 bit (mode 0): THx holds bits 12..5, the lower 5 bits of TLx hold
///   bits 4..0
/// - 16 bit (mode 1, Timer2/3): THx:TLx

mod baud;
mod delay;
mod divider;
mod reload;

pub use self::baud::{
	BaudConfig,
	Timer1Clock,
	uart_baud,
};

pub use self::delay::{
	DelayPlan,
	delay_reload,
};

pub use self::divider::{
	OverflowDivider,
};

pub use self::reload::{
	Reload,
	reload_for_period,
	reload_for_rate,
	reload_for_ticks,
};

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum CounterWidth {
	Eight,
	Thirteen,
	Sixteen,
}

impl CounterWidth {
	pub fn from_bits(bits: u32) -> crate::AResult<Self> {
		match bits {
			8 => Ok(CounterWidth::Eight),
			13 => Ok(CounterWidth::Thirteen),
			16 => Ok(CounterWidth::Sixteen),
			_ => Err(crate::PeripheralError::config(format!("unsupported counter width {} (need 8, 13 or 16)", bits))),
		}
	}

	pub fn bits(self) -> u32 {
		match self {
			CounterWidth::Eight => 8,
			CounterWidth::Thirteen => 13,
			CounterWidth::Sixteen => 16,
		}
	}

	/// `2^width`
	pub fn modulus(self) -> u32 {
		1u32 << self.bits()
	}

	/// largest number of ticks a single period can span
	pub fn max_ticks(self) -> u32 {
		self.modulus() - 1
	}

	pub fn mask(self) -> u16 {
		self.max_ticks() as u16
	}
}

impl fmt::Display for CounterWidth {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}-bit", self.bits())
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PeriodUnit {
	Milliseconds,
	Microseconds,
}

impl PeriodUnit {
	pub fn per_second(self) -> u32 {
		match self {
			PeriodUnit::Milliseconds => 1_000,
			PeriodUnit::Microseconds => 1_000_000,
		}
	}
}

impl std::str::FromStr for PeriodUnit {
	type Err = failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"ms" => Ok(PeriodUnit::Milliseconds),
			"us" => Ok(PeriodUnit::Microseconds),
			_ => bail!("unknown period unit {:?} (expected \"ms\" or \"us\")", s),
		}
	}
}

/// System clock feeding a timer through a fixed prescaler (CKCON settings)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ClockConfig {
	sysclk_hz: u32,
	prescaler: u32,
}

impl ClockConfig {
	pub fn new(sysclk_hz: u32, prescaler: u32) -> crate::AResult<Self> {
		ensure_config!(sysclk_hz > 0, "system clock must be positive");
		ensure_config!(prescaler > 0, "prescaler must be positive");
		Ok(ClockConfig { sysclk_hz, prescaler })
	}

	pub fn sysclk_hz(&self) -> u32 {
		self.sysclk_hz
	}

	pub fn prescaler(&self) -> u32 {
		self.prescaler
	}

	/// timer ticks per second
	pub fn tick_hz(&self) -> u32 {
		self.sysclk_hz / self.prescaler
	}

	/// whole timer ticks per `unit`; truncates like the integer constants
	/// in the firmware did
	pub fn ticks_per(&self, unit: PeriodUnit) -> u32 {
		self.tick_hz() / unit.per_second()
	}
}

impl fmt::Display for ClockConfig {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{} Hz / {}", self.sysclk_hz, self.prescaler)
	}
}
