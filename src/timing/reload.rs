use std::fmt;

use super::{
	ClockConfig,
	CounterWidth,
	PeriodUnit,
};

/// Value to (re)load into a counter so it overflows after the requested
/// number of ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reload {
	width: CounterWidth,
	value: u16,
}

impl Reload {
	pub fn width(&self) -> CounterWidth {
		self.width
	}

	/// reload value, masked to the counter width
	pub fn value(&self) -> u16 {
		self.value
	}

	/// ticks until overflow when started from this value
	pub fn ticks(&self) -> u32 {
		self.width.modulus() - u32::from(self.value)
	}

	/// split into (high, low) register contents.
	///
	/// for 8-bit counters both registers get the same value (mode 3 and
	/// auto-reload setups load THx and TLx alike).
	pub fn registers(&self) -> (u8, u8) {
		match self.width {
			CounterWidth::Eight => (self.value as u8, self.value as u8),
			CounterWidth::Thirteen => (((self.value >> 5) & 0xff) as u8, (self.value & 0x1f) as u8),
			CounterWidth::Sixteen => ((self.value >> 8) as u8, self.value as u8),
		}
	}

	/// inverse of `registers`; bits outside the counter are ignored (the
	/// upper 3 bits of TLx in 13-bit mode)
	pub fn from_registers(width: CounterWidth, high: u8, low: u8) -> Self {
		let value = match width {
			CounterWidth::Eight => u16::from(low),
			CounterWidth::Thirteen => (u16::from(high) << 5) | u16::from(low & 0x1f),
			CounterWidth::Sixteen => (u16::from(high) << 8) | u16::from(low),
		};
		Reload {
			width,
			value: value & width.mask(),
		}
	}
}

impl fmt::Display for Reload {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.width {
			CounterWidth::Eight => write!(f, "0x{:02x}", self.value),
			_ => write!(f, "0x{:04x}", self.value),
		}
	}
}

impl fmt::Debug for Reload {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let (high, low) = self.registers();
		write!(f,
			"{} {} (high: 0x{:02x}, low: 0x{:02x}, ticks: {})",
			self.width,
			self,
			high,
			low,
			self.ticks(),
		)
	}
}

/// reload value for an overflow after exactly `ticks` counter ticks
pub fn reload_for_ticks(ticks: u32, width: CounterWidth) -> crate::AResult<Reload> {
	ensure_config!(ticks > 0, "period of zero ticks (clock too slow for requested period?)");
	ensure_config!(ticks <= width.max_ticks(),
		"{} ticks per period don't fit a {} counter (max {})", ticks, width, width.max_ticks()
	);
	// ticks in 1..=max, so the difference is in 1..=max as well
	let value = (width.modulus() - ticks) as u16;
	Ok(Reload { width, value })
}

/// reload value for `period` units (ms or µs) of `clock`
pub fn reload_for_period(clock: ClockConfig, period: u32, unit: PeriodUnit, width: CounterWidth) -> crate::AResult<Reload> {
	let per_unit = clock.ticks_per(unit);
	let ticks = match per_unit.checked_mul(period) {
		Some(t) => t,
		None => return Err(crate::PeripheralError::config(format!(
			"{} ticks per unit times period {} overflows", per_unit, period
		))),
	};
	let reload = reload_for_ticks(ticks, width)?;
	debug!("reload for {} x {:?} at {}: {:?}", period, unit, clock, reload);
	Ok(reload)
}

/// reload value for an overflow `rate_hz` times a second
pub fn reload_for_rate(clock: ClockConfig, rate_hz: u32, width: CounterWidth) -> crate::AResult<Reload> {
	ensure_config!(rate_hz > 0, "overflow rate must be positive");
	let reload = reload_for_ticks(clock.tick_hz() / rate_hz, width)?;
	debug!("reload for {} Hz at {}: {:?}", rate_hz, clock, reload);
	Ok(reload)
}
