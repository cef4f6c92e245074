use std::fmt;

/// Timer1 clock source, selected through CKCON (T1M and SCA1:0)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Timer1Clock {
	Sysclk,
	SysclkDiv4,
	SysclkDiv12,
	SysclkDiv48,
}

impl Timer1Clock {
	// CKCON bits touched for Timer1: T1M (0x08) and SCA1:0 (0x03)
	pub const CKCON_MASK: u8 = 0x0b;

	pub fn divisor(self) -> u32 {
		match self {
			Timer1Clock::Sysclk => 1,
			Timer1Clock::SysclkDiv4 => 4,
			Timer1Clock::SysclkDiv12 => 12,
			Timer1Clock::SysclkDiv48 => 48,
		}
	}

	pub fn ckcon_bits(self) -> u8 {
		match self {
			Timer1Clock::Sysclk => 0x08, // T1M = 1
			Timer1Clock::SysclkDiv4 => 0x01, // SCA = 01
			Timer1Clock::SysclkDiv12 => 0x00, // SCA = 00
			Timer1Clock::SysclkDiv48 => 0x02, // SCA = 10
		}
	}

	/// apply to a previous CKCON value, keeping the bits of other timers
	pub fn apply_ckcon(self, ckcon: u8) -> u8 {
		(ckcon & !Self::CKCON_MASK) | self.ckcon_bits()
	}
}

/// UART0 clocked by Timer1 in 8-bit auto-reload mode (TMOD = 0x2?)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BaudConfig {
	pub clock: Timer1Clock,
	/// reload value for TH1 (TL1 is initialized to the same value)
	pub th1: u8,
	pub requested: u32,
	pub achieved: u32,
}

impl BaudConfig {
	/// deviation of the achieved from the requested baud rate in parts per million
	pub fn error_ppm(&self) -> i64 {
		(i64::from(self.achieved) - i64::from(self.requested)) * 1_000_000 / i64::from(self.requested)
	}
}

impl fmt::Display for BaudConfig {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f,
			"TH1 = 0x{:02x}, Timer1 clock SYSCLK/{} (CKCON bits 0x{:02x}), {} baud ({:+} ppm)",
			self.th1,
			self.clock.divisor(),
			self.clock.ckcon_bits(),
			self.achieved,
			self.error_ppm(),
		)
	}
}

/// pick the smallest Timer1 prescaler that keeps the reload within 8 bits.
///
/// A UART bit takes two Timer1 overflows.
pub fn uart_baud(sysclk_hz: u32, baud: u32) -> crate::AResult<BaudConfig> {
	ensure_config!(baud > 0, "baud rate must be positive");
	let half_bit = sysclk_hz / baud / 2;
	ensure_config!(half_bit > 0, "baud rate {} too fast for system clock {} Hz", baud, sysclk_hz);

	let range = half_bit / 256;
	let clock = if range < 1 {
		Timer1Clock::Sysclk
	} else if range < 4 {
		Timer1Clock::SysclkDiv4
	} else if range < 12 {
		Timer1Clock::SysclkDiv12
	} else if range < 48 {
		Timer1Clock::SysclkDiv48
	} else {
		return Err(crate::PeripheralError::config(format!(
			"unsupported baud rate {} for system clock {} Hz", baud, sysclk_hz
		)));
	};

	let ticks = half_bit / clock.divisor();
	// range checks above guarantee 1..=255 ticks, except for rounding at
	// the lower end of a range
	ensure_config!(ticks > 0 && ticks < 256, "baud rate {} needs {} Timer1 ticks", baud, ticks);
	let th1 = (256 - ticks) as u8;
	let achieved = sysclk_hz / clock.divisor() / ticks / 2;

	let config = BaudConfig {
		clock,
		th1,
		requested: baud,
		achieved,
	};
	debug!("UART0 at {} Hz: {}", sysclk_hz, config);
	Ok(config)
}
