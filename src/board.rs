/// Board level settings shared by the tools; defaults match the SPI EEPROM
/// demo board (internal 24.5 MHz oscillator, 4 KB EEPROM on SPI0, UART0
/// console at 115200 baud).

use std::fmt;

use crate::eeprom::Timeouts;
use crate::eeprom::consts::MAX_CAPACITY;
use crate::spi::{
	NSS_DISABLE_US,
	SpiClock,
	clock_divider,
};
use crate::timing::{
	BaudConfig,
	Reload,
	delay_reload,
	uart_baud,
};

pub const SYSCLK: u32 = 24_500_000;
pub const BAUDRATE: u32 = 115_200;
pub const F_SCK_MAX: u32 = 2_000_000;
pub const EEPROM_CAPACITY: usize = 4096;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BoardConfig {
	pub sysclk_hz: u32,
	pub baud: u32,
	pub spi_max_hz: u32,
	pub eeprom_capacity: usize,
	pub timeouts: Timeouts,
}

impl Default for BoardConfig {
	fn default() -> Self {
		BoardConfig {
			sysclk_hz: SYSCLK,
			baud: BAUDRATE,
			spi_max_hz: F_SCK_MAX,
			eeprom_capacity: EEPROM_CAPACITY,
			timeouts: Timeouts::default(),
		}
	}
}

/// register settings derived from a `BoardConfig`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BoardSetup {
	pub uart: BaudConfig,
	pub spi: SpiClock,
	/// Timer2 reload for the slave select disable delay
	pub deselect_delay: Reload,
}

impl BoardConfig {
	/// compute all register settings; fails before any hardware would be
	/// touched if one of them isn't achievable
	pub fn setup(&self) -> crate::AResult<BoardSetup> {
		ensure_config!(self.eeprom_capacity > 0 && self.eeprom_capacity <= MAX_CAPACITY,
			"EEPROM capacity {} not addressable with two address bytes", self.eeprom_capacity
		);
		let uart = with_context!("UART0 setup", uart_baud(self.sysclk_hz, self.baud))?;
		let spi = with_context!("SPI0 setup", clock_divider(self.sysclk_hz, self.spi_max_hz))?;
		let deselect_delay = with_context!("deselect delay", delay_reload(self.sysclk_hz, NSS_DISABLE_US))?;
		Ok(BoardSetup {
			uart,
			spi,
			deselect_delay,
		})
	}
}

impl fmt::Display for BoardSetup {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "UART0: {}", self.uart)?;
		writeln!(f, "SPI0: SPI0CKR = {}, SCK {} Hz", self.spi.spi0ckr, self.spi.sck_hz)?;
		write!(f, "Timer2 {}us deselect delay: {:?}", NSS_DISABLE_US, self.deselect_delay)
	}
}
