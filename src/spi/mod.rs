/// Polled SPI0 master, as used to talk to 25xx-style serial EEPROMs.
///
/// The bus is driven through the SPI0 register bank:
/// - SPI0DAT: writing starts a transfer, reading returns the byte shifted
///   in during the last transfer (full duplex, one byte at a time)
/// - SPIF (SPI0CN.7): set by hardware at the end of each transfer, must be
///   cleared by software
/// - NSSMD0 (SPI0CN.2): drives the slave select pin in 4-wire single master
///   mode; slave select is active LOW
///
/// No interrupts and no DMA: each byte is "write SPI0DAT, spin on SPIF,
/// clear SPIF". Spinning is bounded, a transfer that doesn't complete
/// within the poll budget fails with a device timeout instead of hanging.

mod clock;
mod hardware;
mod low_level;

pub use self::clock::{
	SpiClock,
	clock_divider,
};

pub use self::hardware::{
	SpiRegisters,
	NSS_DISABLE_US,
	T_NSS_DISABLE_MIN,
	reliable_sleep,
};

pub use self::low_level::{
	LowLevel,
	Selected,
};
