use std::thread;
use std::time::{
	Duration,
	Instant,
};

/// time slave select stays inactive between two commands (Timer2 delay on
/// the board)
pub const NSS_DISABLE_US: u32 = 1;
pub const T_NSS_DISABLE_MIN: Duration = Duration::from_micros(NSS_DISABLE_US as u64);

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// The SPI0 registers a polled master needs.
pub trait SpiRegisters {
	/// write SPI0DAT; starts shifting out `data`
	fn write_data(&mut self, data: u8);

	/// read SPI0DAT; byte received during the last transfer
	fn read_data(&mut self) -> u8;

	/// SPIF
	fn transfer_complete(&mut self) -> bool;

	fn clear_transfer_complete(&mut self);

	/// drive NSS (active: pin LOW)
	fn set_slave_select(&mut self, active: bool);

	// wait (at least) the minimum NSS disable time
	fn delay_deselect(&mut self) {
		reliable_sleep(T_NSS_DISABLE_MIN);
	}
}

impl<'a, B: ?Sized + SpiRegisters> SpiRegisters for &'a mut B {
	fn write_data(&mut self, data: u8) {
		B::write_data(*self, data)
	}
	fn read_data(&mut self) -> u8 {
		B::read_data(*self)
	}
	fn transfer_complete(&mut self) -> bool {
		B::transfer_complete(*self)
	}
	fn clear_transfer_complete(&mut self) {
		B::clear_transfer_complete(*self)
	}
	fn set_slave_select(&mut self, active: bool) {
		B::set_slave_select(*self, active)
	}
	fn delay_deselect(&mut self) {
		B::delay_deselect(*self)
	}
}
