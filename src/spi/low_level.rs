use std::ops::{
	Deref,
	DerefMut,
};

use super::SpiRegisters;

/// slave select stays active for the lifetime of this guard; dropping it
/// deactivates slave select and waits the minimum deselect time.
pub struct Selected<'a, H: ?Sized + LowLevel + 'a>(&'a mut H);

impl<'a, H: ?Sized + LowLevel> Drop for Selected<'a, H> {
	fn drop(&mut self) {
		self.0.set_slave_select(false);
		self.0.delay_deselect();
	}
}

impl<'a, H: ?Sized + LowLevel> Deref for Selected<'a, H> {
	type Target = H;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<'a, H: ?Sized + LowLevel> DerefMut for Selected<'a, H> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

pub trait LowLevel: SpiRegisters {
	// write byte, spin on SPIF (at most `max_polls` reads), clear SPIF and
	// return the byte shifted in at the same time
	fn transfer(&mut self, data: u8, max_polls: u32) -> crate::AResult<u8> {
		self.write_data(data);
		for _ in 0..max_polls {
			if self.transfer_complete() {
				self.clear_transfer_complete();
				let received = self.read_data();
				trace!("SPI transfer: sent 0x{:02x}, received 0x{:02x}", data, received);
				return Ok(received);
			}
		}
		warn!("SPI transfer of 0x{:02x} didn't complete after {} polls", data, max_polls);
		Err(crate::PeripheralError::timeout("SPI transfer", max_polls))
	}

	// send several bytes, ignoring what comes back
	fn send(&mut self, data: &[u8], max_polls: u32) -> crate::AResult<()> {
		for &b in data {
			self.transfer(b, max_polls)?;
		}
		Ok(())
	}

	fn select(&mut self) -> Selected<Self> {
		self.set_slave_select(true);
		Selected(self)
	}
}

impl<H: SpiRegisters + ?Sized> LowLevel for H {
}
