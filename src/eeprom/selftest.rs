use std::fmt;
use std::io;

use super::Eeprom;
use crate::spi::SpiRegisters;
use crate::PeripheralError;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Pattern {
	Constant(u8),
	/// lower 8 bits of each address
	AddressLsb,
}

impl Pattern {
	pub fn byte(&self, address: usize) -> u8 {
		match *self {
			Pattern::Constant(b) => b,
			Pattern::AddressLsb => (address & 0xff) as u8,
		}
	}
}

impl fmt::Display for Pattern {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Pattern::Constant(b) => write!(f, "0x{:02X}'s", b),
			Pattern::AddressLsb => write!(f, "LSB of EEPROM addresses"),
		}
	}
}

/// status LED; toggles once per 16 bytes of progress, off after an error
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Led {
	pub on: bool,
	pub toggles: u32,
}

impl Led {
	pub fn toggle(&mut self) {
		self.on = !self.on;
		self.toggles += 1;
	}
}

/// Fill and verify the whole device, printing a hex dump of the progress
/// to `out` (the UART console on the board).
pub struct SelfTest<W: io::Write> {
	out: W,
	led: Led,
}

impl<W: io::Write> SelfTest<W> {
	pub fn new(out: W) -> Self {
		SelfTest {
			out,
			led: Led { on: true, toggles: 0 },
		}
	}

	pub fn led(&self) -> Led {
		self.led
	}

	pub fn into_output(self) -> W {
		self.out
	}

	fn progress(&mut self, verb: &str, address: usize, value: u8) -> io::Result<()> {
		if 0 == address % 16 {
			self.led.toggle();
			write!(self.out, "\n{} 0x{:04x}: {:02x} ", verb, address, value)
		} else {
			write!(self.out, "{:02x} ", value)
		}
	}

	/// returns the total number of status reads spent waiting for write cycles
	pub fn fill<B: SpiRegisters>(&mut self, eeprom: &mut Eeprom<B>, pattern: Pattern) -> crate::AResult<u64> {
		info!("Filling {} bytes with {}", eeprom.capacity(), pattern);
		let mut status_reads = 0u64;
		for address in 0..eeprom.capacity() {
			let value = pattern.byte(address);
			status_reads += u64::from(with_context!(("writing 0x{:04x}", address),
				eeprom.write_byte(address, value)
			)?);
			self.progress("Writing", address, value)?;
		}
		Ok(status_reads)
	}

	pub fn verify<B: SpiRegisters>(&mut self, eeprom: &mut Eeprom<B>, pattern: Pattern) -> crate::AResult<()> {
		info!("Verifying {} bytes of {}", eeprom.capacity(), pattern);
		for address in 0..eeprom.capacity() {
			let actual = with_context!(("reading 0x{:04x}", address),
				eeprom.read_byte(address)
			)?;
			self.progress("Verifying", address, actual)?;
			let expected = pattern.byte(address);
			if actual != expected {
				self.led.on = false;
				write!(self.out, "Error at {}\n", address)?;
				error!("Verification failed at 0x{:04x}: expected 0x{:02x}, read 0x{:02x}", address, expected, actual);
				return Err(PeripheralError::VerificationMismatch { address, expected, actual }.into());
			}
		}
		Ok(())
	}

	/// the full demo: 0xFF everywhere, then each address' LSB
	pub fn run<B: SpiRegisters>(&mut self, eeprom: &mut Eeprom<B>) -> crate::AResult<()> {
		let patterns = [Pattern::Constant(0xff), Pattern::AddressLsb];
		for (i, &pattern) in patterns.iter().enumerate() {
			if i > 0 {
				write!(self.out, "\n\n")?;
			}
			write!(self.out, "Filling with {}...\n", pattern)?;
			let status_reads = self.fill(eeprom, pattern)?;
			debug!("{} status reads while filling with {}", status_reads, pattern);

			write!(self.out, "\n\nVerifying {}...\n", pattern)?;
			self.verify(eeprom, pattern)?;
		}
		write!(self.out, "\n\nVerification success!\n")?;
		self.out.flush()?;
		info!("Verification success");
		Ok(())
	}
}
