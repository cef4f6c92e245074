/// 25xx-family SPI serial EEPROM (e.g. Microchip 25LC320, 4 KB) on SPI0.
///
/// Every command starts with activating slave select and ends with
/// deactivating it; a write cycle only starts after slave select goes
/// inactive at the end of a WRITE/WRSR command. While the internal write
/// cycle runs, the chip only answers RDSR (WIP bit set).

use crate::spi::{
	LowLevel,
	SpiRegisters,
};

mod selftest;
mod status;

pub use self::selftest::{
	Led,
	Pattern,
	SelfTest,
};

pub use self::status::{
	BlockProtect,
	StatusRegister,
};

#[allow(dead_code)]
pub mod consts {
	pub const WRSR_OPCODE:  u8 = 0x01; // write status register
	pub const WRITE_OPCODE: u8 = 0x02; // write data; clears WEL at end of write cycle
	pub const READ_OPCODE:  u8 = 0x03; // read data
	pub const WRDI_OPCODE:  u8 = 0x04; // write disable (clears WEL)
	pub const RDSR_OPCODE:  u8 = 0x05; // read status register
	pub const WREN_OPCODE:  u8 = 0x06; // write enable (sets WEL)

	// clocked out to receive a byte
	pub const DUMMY_BYTE: u8 = 0x00;

	pub const DEFAULT_CAPACITY: usize = 4096;
	// two address bytes
	pub const MAX_CAPACITY: usize = 0x1_0000;
}

use self::consts::*;

/// Bounded poll budgets replacing the endless spin loops
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Timeouts {
	/// SPIF reads per transferred byte
	pub transfer_polls: u32,
	/// RDSR commands while waiting for a write cycle to finish
	pub write_cycle_polls: u32,
}

impl Default for Timeouts {
	fn default() -> Self {
		Timeouts {
			transfer_polls: 0xffff,
			write_cycle_polls: 0xffff,
		}
	}
}

fn send_address<H: LowLevel + ?Sized>(bus: &mut H, address: usize, max_polls: u32) -> crate::AResult<()> {
	bus.transfer((address >> 8) as u8, max_polls)?;
	bus.transfer(address as u8, max_polls)?;
	Ok(())
}

pub struct Eeprom<B: SpiRegisters> {
	bus: B,
	capacity: usize,
	timeouts: Timeouts,
}

impl<B: SpiRegisters> Eeprom<B> {
	pub fn new(bus: B, capacity: usize, timeouts: Timeouts) -> crate::AResult<Self> {
		ensure_config!(capacity > 0 && capacity <= MAX_CAPACITY,
			"EEPROM capacity {} not addressable with two address bytes", capacity
		);
		ensure_config!(timeouts.transfer_polls > 0 && timeouts.write_cycle_polls > 0,
			"poll budgets must be positive: {:?}", timeouts
		);
		Ok(Eeprom { bus, capacity, timeouts })
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn timeouts(&self) -> Timeouts {
		self.timeouts
	}

	pub fn bus(&self) -> &B {
		&self.bus
	}

	pub fn bus_mut(&mut self) -> &mut B {
		&mut self.bus
	}

	pub fn into_bus(self) -> B {
		self.bus
	}

	fn check_range(&self, address: usize, len: usize) -> crate::AResult<()> {
		let end = address.checked_add(len);
		ensure_config!(address < self.capacity && end.map_or(false, |end| end <= self.capacity),
			"address range 0x{:04x}+{} outside of EEPROM (capacity {})", address, len, self.capacity
		);
		Ok(())
	}

	// single byte command
	fn command(&mut self, opcode: u8) -> crate::AResult<()> {
		let polls = self.timeouts.transfer_polls;
		self.bus.select().transfer(opcode, polls)?;
		Ok(())
	}

	pub fn read_status(&mut self) -> crate::AResult<StatusRegister> {
		let polls = self.timeouts.transfer_polls;
		let mut sel = self.bus.select();
		sel.transfer(RDSR_OPCODE, polls)?;
		let status = StatusRegister(sel.transfer(DUMMY_BYTE, polls)?);
		trace!("EEPROM status: {:?}", status);
		Ok(status)
	}

	/// poll the status register until the write cycle finished; returns
	/// the number of status reads it took
	pub fn wait_write_complete(&mut self) -> crate::AResult<u32> {
		let limit = self.timeouts.write_cycle_polls;
		for reads in 1..=limit {
			if !self.read_status()?.is_write_in_progress() {
				trace!("EEPROM write cycle finished after {} status reads", reads);
				return Ok(reads);
			}
		}
		warn!("EEPROM still busy after {} status reads", limit);
		Err(crate::PeripheralError::timeout("EEPROM write cycle", limit))
	}

	pub fn write_enable(&mut self) -> crate::AResult<()> {
		self.command(WREN_OPCODE)
	}

	pub fn write_disable(&mut self) -> crate::AResult<()> {
		self.command(WRDI_OPCODE)
	}

	/// program the non-volatile status bits (block protection, WPEN)
	pub fn write_status(&mut self, status: StatusRegister) -> crate::AResult<u32> {
		debug!("EEPROM write status {:?}", status);
		self.write_enable()?;
		{
			let polls = self.timeouts.transfer_polls;
			let mut sel = self.bus.select();
			sel.transfer(WRSR_OPCODE, polls)?;
			sel.transfer(status.writable_bits(), polls)?;
		}
		self.wait_write_complete()
	}

	/// write a single byte and wait for the write cycle; returns the number
	/// of status reads until the device became ready
	pub fn write_byte(&mut self, address: usize, value: u8) -> crate::AResult<u32> {
		self.check_range(address, 1)?;
		debug!("EEPROM write 0x{:04x}: 0x{:02x}", address, value);
		self.write_enable()?;
		{
			let polls = self.timeouts.transfer_polls;
			let mut sel = self.bus.select();
			sel.transfer(WRITE_OPCODE, polls)?;
			send_address(&mut *sel, address, polls)?;
			sel.transfer(value, polls)?;
		}
		self.wait_write_complete()
	}

	pub fn write(&mut self, address: usize, data: &[u8]) -> crate::AResult<()> {
		if data.is_empty() {
			return Ok(());
		}
		self.check_range(address, data.len())?;
		for (offset, &b) in data.iter().enumerate() {
			self.write_byte(address + offset, b)?;
		}
		Ok(())
	}

	pub fn read_byte(&mut self, address: usize) -> crate::AResult<u8> {
		self.check_range(address, 1)?;
		let polls = self.timeouts.transfer_polls;
		let mut sel = self.bus.select();
		sel.transfer(READ_OPCODE, polls)?;
		send_address(&mut *sel, address, polls)?;
		let value = sel.transfer(DUMMY_BYTE, polls)?;
		debug!("EEPROM read 0x{:04x}: 0x{:02x}", address, value);
		Ok(value)
	}

	/// sequential read: the device increments the address internally
	/// while slave select stays active
	pub fn read(&mut self, address: usize, target: &mut [u8]) -> crate::AResult<()> {
		if target.is_empty() {
			return Ok(());
		}
		self.check_range(address, target.len())?;
		let polls = self.timeouts.transfer_polls;
		let mut sel = self.bus.select();
		sel.transfer(READ_OPCODE, polls)?;
		send_address(&mut *sel, address, polls)?;
		for t in target.iter_mut() {
			*t = sel.transfer(DUMMY_BYTE, polls)?;
		}
		debug!("EEPROM read {} bytes from 0x{:04x}", target.len(), address);
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::sim::{
		Fault,
		SimulatedEeprom,
	};
	use crate::PeripheralError;

	fn eeprom(sim: SimulatedEeprom) -> Eeprom<SimulatedEeprom> {
		Eeprom::new(sim, DEFAULT_CAPACITY, Timeouts { transfer_polls: 16, write_cycle_polls: 64 }).unwrap()
	}

	#[test]
	fn write_then_read_every_address() {
		let mut ee = eeprom(SimulatedEeprom::new(DEFAULT_CAPACITY));
		for address in 0..DEFAULT_CAPACITY {
			let value = (address as u8).wrapping_mul(7) ^ 0x5a;
			ee.write_byte(address, value).unwrap();
			assert_eq!(ee.read_byte(address).unwrap(), value, "address 0x{:04x}", address);
		}
	}

	#[test]
	fn write_cycle_takes_exactly_n_status_reads() {
		for &n in [1u32, 2, 5, 17].iter() {
			let mut ee = eeprom(SimulatedEeprom::new(DEFAULT_CAPACITY).with_write_cycle_polls(n));
			let before = ee.bus().status_reads();
			assert_eq!(ee.write_byte(0x123, 0x42).unwrap(), n);
			assert_eq!(ee.bus().status_reads() - before, u64::from(n));
			assert_eq!(ee.read_byte(0x123).unwrap(), 0x42);
		}
	}

	#[test]
	fn stuck_busy_times_out() {
		let mut ee = eeprom(SimulatedEeprom::new(DEFAULT_CAPACITY).with_fault(Fault::StuckBusy));
		let e = ee.write_byte(0, 0).unwrap_err();
		match PeripheralError::find(&e) {
			Some(PeripheralError::DeviceTimeout { operation, polls }) => {
				assert_eq!(*operation, "EEPROM write cycle");
				assert_eq!(*polls, 64);
			},
			other => panic!("unexpected error {:?}", other),
		}
		assert_eq!(ee.bus().status_reads(), 64);
	}

	#[test]
	fn dead_bus_times_out() {
		let mut ee = eeprom(SimulatedEeprom::new(DEFAULT_CAPACITY).with_fault(Fault::DeadBus));
		let e = ee.read_byte(0).unwrap_err();
		assert!(PeripheralError::is_timeout(&e), "{}", e);
		// slave select released by the guard
		assert!(!ee.bus().is_selected());
	}

	#[test]
	fn slow_spif_within_budget() {
		let mut ee = eeprom(SimulatedEeprom::new(DEFAULT_CAPACITY).with_transfer_latency(15));
		ee.write_byte(7, 0xa5).unwrap();
		assert_eq!(ee.read_byte(7).unwrap(), 0xa5);

		let mut ee = eeprom(SimulatedEeprom::new(DEFAULT_CAPACITY).with_transfer_latency(16));
		assert!(PeripheralError::is_timeout(&ee.read_byte(7).unwrap_err()));
	}

	#[test]
	fn out_of_range_rejected_before_bus_access() {
		let mut ee = eeprom(SimulatedEeprom::new(DEFAULT_CAPACITY));
		let e = ee.write_byte(DEFAULT_CAPACITY, 1).unwrap_err();
		assert!(PeripheralError::is_config(&e));
		let e = ee.read_byte(DEFAULT_CAPACITY).unwrap_err();
		assert!(PeripheralError::is_config(&e));
		let mut buf = [0u8; 2];
		assert!(ee.read(DEFAULT_CAPACITY - 1, &mut buf).is_err());
		assert_eq!(ee.bus().transfers(), 0);
	}

	#[test]
	fn sequential_read() {
		let mut ee = eeprom(SimulatedEeprom::new(DEFAULT_CAPACITY));
		ee.write(0x100, b"c8051").unwrap();
		let mut buf = [0u8; 5];
		ee.read(0x100, &mut buf).unwrap();
		assert_eq!(&buf, b"c8051");
		// READ, 2 address bytes and 5 data bytes
		let before = ee.bus().transfers();
		ee.read(0x100, &mut buf).unwrap();
		assert_eq!(ee.bus().transfers() - before, 8);
	}

	#[test]
	fn empty_transfers_touch_nothing() {
		let mut ee = eeprom(SimulatedEeprom::new(DEFAULT_CAPACITY));
		let before = ee.bus().transfers();
		ee.write(DEFAULT_CAPACITY, &[]).unwrap();
		ee.read(DEFAULT_CAPACITY, &mut []).unwrap();
		assert_eq!(ee.bus().transfers(), before);
		// non-empty ranges are still checked
		assert!(ee.write(DEFAULT_CAPACITY, &[0]).is_err());
	}

	#[test]
	fn write_enable_latch() {
		let mut ee = eeprom(SimulatedEeprom::new(DEFAULT_CAPACITY));
		assert!(!ee.read_status().unwrap().is_write_enabled());
		ee.write_enable().unwrap();
		assert!(ee.read_status().unwrap().is_write_enabled());
		ee.write_disable().unwrap();
		assert!(!ee.read_status().unwrap().is_write_enabled());
		// a completed write clears the latch again
		ee.write_byte(1, 2).unwrap();
		assert!(!ee.read_status().unwrap().is_write_enabled());
	}

	#[test]
	fn block_protection() {
		let mut ee = eeprom(SimulatedEeprom::new(DEFAULT_CAPACITY));
		ee.write_byte(3000, 0x11).unwrap();
		ee.write_status(StatusRegister::with_protection(BlockProtect::UpperHalf, false)).unwrap();
		assert_eq!(ee.read_status().unwrap().block_protect(), BlockProtect::UpperHalf);

		// protected write is ignored by the device
		ee.write_byte(3000, 0x22).unwrap();
		assert_eq!(ee.read_byte(3000).unwrap(), 0x11);
		ee.write_byte(10, 0x22).unwrap();
		assert_eq!(ee.read_byte(10).unwrap(), 0x22);
	}

	#[test]
	fn invalid_construction() {
		assert!(Eeprom::new(SimulatedEeprom::new(16), 0, Timeouts::default()).is_err());
		assert!(Eeprom::new(SimulatedEeprom::new(16), MAX_CAPACITY + 1, Timeouts::default()).is_err());
		let timeouts = Timeouts { transfer_polls: 0, ..Timeouts::default() };
		assert!(Eeprom::new(SimulatedEeprom::new(16), 16, timeouts).is_err());
	}
}
