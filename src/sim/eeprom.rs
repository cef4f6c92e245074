use crate::eeprom::consts::*;
use crate::eeprom::StatusRegister;
use crate::spi::SpiRegisters;

// status register bits the model drives itself
const STATUS_WIP: u8 = 0x01;
const STATUS_WEL: u8 = 0x02;
const STATUS_WRITABLE: u8 = 0x8c;

// MISO floats high while the device doesn't drive it
const IDLE_BUS: u8 = 0xff;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Fault {
	/// write cycle never finishes
	StuckBusy,
	/// SPIF never sets
	DeadBus,
	/// reads of `address` always return `value`
	StuckCell {
		address: usize,
		value: u8,
	},
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
	Opcode,
	Address {
		opcode: u8,
		high: Option<u8>,
	},
	Read {
		address: usize,
	},
	Write {
		address: usize,
	},
	Status(u8),
	WriteStatus,
	// rest of the selection is ignored
	Ignore,
}

/// SPI EEPROM with the 25xx command set, seen through the SPI0 master
/// registers.
///
/// Commands take effect when slave select goes inactive. A write cycle
/// keeps WIP set for the first `write_cycle_polls - 1` status reads, the
/// status read after that reports ready.
#[derive(Clone, Debug)]
pub struct SimulatedEeprom {
	memory: Vec<u8>,
	status: u8,
	busy_reads: u32,
	write_cycle_polls: u32,
	transfer_latency: u32,
	fault: Option<Fault>,

	// SPI master state
	selected: bool,
	in_flight: bool,
	countdown: u32,
	spif: bool,
	miso: u8,

	// current command
	phase: Phase,
	pending_writes: Vec<(usize, u8)>,
	pending_status: Option<u8>,
	wren_seen: bool,
	wrdi_seen: bool,

	transfers: u64,
	status_reads: u64,
	write_cycles: u64,
	deselects: u64,
}

impl SimulatedEeprom {
	/// erased device (all bytes 0xFF)
	///
	/// # Panics
	///
	/// Panics if `capacity` is zero; addresses wrap modulo the capacity.
	pub fn new(capacity: usize) -> Self {
		assert!(capacity > 0, "simulated EEPROM needs at least one byte");
		SimulatedEeprom {
			memory: vec![0xff; capacity],
			status: 0,
			busy_reads: 0,
			write_cycle_polls: 3,
			transfer_latency: 0,
			fault: None,
			selected: false,
			in_flight: false,
			countdown: 0,
			spif: false,
			miso: IDLE_BUS,
			phase: Phase::Opcode,
			pending_writes: Vec::new(),
			pending_status: None,
			wren_seen: false,
			wrdi_seen: false,
			transfers: 0,
			status_reads: 0,
			write_cycles: 0,
			deselects: 0,
		}
	}

	/// number of status reads until a write cycle reports ready (at least 1)
	pub fn with_write_cycle_polls(mut self, polls: u32) -> Self {
		self.write_cycle_polls = polls.max(1);
		self
	}

	/// SPIF reads returning 0 before a transfer completes
	pub fn with_transfer_latency(mut self, polls: u32) -> Self {
		self.transfer_latency = polls;
		self
	}

	pub fn with_fault(mut self, fault: Fault) -> Self {
		self.fault = Some(fault);
		self
	}

	pub fn with_contents(mut self, offset: usize, data: &[u8]) -> Self {
		let capacity = self.memory.len();
		for (i, &b) in data.iter().enumerate() {
			self.memory[(offset + i) % capacity] = b;
		}
		self
	}

	pub fn memory(&self) -> &[u8] {
		&self.memory
	}

	pub fn status(&self) -> StatusRegister {
		StatusRegister(self.current_status())
	}

	pub fn is_selected(&self) -> bool {
		self.selected
	}

	/// bytes written to SPI0DAT
	pub fn transfers(&self) -> u64 {
		self.transfers
	}

	/// RDSR commands received
	pub fn status_reads(&self) -> u64 {
		self.status_reads
	}

	pub fn write_cycles(&self) -> u64 {
		self.write_cycles
	}

	pub fn deselects(&self) -> u64 {
		self.deselects
	}

	fn is_busy(&self) -> bool {
		self.fault == Some(Fault::StuckBusy) || self.busy_reads > 0
	}

	fn current_status(&self) -> u8 {
		let wip = if self.is_busy() { STATUS_WIP } else { 0 };
		self.status | wip
	}

	fn protected_from(&self) -> usize {
		StatusRegister(self.status).block_protect().protected_from(self.memory.len())
	}

	fn read_cell(&self, address: usize) -> u8 {
		match self.fault {
			Some(Fault::StuckCell { address: a, value }) if a == address => value,
			_ => self.memory[address],
		}
	}

	fn start_write_cycle(&mut self) {
		self.status &= !STATUS_WEL;
		self.busy_reads = self.write_cycle_polls - 1;
		self.write_cycles += 1;
	}

	// byte shifted in from the master; returns the byte shifted out
	fn shift(&mut self, mosi: u8) -> u8 {
		let capacity = self.memory.len();
		match self.phase {
			Phase::Opcode => {
				if self.is_busy() && mosi != RDSR_OPCODE {
					trace!("EEPROM model: busy, ignoring opcode 0x{:02x}", mosi);
					self.phase = Phase::Ignore;
					return IDLE_BUS;
				}
				self.phase = match mosi {
					READ_OPCODE | WRITE_OPCODE => Phase::Address { opcode: mosi, high: None },
					RDSR_OPCODE => {
						self.status_reads += 1;
						let status = self.current_status();
						if self.fault != Some(Fault::StuckBusy) && self.busy_reads > 0 {
							self.busy_reads -= 1;
						}
						Phase::Status(status)
					},
					WRSR_OPCODE => Phase::WriteStatus,
					WREN_OPCODE => {
						self.wren_seen = true;
						Phase::Ignore
					},
					WRDI_OPCODE => {
						self.wrdi_seen = true;
						Phase::Ignore
					},
					_ => {
						warn!("EEPROM model: unknown opcode 0x{:02x}", mosi);
						Phase::Ignore
					},
				};
				IDLE_BUS
			},
			Phase::Address { opcode, high: None } => {
				self.phase = Phase::Address { opcode, high: Some(mosi) };
				IDLE_BUS
			},
			Phase::Address { opcode, high: Some(high) } => {
				let address = ((usize::from(high) << 8) | usize::from(mosi)) % capacity;
				self.phase = if opcode == READ_OPCODE {
					Phase::Read { address }
				} else {
					Phase::Write { address }
				};
				IDLE_BUS
			},
			Phase::Read { address } => {
				self.phase = Phase::Read { address: (address + 1) % capacity };
				self.read_cell(address)
			},
			Phase::Write { address } => {
				self.pending_writes.push((address, mosi));
				self.phase = Phase::Write { address: (address + 1) % capacity };
				IDLE_BUS
			},
			Phase::Status(status) => status,
			Phase::WriteStatus => {
				if self.pending_status.is_none() {
					self.pending_status = Some(mosi);
				}
				IDLE_BUS
			},
			Phase::Ignore => IDLE_BUS,
		}
	}

	// slave select went inactive: execute the command
	fn finish_command(&mut self) {
		if self.wren_seen {
			self.status |= STATUS_WEL;
		}
		if self.wrdi_seen {
			self.status &= !STATUS_WEL;
		}

		let writes = std::mem::replace(&mut self.pending_writes, Vec::new());
		if let Phase::Write { .. } = self.phase {
			if !writes.is_empty() && 0 != self.status & STATUS_WEL {
				let protected_from = self.protected_from();
				for (address, value) in writes {
					if address < protected_from {
						self.memory[address] = value;
					} else {
						debug!("EEPROM model: write to protected address 0x{:04x} ignored", address);
					}
				}
				self.start_write_cycle();
			}
		}

		if let Some(status) = self.pending_status.take() {
			if 0 != self.status & STATUS_WEL {
				self.status = (self.status & !STATUS_WRITABLE) | (status & STATUS_WRITABLE);
				self.start_write_cycle();
			}
		}

		self.phase = Phase::Opcode;
		self.wren_seen = false;
		self.wrdi_seen = false;
	}
}

impl SpiRegisters for SimulatedEeprom {
	fn write_data(&mut self, data: u8) {
		self.transfers += 1;
		if self.fault == Some(Fault::DeadBus) {
			return;
		}
		self.miso = if self.selected { self.shift(data) } else { IDLE_BUS };
		self.in_flight = true;
		self.countdown = self.transfer_latency;
	}

	fn read_data(&mut self) -> u8 {
		self.miso
	}

	fn transfer_complete(&mut self) -> bool {
		if self.in_flight {
			if self.countdown > 0 {
				self.countdown -= 1;
				return false;
			}
			self.in_flight = false;
			self.spif = true;
		}
		self.spif
	}

	fn clear_transfer_complete(&mut self) {
		self.spif = false;
	}

	fn set_slave_select(&mut self, active: bool) {
		if self.selected && !active {
			self.finish_command();
		}
		if !self.selected && active {
			self.phase = Phase::Opcode;
		}
		self.selected = active;
	}

	fn delay_deselect(&mut self) {
		self.deselects += 1;
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::spi::LowLevel;

	fn command(sim: &mut SimulatedEeprom, bytes: &[u8]) -> Vec<u8> {
		let mut sel = sim.select();
		bytes.iter().map(|&b| sel.transfer(b, 4).unwrap()).collect()
	}

	#[test]
	fn write_needs_write_enable() {
		let mut sim = SimulatedEeprom::new(64);
		command(&mut sim, &[WRITE_OPCODE, 0x00, 0x05, 0x42]);
		assert_eq!(sim.memory()[5], 0xff);
		assert_eq!(sim.write_cycles(), 0);

		command(&mut sim, &[WREN_OPCODE]);
		assert!(sim.status().is_write_enabled());
		command(&mut sim, &[WRITE_OPCODE, 0x00, 0x05, 0x42]);
		assert_eq!(sim.memory()[5], 0x42);
		assert_eq!(sim.write_cycles(), 1);
		assert!(!sim.status().is_write_enabled());
	}

	#[test]
	fn busy_for_n_minus_one_status_reads() {
		let mut sim = SimulatedEeprom::new(64).with_write_cycle_polls(3);
		command(&mut sim, &[WREN_OPCODE]);
		command(&mut sim, &[WRITE_OPCODE, 0x00, 0x00, 0x01]);
		assert_eq!(command(&mut sim, &[RDSR_OPCODE, 0])[1] & STATUS_WIP, STATUS_WIP);
		// reads are ignored while busy
		assert_eq!(command(&mut sim, &[READ_OPCODE, 0, 0, 0])[3], 0xff);
		assert_eq!(command(&mut sim, &[RDSR_OPCODE, 0])[1] & STATUS_WIP, STATUS_WIP);
		assert_eq!(command(&mut sim, &[RDSR_OPCODE, 0])[1] & STATUS_WIP, 0);
		assert_eq!(command(&mut sim, &[READ_OPCODE, 0, 0, 0])[3], 0x01);
		assert_eq!(sim.status_reads(), 3);
	}

	#[test]
	fn sequential_read_wraps() {
		let mut sim = SimulatedEeprom::new(4).with_contents(0, &[1, 2, 3, 4]);
		let out = command(&mut sim, &[READ_OPCODE, 0x00, 0x03, 0, 0, 0]);
		assert_eq!(&out[3..], &[4, 1, 2]);
	}

	#[test]
	fn stuck_cell() {
		let mut sim = SimulatedEeprom::new(16).with_fault(Fault::StuckCell { address: 2, value: 0x00 });
		let out = command(&mut sim, &[READ_OPCODE, 0x00, 0x01, 0, 0, 0]);
		assert_eq!(&out[3..], &[0xff, 0x00, 0xff]);
	}

	#[test]
	#[should_panic(expected = "at least one byte")]
	fn zero_capacity_panics() {
		SimulatedEeprom::new(0);
	}

	#[test]
	fn unselected_bytes_ignored() {
		let mut sim = SimulatedEeprom::new(16);
		sim.write_data(WREN_OPCODE);
		assert!(sim.transfer_complete());
		sim.clear_transfer_complete();
		assert_eq!(sim.read_data(), 0xff);
		assert!(!sim.status().is_write_enabled());
	}
}
