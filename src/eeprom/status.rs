use std::fmt;

// status register bits
const STATUS_WIP:  u8 = 0x01; // write in progress, read only
const STATUS_WEL:  u8 = 0x02; // write enable latch, read only
const STATUS_BP0:  u8 = 0x04; // block protect
const STATUS_BP1:  u8 = 0x08; // block protect
const STATUS_WPEN: u8 = 0x80; // write protect pin enable

const STATUS_WRITABLE: u8 = 0
	| STATUS_BP0
	| STATUS_BP1
	| STATUS_WPEN
;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockProtect {
	None,
	UpperQuarter,
	UpperHalf,
	All,
}

impl BlockProtect {
	fn bits(self) -> u8 {
		match self {
			BlockProtect::None => 0b00,
			BlockProtect::UpperQuarter => 0b01,
			BlockProtect::UpperHalf => 0b10,
			BlockProtect::All => 0b11,
		}
	}

	/// first protected address, `capacity` if nothing is protected
	pub fn protected_from(self, capacity: usize) -> usize {
		match self {
			BlockProtect::None => capacity,
			BlockProtect::UpperQuarter => capacity - capacity / 4,
			BlockProtect::UpperHalf => capacity / 2,
			BlockProtect::All => 0,
		}
	}
}

/// RDSR result
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusRegister(pub u8);

impl StatusRegister {
	/// value for WRSR; only the non-volatile bits are kept
	pub fn with_protection(protect: BlockProtect, wpen: bool) -> Self {
		let wpen = if wpen { STATUS_WPEN } else { 0 };
		StatusRegister((protect.bits() << 2) | wpen)
	}

	pub fn writable_bits(&self) -> u8 {
		self.0 & STATUS_WRITABLE
	}

	pub fn is_write_in_progress(&self) -> bool {
		0 != self.0 & STATUS_WIP
	}
	pub fn is_write_enabled(&self) -> bool {
		0 != self.0 & STATUS_WEL
	}
	pub fn is_write_protect_enabled(&self) -> bool {
		0 != self.0 & STATUS_WPEN
	}

	pub fn block_protect(&self) -> BlockProtect {
		match (self.0 & (STATUS_BP0 | STATUS_BP1)) >> 2 {
			0b00 => BlockProtect::None,
			0b01 => BlockProtect::UpperQuarter,
			0b10 => BlockProtect::UpperHalf,
			0b11 => BlockProtect::All,
			_ => unreachable!(),
		}
	}
}

impl fmt::Display for StatusRegister {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x}", self.0)
	}
}

impl fmt::Debug for StatusRegister {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x} (protect: {:?}", self.0, self.block_protect())?;
		if self.is_write_in_progress() { write!(f, " [WIP]")?; }
		if self.is_write_enabled() { write!(f, " [WEL]")?; }
		if self.is_write_protect_enabled() { write!(f, " [WPEN]")?; }
		write!(f, ")")
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn flags() {
		let s = StatusRegister(0x83);
		assert!(s.is_write_in_progress());
		assert!(s.is_write_enabled());
		assert!(s.is_write_protect_enabled());
		assert_eq!(s.block_protect(), BlockProtect::None);
		assert_eq!(s.writable_bits(), 0x80);
		assert_eq!(format!("{:?}", s), "0x83 (protect: None [WIP] [WEL] [WPEN])");
	}

	#[test]
	fn protection() {
		let s = StatusRegister::with_protection(BlockProtect::UpperHalf, false);
		assert_eq!(s.0, 0x08);
		assert_eq!(s.block_protect(), BlockProtect::UpperHalf);
		assert_eq!(BlockProtect::UpperQuarter.protected_from(4096), 3072);
		assert_eq!(BlockProtect::UpperHalf.protected_from(4096), 2048);
		assert_eq!(BlockProtect::All.protected_from(4096), 0);
		assert_eq!(BlockProtect::None.protected_from(4096), 4096);
	}
}
