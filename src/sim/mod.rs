/// Software models of the devices on the demo boards, implementing the
/// same register-bank traits the real SFR accessors do.

mod eeprom;

pub use self::eeprom::{
	Fault,
	SimulatedEeprom,
};
