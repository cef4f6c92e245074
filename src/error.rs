/// Classified failures; everything else travels as a plain `failure::Error`.
///
/// Use `PeripheralError::find` to recover the classification from an error
/// that might have been wrapped with additional context.
#[derive(Debug, Fail, Clone, PartialEq, Eq)]
pub enum PeripheralError {
	/// rejected before touching any hardware register
	#[fail(display = "invalid configuration: {}", _0)]
	ConfigurationInvalid(String),

	/// a bounded poll loop ran out of retries
	#[fail(display = "{} timed out after {} polls, device unresponsive", operation, polls)]
	DeviceTimeout {
		operation: &'static str,
		polls: u32,
	},

	/// read back data doesn't match what was written
	#[fail(display = "Error at {}: expected 0x{:02x}, read 0x{:02x}", address, expected, actual)]
	VerificationMismatch {
		address: usize,
		expected: u8,
		actual: u8,
	},
}

impl PeripheralError {
	pub fn config<S: Into<String>>(msg: S) -> failure::Error {
		PeripheralError::ConfigurationInvalid(msg.into()).into()
	}

	pub fn timeout(operation: &'static str, polls: u32) -> failure::Error {
		PeripheralError::DeviceTimeout { operation, polls }.into()
	}

	/// search the cause chain (contexts included)
	pub fn find(e: &failure::Error) -> Option<&PeripheralError> {
		e.iter_chain().find_map(|cause| cause.downcast_ref::<PeripheralError>())
	}

	pub fn is_config(e: &failure::Error) -> bool {
		match Self::find(e) {
			Some(PeripheralError::ConfigurationInvalid(_)) => true,
			_ => false,
		}
	}

	pub fn is_timeout(e: &failure::Error) -> bool {
		match Self::find(e) {
			Some(PeripheralError::DeviceTimeout { .. }) => true,
			_ => false,
		}
	}
}

// `ensure!` for configuration checks, producing a classified error
macro_rules! ensure_config {
	($cond:expr, $($arg:tt)+) => {
		if !($cond) {
			return Err($crate::error::PeripheralError::config(format!($($arg)+)));
		}
	};
}
