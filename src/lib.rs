#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

#[macro_use]
pub mod error;

pub mod adc;
pub mod board;
pub mod cli;
pub mod crc;
pub mod eeprom;
pub mod pca;
pub mod signal;
pub mod sim;
pub mod spi;
pub mod timing;

pub use self::error::PeripheralError;
