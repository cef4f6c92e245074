#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate c8051_periph;
use c8051_periph::*;

use std::process::exit;

use c8051_periph::cli::{
	get_param,
	parse_number,
};
use c8051_periph::timing::{
	ClockConfig,
	CounterWidth,
	PeriodUnit,
};

fn get_width(matches: &clap::ArgMatches) -> AResult<CounterWidth> {
	CounterWidth::from_bits(get_param(matches, "width")?)
}

fn print_reload(reload: timing::Reload) {
	let (high, low) = reload.registers();
	println!("reload: {} ({} ticks)", reload, reload.ticks());
	match reload.width() {
		CounterWidth::Eight => println!("THx/TLx = 0x{:02x}", low),
		_ => println!("THx = 0x{:02x}, TLx = 0x{:02x}", high, low),
	}
}

fn reload(sub_m: &clap::ArgMatches) -> AResult<()> {
	let clock = ClockConfig::new(get_param(sub_m, "SYSCLK")?, get_param(sub_m, "PRESCALER")?)?;
	let period: u32 = get_param(sub_m, "PERIOD")?;
	let unit: PeriodUnit = get_param(sub_m, "unit")?;
	let width = get_width(sub_m)?;

	print_reload(timing::reload_for_period(clock, period, unit, width)?);
	Ok(())
}

fn rate(sub_m: &clap::ArgMatches) -> AResult<()> {
	let clock = ClockConfig::new(get_param(sub_m, "SYSCLK")?, get_param(sub_m, "PRESCALER")?)?;
	let rate_hz: u32 = get_param(sub_m, "RATE")?;
	let width = get_width(sub_m)?;

	print_reload(timing::reload_for_rate(clock, rate_hz, width)?);
	Ok(())
}

fn baud(sub_m: &clap::ArgMatches) -> AResult<()> {
	let config = timing::uart_baud(get_param(sub_m, "SYSCLK")?, get_param(sub_m, "BAUD")?)?;
	println!("{}", config);
	Ok(())
}

fn delay(sub_m: &clap::ArgMatches) -> AResult<()> {
	let reload = timing::delay_reload(get_param(sub_m, "SYSCLK")?, get_param(sub_m, "MICROS")?)?;
	println!("TMR2 = 0x{:04x} ({} ticks)", reload.value(), reload.ticks());
	Ok(())
}

fn spi_clock(sub_m: &clap::ArgMatches) -> AResult<()> {
	let clock = spi::clock_divider(get_param(sub_m, "SYSCLK")?, get_param(sub_m, "MAX_SCK")?)?;
	println!("SPI0CKR = 0x{:02x} (SCK {} Hz)", clock.spi0ckr, clock.sck_hz);
	Ok(())
}

fn pca_freq(sub_m: &clap::ArgMatches) -> AResult<()> {
	let value = pca::frequency_output(
		get_param(sub_m, "SYSCLK")?,
		get_param(sub_m, "divisor")?,
		get_param(sub_m, "FREQUENCY")?,
	)?;
	println!("PCA0CPHn = 0x{:02x}", value);
	Ok(())
}

fn adc_clock(sub_m: &clap::ArgMatches) -> AResult<()> {
	let bits = adc::sar_clock_bits(get_param(sub_m, "SYSCLK")?, get_param(sub_m, "SAR_CLOCK")?)?;
	println!("ADC0CF AD0SC bits = 0x{:02x}", bits);
	Ok(())
}

fn crc(sub_m: &clap::ArgMatches) -> AResult<()> {
	let polynomial = parse_number(sub_m.value_of("polynomial").unwrap_or("0x1021"))?;
	ensure!(polynomial <= 0xffff, "polynomial 0x{:x} wider than 16 bits", polynomial);
	let data = sub_m.value_of("DATA").unwrap_or("");
	let value = c8051_periph::crc::compute_crc16(polynomial as u16, data.as_bytes())?;
	println!("CRC1OUT = 0x{:04x}", value);
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@subcommand reload =>
			(about: "timer reload value for a period")
			(@arg unit: -u --unit +takes_value default_value("ms") "period unit (ms or us)")
			(@arg width: -w --width +takes_value default_value("16") "counter width (8, 13 or 16)")
			(@arg SYSCLK: +required "system clock in Hz")
			(@arg PRESCALER: +required "timer prescaler")
			(@arg PERIOD: +required "period in units")
		)
		(@subcommand rate =>
			(about: "timer reload value for an overflow rate")
			(@arg width: -w --width +takes_value default_value("16") "counter width (8, 13 or 16)")
			(@arg SYSCLK: +required "system clock in Hz")
			(@arg PRESCALER: +required "timer prescaler")
			(@arg RATE: +required "overflows per second")
		)
		(@subcommand baud =>
			(about: "Timer1 setup for a UART0 baud rate")
			(@arg SYSCLK: +required "system clock in Hz")
			(@arg BAUD: +required "baud rate")
		)
		(@subcommand delay =>
			(about: "Timer2 reload for a microsecond delay")
			(@arg SYSCLK: +required "system clock in Hz")
			(@arg MICROS: +required "delay in microseconds")
		)
		(@subcommand spi_clock =>
			(about: "SPI0 clock divider")
			(@arg SYSCLK: +required "system clock in Hz")
			(@arg MAX_SCK: +required "maximum SCK frequency in Hz")
		)
		(@subcommand pca_freq =>
			(about: "PCA frequency output compare value")
			(@arg divisor: -d --divisor +takes_value default_value("12") "PCA timebase SYSCLK divisor")
			(@arg SYSCLK: +required "system clock in Hz")
			(@arg FREQUENCY: +required "output frequency in Hz")
		)
		(@subcommand adc_clock =>
			(about: "ADC0 SAR clock divider bits")
			(@arg SYSCLK: +required "system clock in Hz")
			(@arg SAR_CLOCK: +required "SAR clock in Hz")
		)
		(@subcommand crc =>
			(about: "CRC-16 of a string as computed by the CRC1 engine")
			(@arg polynomial: -p --polynomial +takes_value default_value("0x1021") "polynomial without the x^16 term")
			(@arg DATA: +required "input bytes")
		)
	).get_matches();

	match matches.subcommand() {
		("reload", Some(sub_m)) => reload(sub_m),
		("rate", Some(sub_m)) => rate(sub_m),
		("baud", Some(sub_m)) => baud(sub_m),
		("delay", Some(sub_m)) => delay(sub_m),
		("spi_clock", Some(sub_m)) => spi_clock(sub_m),
		("pca_freq", Some(sub_m)) => pca_freq(sub_m),
		("adc_clock", Some(sub_m)) => adc_clock(sub_m),
		("crc", Some(sub_m)) => crc(sub_m),
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(if PeripheralError::is_config(&e) { 2 } else { 1 });
	}
}
