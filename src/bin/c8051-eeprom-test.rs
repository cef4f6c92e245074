#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate c8051_periph;
use c8051_periph::*;

use std::io;
use std::process::exit;

use c8051_periph::board::BoardConfig;
use c8051_periph::cli::{
	get_param,
	parse_number,
};
use c8051_periph::eeprom::{
	Eeprom,
	SelfTest,
	Timeouts,
};
use c8051_periph::sim::{
	Fault,
	SimulatedEeprom,
};

fn board_config(matches: &clap::ArgMatches) -> AResult<BoardConfig> {
	let polls: u32 = get_param(matches, "timeout_polls")?;
	Ok(BoardConfig {
		sysclk_hz: get_param(matches, "sysclk")?,
		baud: get_param(matches, "baud")?,
		spi_max_hz: get_param(matches, "max_sck")?,
		eeprom_capacity: get_param(matches, "capacity")?,
		timeouts: Timeouts {
			transfer_polls: polls,
			write_cycle_polls: polls,
		},
	})
}

fn device(matches: &clap::ArgMatches, config: &BoardConfig) -> AResult<SimulatedEeprom> {
	let mut sim = SimulatedEeprom::new(config.eeprom_capacity)
		.with_write_cycle_polls(get_param(matches, "write_cycle_polls")?)
		.with_transfer_latency(get_param(matches, "transfer_latency")?);

	if matches.is_present("stuck_busy") {
		sim = sim.with_fault(Fault::StuckBusy);
	} else if matches.is_present("dead_bus") {
		sim = sim.with_fault(Fault::DeadBus);
	} else if let Some(address) = matches.value_of("stuck_cell") {
		let address = parse_number(address)?;
		ensure!(address < config.eeprom_capacity, "stuck cell 0x{:04x} outside of EEPROM", address);
		sim = sim.with_fault(Fault::StuckCell { address, value: 0x00 });
	}
	Ok(sim)
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(about: "fill and verify a (simulated) SPI EEPROM like the SPI0 polled mode demo")
		(@arg sysclk: --sysclk +takes_value default_value("24500000") "system clock in Hz")
		(@arg baud: --baud +takes_value default_value("115200") "UART0 baud rate")
		(@arg max_sck: --max_sck +takes_value default_value("2000000") "maximum SPI clock in Hz")
		(@arg capacity: -c --capacity +takes_value default_value("4096") "EEPROM capacity in bytes")
		(@arg timeout_polls: --timeout_polls +takes_value default_value("65535") "poll budget for SPIF and write cycles")
		(@arg write_cycle_polls: --write_cycle_polls +takes_value default_value("3") "status reads until a write cycle completes")
		(@arg transfer_latency: --transfer_latency +takes_value default_value("0") "SPIF polls until a transfer completes")
		(@arg stuck_busy: --stuck_busy conflicts_with[dead_bus stuck_cell] "simulate a write cycle that never ends")
		(@arg dead_bus: --dead_bus conflicts_with[stuck_cell] "simulate a bus that never completes a transfer")
		(@arg stuck_cell: --stuck_cell +takes_value "simulate a cell always reading 0x00")
	).get_matches();

	let config = board_config(&matches)?;
	let setup = config.setup()?;
	for line in setup.to_string().lines() {
		info!("{}", line);
	}

	let sim = device(&matches, &config)?;
	let mut eeprom = Eeprom::new(sim, config.eeprom_capacity, config.timeouts)?;

	let stdout = io::stdout();
	let mut test = SelfTest::new(stdout.lock());
	let result = test.run(&mut eeprom);

	let sim = eeprom.into_bus();
	info!("{} SPI transfers, {} status reads, {} write cycles", sim.transfers(), sim.status_reads(), sim.write_cycles());
	if !test.led().on {
		warn!("status LED off");
	}
	result
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		let code = match PeripheralError::find(&e) {
			Some(PeripheralError::ConfigurationInvalid(_)) => 2,
			Some(PeripheralError::DeviceTimeout { .. }) => 3,
			Some(PeripheralError::VerificationMismatch { .. }) => 4,
			None => 1,
		};
		exit(code);
	}
}
