// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                    RP Pico Remote Command Console
// ————————————————————————————————————————————————————————————————————————————————————————————————

#![no_std]
#![no_main]

mod cli_commands;
mod device;
mod program;
mod serial_io;

use device::Device;
use program::Program;
use serial_io::LOGGER;

use pico_remote_console::config::DEFAULT_LOG_SYSTEMS;
use pico_remote_console::log::LogLevel;
use pico_remote_console::{CommandSlot, Config, Dispatcher, LINE_CAPACITY, LINE_TERMINATOR, LineAccumulator};

use rp2040_hal as hal;

// Panic strategy
#[cfg(feature = "panic-persist")]
use panic_persist as _;
#[cfg(feature = "panic-probe")]
use panic_probe as _;
#[cfg(feature = "panic-usb")]
use rp2040_panic_usb_boot as _;

#[cfg(not(any(feature = "panic-persist", feature = "panic-probe", feature = "panic-usb")))]
compile_error!("Select a panic strategy: \"panic-persist\", \"panic-probe\" or \"panic-usb\"");

#[cfg(feature = "defmt")]
use defmt_rtt as _;

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                            Config
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// Resolved at compile time, an invalid configuration fails the build
pub const CONFIG: Config = match Config::new(LINE_TERMINATOR, LogLevel::Info, DEFAULT_LOG_SYSTEMS) {
  Ok(config) => config,
  Err(_) => panic!("invalid console configuration"),
};

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                              Main
// ————————————————————————————————————————————————————————————————————————————————————————————————

#[hal::entry]
fn main() -> ! {
  let mut device = Device::new();

  // Parse slot shared by the usb interrupt (writer) and the main loop (reader)
  let slot = cortex_m::singleton!(: CommandSlot<LINE_CAPACITY> = CommandSlot::new()).unwrap();
  let (writer, reader) = slot.split();

  serial_io::attach_receiver(LineAccumulator::new(writer, &LOGGER, CONFIG.terminator));

  let mut program = Program::new(Dispatcher::new(&cli_commands::COMMANDS, reader, &LOGGER));

  program.init(&mut device);
  program.run(&mut device)
}
