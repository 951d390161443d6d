//! Command table of the firmware
//! Built-in console commands plus device maintenance.

use embedded_hal::delay::DelayNs;
use pico_remote_console::console::commands;
use pico_remote_console::console::{ArgKind, CommandDescriptor, CommandTable, Result};

use crate::device::{Device, device_reset, device_reset_to_usb};
use crate::print;

// -----------------------------------------------------------------------------
//                              Commands Config
// -----------------------------------------------------------------------------

pub static COMMANDS: CommandTable<Device> = CommandTable::new(&[
  CommandDescriptor {
    name:        "hello",
    arg_kind:    ArgKind::None,
    max_arg_len: 0,
    handler:     commands::hello,
    help:        "Greeting",
  },
  CommandDescriptor {
    name:        "help",
    arg_kind:    ArgKind::None,
    max_arg_len: 0,
    handler:     commands::help,
    help:        "Show command help",
  },
  CommandDescriptor {
    name:        "logreg",
    arg_kind:    ArgKind::Hex,
    max_arg_len: 4,
    handler:     commands::logreg,
    help:        "Set logger enable register | <hex4>",
  },
  CommandDescriptor {
    name:        "logreg?",
    arg_kind:    ArgKind::None,
    max_arg_len: 0,
    handler:     commands::logreg_query,
    help:        "Logger enable register",
  },
  CommandDescriptor {
    name:        "loglevel",
    arg_kind:    ArgKind::Hex,
    max_arg_len: 1,
    handler:     commands::loglevel,
    help:        "0 debug, 1 info, 2 warning, 3 error | <hex1>",
  },
  CommandDescriptor {
    name:        "vslope",
    arg_kind:    ArgKind::Hex,
    max_arg_len: 4,
    handler:     commands::vslope,
    help:        "Voltage slope, 1/16 mV per count | <hex4>",
  },
  CommandDescriptor {
    name:        "voffset",
    arg_kind:    ArgKind::Hex,
    max_arg_len: 4,
    handler:     commands::voffset,
    help:        "Voltage offset in mV | <hex4>",
  },
  CommandDescriptor {
    name:        "vcounts?",
    arg_kind:    ArgKind::None,
    max_arg_len: 0,
    handler:     commands::vcounts_query,
    help:        "Raw VSYS adc counts",
  },
  CommandDescriptor {
    name:        "volt?",
    arg_kind:    ArgKind::None,
    max_arg_len: 0,
    handler:     commands::volt_query,
    help:        "Calibrated VSYS in mV",
  },
  CommandDescriptor {
    name:        "reset",
    arg_kind:    ArgKind::None,
    max_arg_len: 0,
    handler:     reset,
    help:        "Reset device",
  },
  CommandDescriptor {
    name:        "flash",
    arg_kind:    ArgKind::None,
    max_arg_len: 0,
    handler:     flash,
    help:        "Restart in USB Flash mode",
  },
]);

// -----------------------------------------------------------------------------
//                               Functions Config
// -----------------------------------------------------------------------------

// ——————————————————————————————————————————— Reset ——————————————————————————————————————————————

fn reset(device: &mut Device, _: u16) -> Result<()> {
  print!("\r\nResetting...\r\n");
  device.timer.delay_ms(1500); // Waiting for reset msg to appear
  device_reset();
}

// ——————————————————————————————————————————— Flash ——————————————————————————————————————————————

fn flash(_: &mut Device, _: u16) -> Result<()> {
  print!("\r\nRestarting in USB Flash mode!...\r\n");
  device_reset_to_usb();
}
