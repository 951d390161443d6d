//! Main program logic
//!
//! Commands arrive through the usb interrupt. The main loop only polls the dispatcher, so
//! a slow handler never loses received bytes, it only makes the next line overrun.

use embedded_hal::delay::DelayNs;
#[cfg(feature = "panic-persist")]
use pico_remote_console::console::AsStr;
use pico_remote_console::info;
use pico_remote_console::log::System;
use pico_remote_console::{Dispatcher, LINE_CAPACITY};

use crate::device::Device;
use crate::println;
use crate::serial_io::{self, ConsoleLogger, LOGGER, SERIAL};

pub type ConsoleDispatcher = Dispatcher<'static, Device, ConsoleLogger, LINE_CAPACITY>;

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                            Program
// ————————————————————————————————————————————————————————————————————————————————————————————————

pub struct Program {
  dispatcher: ConsoleDispatcher,
}

impl Program {
  pub fn new(dispatcher: ConsoleDispatcher) -> Self {
    Self { dispatcher }
  }

  // ——————————————————————————————————————————————————————————————————————————————————————————————
  //                                             Init
  // ——————————————————————————————————————————————————————————————————————————————————————————————

  pub fn init(&mut self, device: &mut Device) {
    // Blink while waiting for a serial monitor
    while !SERIAL.is_connected() {
      device.toggle_led();
      device.timer.delay_ms(80);
    }
    info!(LOGGER, System::Logger, "USB Serial Monitor: Connected!");
    serial_io::flush_log();

    // Displaying last panic msg
    #[cfg(feature = "panic-persist")]
    if let Some(msg) = panic_persist::get_panic_message_bytes() {
      println!("\r\n========= PANIC ===========");
      println!("{}", msg.as_str());
    }

    println!("\r\n========= HELLO =========== ");
    println!("Remote command console, {} commands", self.dispatcher.table().len());
    println!("Type \"help\" for the command list, end lines with <CR>");
  }

  // ——————————————————————————————————————————————————————————————————————————————————————————————
  //                                              Run
  // ——————————————————————————————————————————————————————————————————————————————————————————————

  pub fn run(&mut self, device: &mut Device) -> ! {
    loop {
      // Errors are already reported by the dispatcher
      if self.dispatcher.poll_and_dispatch(device).is_some() {
        device.toggle_led();
      }

      // Includes what the usb interrupt queued
      serial_io::flush_log();
    }
  }
}
