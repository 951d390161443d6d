//! This module owns the serial interface, the usb device and the receive side of the console
// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                           Serial IO
// ————————————————————————————————————————————————————————————————————————————————————————————————

use core::cell::RefCell;
use core::fmt;
use core::fmt::Write;

#[cfg(feature = "defmt")]
use pico_remote_console::log::LogLevel;
use pico_remote_console::log::{LogConfig, LogQueue, LogRecord, Logger};
use pico_remote_console::{LINE_CAPACITY, LineAccumulator};

use critical_section::{Mutex, with as free};
use rp2040_hal::usb::UsbBus;
use usb_device::UsbError;
use usb_device::device::UsbDevice;
use usbd_serial::SerialPort;

use crate::CONFIG;

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                            Globals
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// Bytes moved from the usb endpoint to the accumulator per read
const RX_CHUNK: usize = 64;

/// Busy wait while the usb tx buffer is full, ~6us at 125Mhz
const TX_WAIT_CYCLES: u32 = 750;

/// Log messages buffered between two main loop iterations
pub const LOG_QUEUE_LEN: usize = 16;

pub static SERIAL: SerialHandle = SerialHandle;
pub static SERIAL_CELL: Mutex<RefCell<Option<Serialio>>> = Mutex::new(RefCell::new(None));

/// Receive side of the console, fed from the usb interrupt only
pub static RX_LINE: Mutex<RefCell<Option<RxLine>>> = Mutex::new(RefCell::new(None));

/// Never writes to the usb itself, see `flush_log`
pub static LOGGER: ConsoleLogger =
  Logger::new(LogQueue::new(), LogConfig::new(CONFIG.log_systems, CONFIG.log_level));

pub type SerialDev = SerialPort<'static, UsbBus>;
pub type UsbDev = UsbDevice<'static, UsbBus>;
pub type ConsoleLogger = Logger<LogQueue<LOG_QUEUE_LEN>>;
pub type RxLine = LineAccumulator<'static, ConsoleLogger, LINE_CAPACITY>;
pub type Result<T> = core::result::Result<T, UsbError>;

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                              Init
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// Initialise the SERIAL global object once
pub fn init(serial: SerialDev, usb_dev: UsbDev) {
  free(|cs| {
    let mut cell = SERIAL_CELL.borrow_ref_mut(cs);

    if cell.is_some() {
      panic!("SERIAL already initialized");
    }

    cell.replace(Serialio::new(serial, usb_dev));
  });
}

/// Hands the line accumulator over to the usb interrupt.
/// Bytes received before this are read and dropped.
pub fn attach_receiver(rx: RxLine) {
  free(|cs| {
    RX_LINE.borrow_ref_mut(cs).replace(rx);
  });
}

/// Drains the usb rx endpoint into the line accumulator.
/// To be called from the usb interrupt.
pub fn feed_receiver() {
  let mut chunk = [0u8; RX_CHUNK];

  loop {
    // Serial borrow released before feeding the accumulator
    let count = SERIAL.read(&mut chunk);
    if count == 0 {
      break;
    }

    free(|cs| {
      if let Some(rx) = RX_LINE.borrow_ref_mut(cs).as_mut() {
        for &byte in &chunk[..count] {
          rx.on_byte_received(byte);
        }
      }
    });
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                      SerialHandle Struct
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// Serial Handle for the GLOBAL SERIAL object
pub struct SerialHandle;

// ————————————————————————————————————— SerialHandle impl ————————————————————————————————————————

impl SerialHandle {
  /// Executes a closure with a mutable reference to the serial peripheral.
  pub fn with<F, R>(&self, f: F) -> R
  where F: FnOnce(&mut Serialio) -> R {
    free(|cs| {
      if let Some(cell) = SERIAL_CELL.borrow_ref_mut(cs).as_mut() {
        f(cell)
      }
      else {
        panic!("SERIAL not initialized");
      }
    })
  }

  /// Non-blocking read. Returns the number of bytes copied into `buffer`.
  pub fn read(&self, buffer: &mut [u8]) -> usize {
    self.with(|cell| cell.read(buffer))
  }

  /// Writes data to the USB serial.
  pub fn write(&self, data: &[u8]) -> Result<()> {
    self.with(|cell| cell.write(data))
  }

  /// Get serial monitor connection flag
  pub fn is_connected(&self) -> bool {
    self.with(|cell| cell.serial.dtr())
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                         Serialio Struct
// ————————————————————————————————————————————————————————————————————————————————————————————————

pub struct Serialio {
  pub serial:  SerialDev,
  pub usb_dev: UsbDev,
}

impl Serialio {
  fn new(serial: SerialDev, usb_dev: UsbDev) -> Self {
    Self { serial, usb_dev }
  }

  // ——————————————————————————————————————————————————————————————————————————————————————————————
  //                                           Methods
  // ——————————————————————————————————————————————————————————————————————————————————————————————

  /// Polls the usb device for rx tx data, and returns true if some data was exchanged
  fn poll_usb(&mut self) -> bool {
    self.usb_dev.poll(&mut [&mut self.serial])
  }

  /// Reads whatever is available. Errors count as no data.
  fn read(&mut self, buffer: &mut [u8]) -> usize {
    self.poll_usb();

    match self.serial.read(buffer) {
      Ok(count) => count,
      Err(_) => 0,
    }
  }

  /// Writes an entire slice of data, blocking until it is all sent.
  /// Gives up if the host is not connected.
  fn write(&mut self, mut data: &[u8]) -> Result<()> {
    while !data.is_empty() {
      match self.serial.write(data) {
        Ok(written) => {
          data = &data[written..];
        }
        Err(UsbError::WouldBlock) => {
          if !self.serial.dtr() {
            return Err(UsbError::WouldBlock);
          }
          cortex_m::asm::delay(TX_WAIT_CYCLES);
        }
        Err(e) => {
          return Err(e);
        }
      }

      // The device must be polled to send the serial data
      self.usb_dev.poll(&mut [&mut self.serial]);
    }

    Ok(())
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Traits
// ————————————————————————————————————————————————————————————————————————————————————————————————

// ——————————————————————————————————————————— Write ——————————————————————————————————————————————

impl Write for Serialio {
  fn write_str(&mut self, s: &str) -> fmt::Result {
    self.write(s.as_bytes()).map_err(|_| fmt::Error)?;
    Ok(())
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                           Log Output
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// Prints the queued log messages. Main loop only, this blocks on the usb.
pub fn flush_log() {
  while let Some(record) = LOGGER.sink().pop() {
    print_record(&record);
  }

  let dropped = LOGGER.sink().take_dropped();
  if dropped > 0 {
    crate::println!("[WARN ] (logger) {} log messages dropped", dropped);
  }
}

/// Goes to RTT with the "defmt" feature, to the usb serial otherwise.
#[cfg(not(feature = "defmt"))]
fn print_record(record: &LogRecord) {
  crate::println!("{}", record);
}

#[cfg(feature = "defmt")]
fn print_record(record: &LogRecord) {
  let (system, message) = (record.system.name(), record.message.as_str());
  match record.level {
    LogLevel::Debug => defmt::debug!("({=str}) {=str}", system, message),
    LogLevel::Info => defmt::info!("({=str}) {=str}", system, message),
    LogLevel::Warn => defmt::warn!("({=str}) {=str}", system, message),
    LogLevel::Error => defmt::error!("({=str}) {=str}", system, message),
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Macros
// ————————————————————————————————————————————————————————————————————————————————————————————————

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        critical_section::with(|cs| {
            if let Some(s) = $crate::serial_io::SERIAL_CELL.borrow_ref_mut(cs).as_mut() {
                let _ = core::fmt::Write::write_fmt(s, format_args!($($arg)*));
            }
        })
    }
}

#[macro_export]
macro_rules! println {
    () => {
        $crate::print!("\r\n")
    };
    ($($arg:tt)*) => {
        critical_section::with(|cs| {
            if let Some(s) = $crate::serial_io::SERIAL_CELL.borrow_ref_mut(cs).as_mut() {
                let _ = core::fmt::Write::write_fmt(s, format_args!($($arg)*));
                let _ = core::fmt::Write::write_str(s, "\r\n");
            }
        })
    };
}
