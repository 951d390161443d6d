//! Console configuration
//! Buffer capacities, line terminator and the initial logger setup

use crate::log::{LogLevel, System};

use thiserror::Error;

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Globals
// —————————————————————————————————————————————————————————————————————————————————————————————————

/// Size of the receive buffer and of the parse slot.
/// One byte is reserved for the terminator, so lines hold at most `LINE_CAPACITY - 1` chars.
pub const LINE_CAPACITY: usize = 20;

pub const LINE_TERMINATOR: u8 = b'\r';

/// Systems logging at startup
pub const DEFAULT_LOG_SYSTEMS: u16 =
  System::Logger.mask() | System::RxChar.mask() | System::Command.mask() | System::Adc.mask();

pub const CONFIG_DEFAULT: Config = Config {
  terminator:  LINE_TERMINATOR,
  log_level:   LogLevel::Info,
  log_systems: DEFAULT_LOG_SYSTEMS,
};

pub type Result<T> = core::result::Result<T, Error>;

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Errors
// —————————————————————————————————————————————————————————————————————————————————————————————————

#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error {
  #[error("line terminator cannot be a space")]
  SpaceTerminator,
  #[error("line terminator 0x{0:02x} is not an ascii control byte")]
  PrintableTerminator(u8),
}

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Config
// —————————————————————————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Config {
  pub terminator:  u8,
  pub log_level:   LogLevel,
  pub log_systems: u16,
}

impl Config {
  /// Builds a validated configuration. Usable in const context, so a bad static
  /// configuration fails the build.
  pub const fn new(terminator: u8, log_level: LogLevel, log_systems: u16) -> Result<Self> {
    if terminator == b' ' {
      return Err(Error::SpaceTerminator);
    }
    if !terminator.is_ascii_control() {
      return Err(Error::PrintableTerminator(terminator));
    }

    Ok(Self {
      terminator,
      log_level,
      log_systems,
    })
  }
}

impl Default for Config {
  fn default() -> Self {
    CONFIG_DEFAULT
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                              Tests
// ————————————————————————————————————————————————————————————————————————————————————————————————
