//! Built-in commands
//!
//! Handlers are generic over the application context, so one static table can bind them to the
//! firmware device or to a test bench alike.
//! Register them in the application's `CommandTable`, e.g.
//! `handler: commands::logreg` with `arg_kind: ArgKind::Hex, max_arg_len: 4`.

use core::fmt;

use crate::calibration::Calibration;
use crate::log::{LogConfig, LogLevel, Report, System};
use crate::{debug, info};

use super::errors::{ConsoleError, Result};
use super::table::CommandTable;

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                         Context Traits
// —————————————————————————————————————————————————————————————————————————————————————————————————

/// What every built-in needs: a reply channel, the logger and the table itself.
pub trait CommandContext: fmt::Write + Sized + 'static {
  fn commands(&self) -> &'static CommandTable<Self>;

  /// Handlers report here, on their own system
  fn log(&self) -> &dyn Report;

  fn log_config(&self) -> &LogConfig;
}

/// Voltage measurement channel
pub trait VoltageProbe {
  /// Single raw conversion
  fn read_counts(&mut self) -> u16;

  fn calibration(&self) -> Calibration;

  fn calibration_mut(&mut self) -> &mut Calibration;
}

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                             General
// —————————————————————————————————————————————————————————————————————————————————————————————————

pub fn hello<C: CommandContext>(ctx: &mut C, _: u16) -> Result<()> {
  debug!(ctx.log(), System::Functions, "Greeting");
  write!(ctx, "Hello!\r\n")?;
  Ok(())
}

pub fn help<C: CommandContext>(ctx: &mut C, _: u16) -> Result<()> {
  let table = ctx.commands();
  debug!(ctx.log(), System::Functions, "Listing {} commands", table.len());
  write!(ctx, "Available commands:\r\n")?;
  table.write_help(ctx)?;
  Ok(())
}

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Logger
// —————————————————————————————————————————————————————————————————————————————————————————————————

/// Sets the logger enable register directly. One bit per system.
pub fn logreg<C: CommandContext>(ctx: &mut C, value: u16) -> Result<()> {
  ctx.log_config().set_enable_mask(value);
  info!(ctx.log(), System::Logger, "Enable register 0x{:x}", value);
  write!(ctx, "Logger enable register set to 0x{:x}\r\n", value)?;
  Ok(())
}

pub fn logreg_query<C: CommandContext>(ctx: &mut C, _: u16) -> Result<()> {
  let mask = ctx.log_config().enable_mask();
  write!(ctx, "0x{:x}\r\n", mask)?;
  Ok(())
}

/// 0 = debug, 1 = info, 2 = warning, 3 = error. Other values leave the level unchanged.
pub fn loglevel<C: CommandContext>(ctx: &mut C, value: u16) -> Result<()> {
  let level = LogLevel::try_from(value).map_err(ConsoleError::InvalidValue)?;
  ctx.log_config().set_level(level);
  info!(ctx.log(), System::Logger, "Level {}", level);
  write!(ctx, "Logging set to level {} {}\r\n", value, level)?;
  Ok(())
}

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                        Voltage Measurement
// —————————————————————————————————————————————————————————————————————————————————————————————————

pub fn vslope<C: CommandContext + VoltageProbe>(ctx: &mut C, value: u16) -> Result<()> {
  ctx.calibration_mut().slope = value;
  info!(ctx.log(), System::VMeasure, "Slope 0x{:x}", value);
  write!(ctx, "Voltage slope set to 0x{:x}\r\n", value)?;
  Ok(())
}

pub fn voffset<C: CommandContext + VoltageProbe>(ctx: &mut C, value: u16) -> Result<()> {
  ctx.calibration_mut().offset = value;
  info!(ctx.log(), System::VMeasure, "Offset 0x{:x}", value);
  write!(ctx, "Voltage offset set to 0x{:x}\r\n", value)?;
  Ok(())
}

/// Raw counts, hex
pub fn vcounts_query<C: CommandContext + VoltageProbe>(ctx: &mut C, _: u16) -> Result<()> {
  let counts = ctx.read_counts();
  debug!(ctx.log(), System::Adc, "Raw conversion 0x{:x}", counts);
  write!(ctx, "0x{:x}\r\n", counts)?;
  Ok(())
}

/// Calibrated millivolts, decimal
pub fn volt_query<C: CommandContext + VoltageProbe>(ctx: &mut C, _: u16) -> Result<()> {
  let counts = ctx.read_counts();
  debug!(ctx.log(), System::Adc, "Raw conversion 0x{:x}", counts);

  let mv = ctx.calibration().millivolts(counts);
  info!(ctx.log(), System::VMeasure, "0x{:x} counts is {} mV", counts, mv);
  write!(ctx, "{}\r\n", mv)?;
  Ok(())
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                              Tests
// ————————————————————————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
  use super::*;
  use crate::console::table::{ArgKind, CommandDescriptor};
  use crate::log::{LogQueue, LogRecord, Logger};
  use std::string::String;
  use std::vec::Vec;

  /// Every system enabled
  const ALL_SYSTEMS: u16 = 0x3f;

  struct Bench {
    out:         String,
    log:         Logger<LogQueue<8>>,
    calibration: Calibration,
    counts:      u16,
  }

  impl Bench {
    fn new() -> Self {
      Self {
        out:         String::new(),
        log:         Logger::new(LogQueue::new(), LogConfig::new(ALL_SYSTEMS, LogLevel::Info)),
        calibration: Calibration::DEFAULT,
        counts:      0x200,
      }
    }

    fn records(&self) -> Vec<LogRecord> {
      core::iter::from_fn(|| self.log.sink().pop()).collect()
    }
  }

  impl fmt::Write for Bench {
    fn write_str(&mut self, s: &str) -> fmt::Result {
      self.out.push_str(s);
      Ok(())
    }
  }

  impl CommandContext for Bench {
    fn commands(&self) -> &'static CommandTable<Self> {
      &TABLE
    }

    fn log(&self) -> &dyn Report {
      &self.log
    }

    fn log_config(&self) -> &LogConfig {
      self.log.config()
    }
  }

  impl VoltageProbe for Bench {
    fn read_counts(&mut self) -> u16 {
      self.counts
    }

    fn calibration(&self) -> Calibration {
      self.calibration
    }

    fn calibration_mut(&mut self) -> &mut Calibration {
      &mut self.calibration
    }
  }

  static TABLE: CommandTable<Bench> = CommandTable::new(&[
    CommandDescriptor {
      name:        "hello",
      arg_kind:    ArgKind::None,
      max_arg_len: 0,
      handler:     hello,
      help:        "Greeting",
    },
    CommandDescriptor {
      name:        "help",
      arg_kind:    ArgKind::None,
      max_arg_len: 0,
      handler:     help,
      help:        "This list",
    },
  ]);

  #[test]
  fn help_prints_table() {
    let mut bench = Bench::new();
    help(&mut bench, 0).unwrap();
    assert_eq!(bench.out, "Available commands:\r\nhello - Greeting\r\nhelp - This list\r\n");
  }

  #[test]
  fn logreg_sets_and_queries_register() {
    let mut bench = Bench::new();
    logreg(&mut bench, 0x1a2b).unwrap();
    assert_eq!(bench.log.config().enable_mask(), 0x1a2b);

    bench.out.clear();
    logreg_query(&mut bench, 0).unwrap();
    assert_eq!(bench.out, "0x1a2b\r\n");
  }

  #[test]
  fn loglevel_rejects_unknown_level() {
    let mut bench = Bench::new();
    assert_eq!(loglevel(&mut bench, 7), Err(ConsoleError::InvalidValue(7)));
    assert_eq!(bench.log.config().level(), LogLevel::Info);

    loglevel(&mut bench, 3).unwrap();
    assert_eq!(bench.log.config().level(), LogLevel::Error);
  }

  #[test]
  fn volt_uses_calibration() {
    let mut bench = Bench::new();
    vslope(&mut bench, 0x20).unwrap();
    voffset(&mut bench, 10).unwrap();

    bench.out.clear();
    volt_query(&mut bench, 0).unwrap();
    assert_eq!(bench.out, "1034\r\n"); // (0x200 * 0x20 >> 4) + 10

    bench.out.clear();
    vcounts_query(&mut bench, 0).unwrap();
    assert_eq!(bench.out, "0x200\r\n");
  }

  #[test]
  fn volt_reports_conversion_and_result() {
    let mut bench = Bench::new();
    bench.calibration = Calibration::new(0x20, 10);
    bench.log.config().set_level(LogLevel::Debug);

    volt_query(&mut bench, 0).unwrap();

    let records = bench.records();
    assert_eq!(records.len(), 2);
    assert_eq!((records[0].level, records[0].system), (LogLevel::Debug, System::Adc));
    assert_eq!(records[0].message, "Raw conversion 0x200");
    assert_eq!((records[1].level, records[1].system), (LogLevel::Info, System::VMeasure));
    assert_eq!(records[1].message, "0x200 counts is 1034 mV");
  }

  #[test]
  fn handler_reports_follow_enable_register() {
    let mut bench = Bench::new();
    bench.log.config().set_level(LogLevel::Debug);
    bench.log.config().set_enable_mask(System::VMeasure.mask());

    vcounts_query(&mut bench, 0).unwrap();
    hello(&mut bench, 0).unwrap();
    assert!(bench.records().is_empty());

    vslope(&mut bench, 0x18).unwrap();
    let records = bench.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].to_string(), "[INFO ] (vmeasure) Slope 0x18");
  }

  #[test]
  fn logger_commands_report_on_logger_system() {
    let mut bench = Bench::new();
    loglevel(&mut bench, 1).unwrap();

    let records = bench.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].system, System::Logger);
    assert_eq!(records[0].message, "Level [INFO ]");
  }
}
