//! Leveled, per-system logging interface
//!
//! Every message carries a [`LogLevel`] and the [`System`] it originates from. A [`LogConfig`]
//! decides whether it is emitted: the level must reach the threshold and the system bit must be
//! set in the enable register. An all-zero register disables logging entirely.
//!
//! The core never touches a global logger. Producers and the dispatcher receive a `&impl Report`.
//!
//! Example:
//! ```rust
//! use pico_remote_console::log::{LogConfig, LogLevel, System};
//!
//! let config = LogConfig::new(0, LogLevel::Info);
//! config.enable_system(System::Command);
//! assert!(config.is_enabled(System::Command, LogLevel::Warn));
//! assert!(!config.is_enabled(System::RxChar, LogLevel::Error));
//! ```

use core::fmt;
use core::fmt::Write;

use heapless::String;
use heapless::mpmc::Queue;
use portable_atomic::{AtomicU8, AtomicU16, Ordering};

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Globals
// —————————————————————————————————————————————————————————————————————————————————————————————————

/// Longer messages are truncated
pub const LOG_LINE_LENGTH: usize = 96;

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                            Log Level
// —————————————————————————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
  Debug, // 0
  Info,  // 1
  Warn,  // 2
  Error, // 3
}

impl From<LogLevel> for u8 {
  fn from(level: LogLevel) -> Self {
    level as u8
  }
}

impl From<u8> for LogLevel {
  fn from(level: u8) -> Self {
    match level {
      0 => LogLevel::Debug,
      1 => LogLevel::Info,
      2 => LogLevel::Warn,
      _ => LogLevel::Error,
    }
  }
}

/// Strict conversion used by the `loglevel` command
impl TryFrom<u16> for LogLevel {
  type Error = u16;

  fn try_from(value: u16) -> Result<Self, u16> {
    match value {
      0..=3 => Ok(LogLevel::from(value as u8)),
      other => Err(other),
    }
  }
}

impl fmt::Display for LogLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", match self {
      LogLevel::Debug => "[DEBUG]",
      LogLevel::Info => "[INFO ]",
      LogLevel::Warn => "[WARN ]",
      LogLevel::Error => "[ERROR]",
    })
  }
}

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                             System
// —————————————————————————————————————————————————————————————————————————————————————————————————

/// Message origin. Each system owns one bit of the enable register.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(u8)]
pub enum System {
  Logger    = 0,
  Command   = 1,
  RxChar    = 2,
  Adc       = 3,
  VMeasure  = 4,
  Functions = 5,
}

impl System {
  pub const fn name(self) -> &'static str {
    match self {
      System::Logger => "logger",
      System::Command => "command",
      System::RxChar => "rxchar",
      System::Adc => "adc",
      System::VMeasure => "vmeasure",
      System::Functions => "functions",
    }
  }

  /// Bit of this system in the enable register
  pub const fn mask(self) -> u16 {
    1 << (self as u8)
  }
}

impl fmt::Display for System {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                           Log Config
// —————————————————————————————————————————————————————————————————————————————————————————————————

/// Enable register and level threshold, shared between interrupt and main loop.
pub struct LogConfig {
  enable: AtomicU16,
  level:  AtomicU8,
}

impl LogConfig {
  pub const fn new(enable: u16, level: LogLevel) -> Self {
    Self {
      enable: AtomicU16::new(enable),
      level:  AtomicU8::new(level as u8),
    }
  }

  pub fn level(&self) -> LogLevel {
    self.level.load(Ordering::Relaxed).into()
  }

  pub fn set_level(&self, level: LogLevel) {
    self.level.store(level.into(), Ordering::Relaxed);
  }

  pub fn enable_mask(&self) -> u16 {
    self.enable.load(Ordering::Relaxed)
  }

  /// Overwrites the whole enable register
  pub fn set_enable_mask(&self, mask: u16) {
    self.enable.store(mask, Ordering::Relaxed);
  }

  pub fn enable_system(&self, system: System) {
    self.enable.fetch_or(system.mask(), Ordering::Relaxed);
  }

  /// Clears every bit of the enable register
  pub fn disable_all(&self) {
    self.set_enable_mask(0);
  }

  pub fn is_enabled(&self, system: System, level: LogLevel) -> bool {
    let enable = self.enable_mask();
    enable != 0 && level >= self.level() && enable & system.mask() != 0
  }
}

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Traits
// —————————————————————————————————————————————————————————————————————————————————————————————————

// ——————————————————————————————————————————— Report ——————————————————————————————————————————————

/// Fire-and-forget reporting collaborator. Must not block and must never fail observably.
pub trait Report {
  fn report(&self, system: System, level: LogLevel, args: fmt::Arguments<'_>);
}

impl<T: Report + ?Sized> Report for &T {
  fn report(&self, system: System, level: LogLevel, args: fmt::Arguments<'_>) {
    (**self).report(system, level, args);
  }
}

// —————————————————————————————————————————— Log Sink —————————————————————————————————————————————

/// Output device of a [`Logger`]. Receives messages that already passed filtering.
///
/// Called from the receive interrupt as well, so it must return without waiting on the output.
pub trait LogSink {
  fn emit(&self, level: LogLevel, system: System, message: &str);
}

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Logger
// —————————————————————————————————————————————————————————————————————————————————————————————————

pub struct Logger<S> {
  config: LogConfig,
  sink:   S,
}

impl<S: LogSink> Logger<S> {
  pub const fn new(sink: S, config: LogConfig) -> Self {
    Self { config, sink }
  }

  pub fn config(&self) -> &LogConfig {
    &self.config
  }

  pub fn sink(&self) -> &S {
    &self.sink
  }
}

impl<S: LogSink> Report for Logger<S> {
  fn report(&self, system: System, level: LogLevel, args: fmt::Arguments<'_>) {
    // Filtering before formatting keeps disabled messages cheap inside the interrupt
    if !self.config.is_enabled(system, level) {
      return;
    }

    let mut message: String<LOG_LINE_LENGTH> = String::new();
    let _ = Truncating(&mut message).write_fmt(args);
    self.sink.emit(level, system, &message);
  }
}

// ——————————————————————————————————————————— Truncating ——————————————————————————————————————————

/// Keeps the part of the output that fits, cut on a char boundary.
/// Fails once full, which stops the remaining formatting.
struct Truncating<'a, const N: usize>(&'a mut String<N>);

impl<const N: usize> Write for Truncating<'_, N> {
  fn write_str(&mut self, s: &str) -> fmt::Result {
    let room = N - self.0.len();
    if s.len() <= room {
      let _ = self.0.push_str(s);
      return Ok(());
    }

    let mut end = room;
    while !s.is_char_boundary(end) {
      end -= 1;
    }
    let _ = self.0.push_str(&s[..end]);
    Err(fmt::Error)
  }
}

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                            Log Queue
// —————————————————————————————————————————————————————————————————————————————————————————————————

/// A formatted message waiting for output
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LogRecord {
  pub level:   LogLevel,
  pub system:  System,
  pub message: String<LOG_LINE_LENGTH>,
}

impl fmt::Display for LogRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({}) {}", self.level, self.system, self.message)
  }
}

/// Non-blocking sink. Messages are queued and printed later from the main loop.
/// When the queue is full new messages are dropped and counted.
///
/// `N` must be a power of 2.
pub struct LogQueue<const N: usize> {
  records: Queue<LogRecord, N>,
  dropped: AtomicU16,
}

impl<const N: usize> LogQueue<N> {
  /// The queue may refuse a message while another context is inside `pop`/`emit`.
  /// That message is counted as dropped, which is acceptable for logging.
  #[allow(deprecated)]
  pub const fn new() -> Self {
    Self {
      records: Queue::new(),
      dropped: AtomicU16::new(0),
    }
  }

  /// Oldest queued message
  pub fn pop(&self) -> Option<LogRecord> {
    self.records.dequeue()
  }

  /// Messages lost to a full queue since the last call
  pub fn take_dropped(&self) -> u16 {
    self.dropped.swap(0, Ordering::Relaxed)
  }
}

impl<const N: usize> Default for LogQueue<N> {
  fn default() -> Self {
    Self::new()
  }
}

impl<const N: usize> LogSink for LogQueue<N> {
  fn emit(&self, level: LogLevel, system: System, message: &str) {
    let mut record = LogRecord {
      level,
      system,
      message: String::new(),
    };
    let _ = Truncating(&mut record.message).write_str(message);

    if self.records.enqueue(record).is_err() {
      let _ = self.dropped.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_add(1)));
    }
  }
}

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Macros
// —————————————————————————————————————————————————————————————————————————————————————————————————

/// Usage: `error!(log, System::Command, "unrecognized command: {}", name)`
#[macro_export]
macro_rules! error {
    ($log:expr, $system:expr, $($arg:tt)*) => {
      $crate::log::Report::report(
        &$log, $system, $crate::log::LogLevel::Error, format_args!($($arg)*)
      )
}}

#[macro_export]
macro_rules! warn {
    ($log:expr, $system:expr, $($arg:tt)*) => {
      $crate::log::Report::report(
        &$log, $system, $crate::log::LogLevel::Warn, format_args!($($arg)*)
      )
}}

#[macro_export]
macro_rules! info {
    ($log:expr, $system:expr, $($arg:tt)*) => {
      $crate::log::Report::report(
        &$log, $system, $crate::log::LogLevel::Info, format_args!($($arg)*)
      )
}}

#[macro_export]
macro_rules! debug {
    ($log:expr, $system:expr, $($arg:tt)*) => {
      $crate::log::Report::report(
        &$log, $system, $crate::log::LogLevel::Debug, format_args!($($arg)*)
      )
}}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                              Tests
// ————————————————————————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::RefCell;
  use std::string::{String as StdString, ToString};
  use std::vec::Vec;

  #[derive(Default)]
  struct Capture {
    lines: RefCell<Vec<(LogLevel, System, StdString)>>,
  }

  impl LogSink for Capture {
    fn emit(&self, level: LogLevel, system: System, message: &str) {
      self.lines.borrow_mut().push((level, system, message.to_string()));
    }
  }

  fn logger(enable: u16, level: LogLevel) -> Logger<Capture> {
    Logger::new(Capture::default(), LogConfig::new(enable, level))
  }

  #[test]
  fn emits_enabled_system_above_threshold() {
    let log = logger(System::Command.mask(), LogLevel::Info);
    crate::warn!(log, System::Command, "argument {} ignored", "ff");

    let lines = log.sink().lines.borrow();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0], (LogLevel::Warn, System::Command, "argument ff ignored".to_string()));
  }

  #[test]
  fn drops_messages_below_threshold() {
    let log = logger(0xffff, LogLevel::Warn);
    crate::info!(log, System::Command, "quiet");
    crate::debug!(log, System::RxChar, "quieter");
    assert!(log.sink().lines.borrow().is_empty());
  }

  #[test]
  fn drops_messages_of_disabled_systems() {
    let log = logger(System::Adc.mask(), LogLevel::Debug);
    crate::error!(log, System::RxChar, "speed error");
    assert!(log.sink().lines.borrow().is_empty());

    log.config().enable_system(System::RxChar);
    crate::error!(log, System::RxChar, "speed error");
    assert_eq!(log.sink().lines.borrow().len(), 1);
  }

  #[test]
  fn zero_register_disables_everything() {
    let log = logger(0xffff, LogLevel::Debug);
    log.config().disable_all();
    crate::error!(log, System::Logger, "gone");
    assert!(log.sink().lines.borrow().is_empty());
  }

  #[test]
  fn truncates_long_messages() {
    let log = logger(0xffff, LogLevel::Debug);
    let long = "x".repeat(LOG_LINE_LENGTH * 2);
    crate::info!(log, System::Functions, "prefix {}", long);

    let lines = log.sink().lines.borrow();
    assert!(lines[0].2.starts_with("prefix xxx"));
    assert_eq!(lines[0].2.len(), LOG_LINE_LENGTH);
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    let log = logger(0xffff, LogLevel::Debug);
    let long = "ñ".repeat(LOG_LINE_LENGTH);
    crate::info!(log, System::Functions, "x{}", long);

    // 1 + 47 * 2 bytes, the next two byte char does not fit
    let lines = log.sink().lines.borrow();
    assert_eq!(lines[0].2.len(), LOG_LINE_LENGTH - 1);
  }

  #[test]
  fn queue_keeps_order_and_drops_when_full() {
    let queue = LogQueue::<2>::new();
    queue.emit(LogLevel::Info, System::RxChar, "one");
    queue.emit(LogLevel::Warn, System::Command, "two");
    queue.emit(LogLevel::Error, System::Adc, "three");

    assert_eq!(queue.take_dropped(), 1);
    assert_eq!(queue.take_dropped(), 0);

    let first = queue.pop().unwrap();
    assert_eq!((first.level, first.system, first.message.as_str()), (LogLevel::Info, System::RxChar, "one"));
    assert_eq!(queue.pop().unwrap().to_string(), "[WARN ] (command) two");
    assert!(queue.pop().is_none());
  }

  #[test]
  fn queue_behind_logger_never_waits() {
    let log = Logger::new(LogQueue::<4>::new(), LogConfig::new(0xffff, LogLevel::Debug));
    for n in 0..10 {
      crate::debug!(log, System::RxChar, "byte {}", n);
    }

    assert_eq!(log.sink().take_dropped(), 6);
    assert_eq!(log.sink().pop().unwrap().message.as_str(), "byte 0");
  }

  #[test]
  fn system_bits_follow_declaration_order() {
    assert_eq!(System::Logger.mask(), 0x01);
    assert_eq!(System::Functions.mask(), 0x20);
    assert_eq!(System::VMeasure.mask(), 0x10);
  }

  #[test]
  fn strict_level_conversion() {
    assert_eq!(LogLevel::try_from(2u16), Ok(LogLevel::Warn));
    assert_eq!(LogLevel::try_from(4u16), Err(4));
  }
}
