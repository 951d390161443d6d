//! Interrupt side line accumulator
//!
//! Called once per received byte. Never blocks and never loops over more than one line, so it
//! is safe to run from the receive interrupt.

use crate::log::{Report, System};
use crate::{debug, error, info};

use super::line_buffer::{AsStr, LineBuffer};
use super::slot::SlotWriter;
use super::errors::ConsoleError;

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                            Events
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// What happened to a received byte
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RxEvent {
  /// Appended to the current line
  Stored,
  /// Terminator on an empty line, nothing to do
  Flushed,
  /// Line handed over to the dispatcher
  Published,
  /// Line completed while the previous one is still pending. The new line is lost.
  Overrun,
  /// Line too long. The partial line is dropped.
  CapacityExceeded,
  /// Byte belongs to a line that already exceeded capacity
  Discarded,
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                        Line Accumulator
// ————————————————————————————————————————————————————————————————————————————————————————————————

pub struct LineAccumulator<'a, R: Report + ?Sized, const N: usize> {
  buffer:     LineBuffer<N>,
  slot:       SlotWriter<'a, N>,
  log:        &'a R,
  terminator: u8,
  discarding: bool,
}

impl<'a, R: Report + ?Sized, const N: usize> LineAccumulator<'a, R, N> {
  pub fn new(slot: SlotWriter<'a, N>, log: &'a R, terminator: u8) -> Self {
    Self {
      buffer: LineBuffer::new(),
      slot,
      log,
      terminator,
      discarding: false,
    }
  }

  /// Current partial line
  pub fn partial(&self) -> &[u8] {
    self.buffer.data()
  }

  // ——————————————————————————————————————————————————————————————————————————————————————————————
  //                                        On Byte Received
  // ——————————————————————————————————————————————————————————————————————————————————————————————

  pub fn on_byte_received(&mut self, byte: u8) -> RxEvent {
    if byte == self.terminator {
      return self.on_terminator();
    }

    if self.discarding {
      return RxEvent::Discarded;
    }

    if !self.buffer.push(byte) {
      error!(self.log, System::RxChar, "{}", ConsoleError::CapacityExceeded);
      self.buffer.clear();
      self.discarding = true;
      return RxEvent::CapacityExceeded;
    }

    debug!(
      self.log,
      System::RxChar,
      "{} <-- copied to receive buffer. Received count is {}",
      byte as char,
      self.buffer.len()
    );
    RxEvent::Stored
  }

  fn on_terminator(&mut self) -> RxEvent {
    debug!(self.log, System::RxChar, "Received a command terminator");

    // End of an oversized line. Everything up to here is dropped.
    if self.discarding {
      self.discarding = false;
      self.buffer.clear();
      return RxEvent::Discarded;
    }

    // Terminator on an empty buffer: the remote is flushing the line
    if self.buffer.is_empty() {
      return RxEvent::Flushed;
    }

    let event = match self.slot.publish(self.buffer.data()) {
      Ok(()) => {
        info!(self.log, System::RxChar, "Parse buffer contains '{}'", self.buffer.data().as_str());
        RxEvent::Published
      }
      Err(ConsoleError::Overrun) => {
        error!(self.log, System::RxChar, "{}", ConsoleError::Overrun);
        RxEvent::Overrun
      }
      Err(e) => {
        error!(self.log, System::RxChar, "{}", e);
        RxEvent::CapacityExceeded
      }
    };

    self.buffer.clear();
    event
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                              Tests
// ————————————————————————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
  use super::*;
  use crate::console::slot::CommandSlot;
  use crate::log::LogLevel;
  use core::fmt;
  use std::cell::RefCell;
  use std::vec::Vec;

  #[derive(Default)]
  struct Levels(RefCell<Vec<LogLevel>>);

  impl Report for Levels {
    fn report(&self, _: System, level: LogLevel, _: fmt::Arguments<'_>) {
      self.0.borrow_mut().push(level);
    }
  }

  fn feed<R: Report, const N: usize>(rx: &mut LineAccumulator<'_, R, N>, bytes: &[u8]) -> Vec<RxEvent> {
    bytes.iter().map(|&b| rx.on_byte_received(b)).collect()
  }

  #[test]
  fn publishes_completed_line() {
    let log = Levels::default();
    let mut slot = CommandSlot::<8>::new();
    let (writer, mut reader) = slot.split();
    let mut rx = LineAccumulator::new(writer, &log, b'\r');

    let events = feed(&mut rx, b"hi\r");
    assert_eq!(events, [RxEvent::Stored, RxEvent::Stored, RxEvent::Published]);
    assert!(rx.partial().is_empty());
    assert_eq!(reader.take().unwrap().line(), b"hi");
  }

  #[test]
  fn empty_line_is_a_flush() {
    let log = Levels::default();
    let mut slot = CommandSlot::<8>::new();
    let (writer, reader) = slot.split();
    let mut rx = LineAccumulator::new(writer, &log, b'\r');

    assert_eq!(rx.on_byte_received(b'\r'), RxEvent::Flushed);
    assert!(!reader.is_pending());
    assert!(!log.0.borrow().contains(&LogLevel::Error));
  }

  #[test]
  fn overrun_drops_new_line() {
    let log = Levels::default();
    let mut slot = CommandSlot::<8>::new();
    let (writer, mut reader) = slot.split();
    let mut rx = LineAccumulator::new(writer, &log, b'\r');

    feed(&mut rx, b"one\r");
    let events = feed(&mut rx, b"two\r");
    assert_eq!(events.last(), Some(&RxEvent::Overrun));
    assert!(rx.partial().is_empty());
    assert!(log.0.borrow().contains(&LogLevel::Error));
    assert_eq!(reader.take().unwrap().line(), b"one");
  }

  #[test]
  fn longest_line_fits() {
    let log = Levels::default();
    let mut slot = CommandSlot::<8>::new();
    let (writer, mut reader) = slot.split();
    let mut rx = LineAccumulator::new(writer, &log, b'\r');

    let events = feed(&mut rx, b"1234567\r");
    assert_eq!(events.last(), Some(&RxEvent::Published));
    assert_eq!(reader.take().unwrap().line(), b"1234567");
  }

  #[test]
  fn oversized_line_is_discarded_whole() {
    let log = Levels::default();
    let mut slot = CommandSlot::<8>::new();
    let (writer, mut reader) = slot.split();
    let mut rx = LineAccumulator::new(writer, &log, b'\r');

    let events = feed(&mut rx, b"12345678xy\r");
    assert_eq!(events[7], RxEvent::CapacityExceeded);
    assert_eq!(&events[8..], [RxEvent::Discarded, RxEvent::Discarded, RxEvent::Discarded]);
    assert!(reader.take().is_none());

    // Next line is accepted again
    feed(&mut rx, b"ok\r");
    assert_eq!(reader.take().unwrap().line(), b"ok");
  }

  #[test]
  fn per_byte_trace_is_debug_level() {
    let log = Levels::default();
    let mut slot = CommandSlot::<8>::new();
    let (writer, _reader) = slot.split();
    let mut rx = LineAccumulator::new(writer, &log, b'\r');

    rx.on_byte_received(b'a');
    assert_eq!(*log.0.borrow(), [LogLevel::Debug]);
  }
}
