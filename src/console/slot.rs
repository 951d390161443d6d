//! Single-producer / single-consumer parse slot
//!
//! The slot holds one completed line and a `locked` flag. It is [`split`](CommandSlot::split)
//! once into a [`SlotWriter`] for the receive interrupt and a [`SlotReader`] for the main loop.
//!
//! - Only the writer sets the flag, and only after the line was copied in.
//! - Only the reader clears it, when the [`PendingLine`] guard is dropped.
//!
//! Each side touches the line bytes only while it owns the slot according to the flag.

use core::cell::UnsafeCell;

use portable_atomic::{AtomicBool, Ordering};

use super::errors::{ConsoleError, Result};

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                          Command Slot
// ————————————————————————————————————————————————————————————————————————————————————————————————

pub struct CommandSlot<const N: usize> {
  line:   UnsafeCell<[u8; N]>,
  len:    UnsafeCell<usize>,
  locked: AtomicBool,
}

// SAFETY: `line` and `len` are only accessed by the writer while `locked` is false and by the
// reader while it is true. `split` hands out exactly one of each.
unsafe impl<const N: usize> Sync for CommandSlot<N> {}

impl<const N: usize> CommandSlot<N> {
  pub const fn new() -> Self {
    Self {
      line:   UnsafeCell::new([0u8; N]),
      len:    UnsafeCell::new(0),
      locked: AtomicBool::new(false),
    }
  }

  /// Splits the slot into its producer and consumer halves
  pub fn split(&mut self) -> (SlotWriter<'_, N>, SlotReader<'_, N>) {
    let slot: &Self = self;
    (SlotWriter { slot }, SlotReader { slot })
  }

  pub fn is_locked(&self) -> bool {
    self.locked.load(Ordering::Acquire)
  }
}

impl<const N: usize> Default for CommandSlot<N> {
  fn default() -> Self {
    Self::new()
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                            Writer
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// Producer half. Owned by the receive interrupt.
pub struct SlotWriter<'a, const N: usize> {
  slot: &'a CommandSlot<N>,
}

impl<'a, const N: usize> SlotWriter<'a, N> {
  pub fn is_locked(&self) -> bool {
    self.slot.is_locked()
  }

  /// Copies `line` into the slot, null terminated, and locks it.
  ///
  /// Fails with `Overrun` while the previous line is still pending, and with
  /// `CapacityExceeded` if the line leaves no room for the terminator.
  pub fn publish(&mut self, line: &[u8]) -> Result<()> {
    if self.slot.is_locked() {
      return Err(ConsoleError::Overrun);
    }
    if line.len() >= N {
      return Err(ConsoleError::CapacityExceeded);
    }

    // SAFETY: unlocked, the reader does not access the contents.
    unsafe {
      let buf = &mut *self.slot.line.get();
      buf[..line.len()].copy_from_slice(line);
      buf[line.len()..].fill(0);
      *self.slot.len.get() = line.len();
    }

    self.slot.locked.store(true, Ordering::Release);
    Ok(())
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                            Reader
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// Consumer half. Owned by the main loop.
pub struct SlotReader<'a, const N: usize> {
  slot: &'a CommandSlot<N>,
}

impl<'a, const N: usize> SlotReader<'a, N> {
  pub fn is_pending(&self) -> bool {
    self.slot.is_locked()
  }

  /// Borrows the pending line, if any. The slot unlocks when the guard is dropped.
  pub fn take(&mut self) -> Option<PendingLine<'_, N>> {
    if !self.slot.is_locked() {
      return None;
    }

    Some(PendingLine { slot: self.slot })
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                         Pending Line
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// Exclusive access to a locked slot
pub struct PendingLine<'r, const N: usize> {
  slot: &'r CommandSlot<N>,
}

impl<'r, const N: usize> PendingLine<'r, N> {
  pub fn line(&self) -> &[u8] {
    // SAFETY: locked, the writer does not access the contents.
    unsafe {
      let len = *self.slot.len.get();
      &(&*self.slot.line.get())[..len]
    }
  }

  /// Mutable view, used to split and normalize the line in place
  pub fn line_mut(&mut self) -> &mut [u8] {
    // SAFETY: locked, the writer does not access the contents.
    unsafe {
      let len = *self.slot.len.get();
      &mut (&mut *self.slot.line.get())[..len]
    }
  }

  /// Explicit unlock, same as dropping the guard
  pub fn release(self) {}
}

impl<const N: usize> Drop for PendingLine<'_, N> {
  fn drop(&mut self) {
    self.slot.locked.store(false, Ordering::Release);
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                              Tests
// ————————————————————————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn publish_locks_and_drop_unlocks() {
    let mut slot = CommandSlot::<8>::new();
    let (mut writer, mut reader) = slot.split();

    assert!(reader.take().is_none());
    writer.publish(b"hello").unwrap();
    assert!(writer.is_locked());

    {
      let pending = reader.take().unwrap();
      assert_eq!(pending.line(), b"hello");
    }
    assert!(!reader.is_pending());
  }

  #[test]
  fn rejects_overrun_and_keeps_first_line() {
    let mut slot = CommandSlot::<8>::new();
    let (mut writer, mut reader) = slot.split();

    writer.publish(b"first").unwrap();
    assert_eq!(writer.publish(b"second"), Err(ConsoleError::Overrun));

    let pending = reader.take().unwrap();
    assert_eq!(pending.line(), b"first");
    pending.release();

    writer.publish(b"second").unwrap();
    assert_eq!(reader.take().unwrap().line(), b"second");
  }

  #[test]
  fn shorter_line_zeroes_previous_tail() {
    let mut slot = CommandSlot::<8>::new();
    let (mut writer, mut reader) = slot.split();

    writer.publish(b"abcdef").unwrap();
    reader.take().unwrap().release();
    writer.publish(b"xy").unwrap();
    drop(reader.take());

    assert_eq!(unsafe { &*slot.line.get() }, &[b'x', b'y', 0, 0, 0, 0, 0, 0]);
  }

  #[test]
  fn requires_room_for_terminator() {
    let mut slot = CommandSlot::<4>::new();
    let (mut writer, _reader) = slot.split();

    assert_eq!(writer.publish(b"abcd"), Err(ConsoleError::CapacityExceeded));
    assert!(writer.publish(b"abc").is_ok());
  }

  #[test]
  fn in_place_edits_are_visible() {
    let mut slot = CommandSlot::<8>::new();
    let (mut writer, mut reader) = slot.split();

    writer.publish(b"HeLLo").unwrap();
    let mut pending = reader.take().unwrap();
    pending.line_mut().make_ascii_lowercase();
    assert_eq!(pending.line(), b"hello");
  }
}
