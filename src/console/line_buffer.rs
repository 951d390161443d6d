// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                          Line Buffer
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// Fixed capacity receive buffer with a write cursor.
///
/// The last byte is reserved for the terminator, so the cursor never goes past `N - 1`.
pub struct LineBuffer<const N: usize> {
  buffer: [u8; N],
  used:   usize,
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                            Methods
// ————————————————————————————————————————————————————————————————————————————————————————————————

impl<const N: usize> LineBuffer<N> {
  /// Creates a new buffer
  ///
  /// This is declared const, allowing it to be used even in `static` contexts.
  pub const fn new() -> Self {
    LineBuffer {
      buffer: [0u8; N],
      used:   0,
    }
  }

  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.used == 0
  }

  /// True once the cursor sits on the reserved terminator byte
  #[inline(always)]
  pub fn is_full(&self) -> bool {
    self.used >= Self::max_line()
  }

  /// Return length of currently stored line
  #[inline(always)]
  pub fn len(&self) -> usize {
    self.used
  }

  /// Longest line the buffer can hold
  #[inline(always)]
  pub const fn max_line() -> usize {
    N.saturating_sub(1)
  }

  /// Add a single byte, return false if full
  #[inline(always)]
  pub fn push(&mut self, byte: u8) -> bool {
    if self.is_full() {
      return false;
    }

    self.buffer[self.used] = byte;
    self.used += 1;
    true
  }

  /// Returns the filled part of the buffer
  #[inline(always)]
  pub fn data(&self) -> &[u8] {
    &self.buffer[..self.used]
  }

  /// Zeroes the contents and resets the cursor
  #[inline(always)]
  pub fn clear(&mut self) {
    self.buffer[..self.used].fill(0);
    self.used = 0;
  }
}

impl<const N: usize> Default for LineBuffer<N> {
  fn default() -> Self {
    Self::new()
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Traits
// ————————————————————————————————————————————————————————————————————————————————————————————————

pub trait AsStr {
  fn as_str(&self) -> &str;
}

impl AsStr for [u8] {
  /// Tries to convert an u8 array to utf8 &str. Defaults to error str if it fails.
  fn as_str(&self) -> &str {
    core::str::from_utf8(self).unwrap_or("Err: utf8 conversion")
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                              Tests
// ————————————————————————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keeps_last_byte_reserved() {
    let mut buf = LineBuffer::<4>::new();
    assert!(buf.push(b'a'));
    assert!(buf.push(b'b'));
    assert!(buf.push(b'c'));
    assert!(!buf.push(b'd'));
    assert_eq!(buf.data(), b"abc");
    assert!(buf.is_full());
  }

  #[test]
  fn clear_resets_cursor() {
    let mut buf = LineBuffer::<8>::new();
    buf.push(b'x');
    buf.clear();
    assert!(buf.is_empty());
    assert_eq!(buf.data(), b"");
    assert!(buf.buffer.iter().all(|&b| b == 0));
  }

  #[test]
  fn as_str_falls_back_on_invalid_utf8() {
    let raw: &[u8] = &[0xc3];
    assert_eq!(raw.as_str(), "Err: utf8 conversion");
    assert_eq!(b"hello"[..].as_str(), "hello");
  }
}
