//! Error implementation

use core::fmt;

pub use heapless::String;
use thiserror::Error;

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Globals
// —————————————————————————————————————————————————————————————————————————————————————————————————

pub const ERR_STR_LENGTH: usize = 24;

pub type Result<T> = core::result::Result<T, ConsoleError>;

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Errors
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// Every condition is recovered locally. None of them is fatal.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ConsoleError {
  #[error("command process speed error, line dropped!")]
  Overrun,
  #[error("received character number above limit!")]
  CapacityExceeded,
  #[error("argument to {command} is out of range ({len} > {max} chars)")]
  ArgTooLong {
    command: &'static str,
    len:     usize,
    max:     usize,
  },
  #[error("unrecognized command: {0}")]
  CmdNotFound(String<ERR_STR_LENGTH>),
  #[error("value 0x{0:x} is not recognized")]
  InvalidValue(u16),
  #[error("command failed with: {0}")]
  CmdExec(String<ERR_STR_LENGTH>),
  #[error("failed to write reply!")]
  Output,
}

impl From<fmt::Error> for ConsoleError {
  fn from(_: fmt::Error) -> Self {
    ConsoleError::Output
  }
}

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                             Traits
// —————————————————————————————————————————————————————————————————————————————————————————————————

// ———————————————————————————————————————— Into Truncate ——————————————————————————————————————————

/// Converts from &str to heapless String<N> truncating the length to N
pub trait IntoTruncate {
  fn into_truncated<const N: usize>(self) -> String<N>;
}

impl IntoTruncate for &str {
  fn into_truncated<const N: usize>(self) -> String<N> {
    let mut s = String::<N>::new();

    let end = if self.len() <= N {
      self.len()
    }
    else {
      let mut end = N;
      while !self.is_char_boundary(end) {
        end -= 1;
      }
      end
    };

    let _ = s.push_str(&self[..end]);
    s
  }
}

/// Lossy variant for raw line bytes. Non utf8 bytes are replaced with '?'.
impl IntoTruncate for &[u8] {
  fn into_truncated<const N: usize>(self) -> String<N> {
    let mut s = String::<N>::new();

    for &byte in self.iter().take(N) {
      let c = if byte.is_ascii() { byte as char } else { '?' };
      let _ = s.push(c);
    }
    s
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                              Tests
// ————————————————————————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
  use super::*;
  use std::string::ToString;

  #[test]
  fn truncates_on_char_boundary() {
    let s: String<4> = "añbc".into_truncated();
    assert_eq!(s.as_str(), "añb");
  }

  #[test]
  fn replaces_non_ascii_bytes() {
    let raw: &[u8] = &[b'f', 0xff, b'o'];
    let s: String<8> = raw.into_truncated();
    assert_eq!(s.as_str(), "f?o");
  }

  #[test]
  fn display_messages() {
    let err = ConsoleError::ArgTooLong {
      command: "logreg",
      len:     5,
      max:     4,
    };
    assert_eq!(err.to_string(), "argument to logreg is out of range (5 > 4 chars)");
    assert_eq!(ConsoleError::CmdNotFound("foo".into_truncated()).to_string(), "unrecognized command: foo");
  }
}
