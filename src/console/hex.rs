//! ASCII hexadecimal argument conversion
//!
//! Policy for malformed input:
//! - conversion stops at the first non-hex byte, the rest is ignored
//! - empty input converts to 0
//! - values above 0xFFFF saturate to 0xFFFF (leading zeros never overflow)

/// Converts an ASCII hex token (no `0x` prefix, any case) to `u16`.
pub fn hex_to_u16(text: &[u8]) -> u16 {
  let mut value: u16 = 0;

  for &byte in text {
    let Some(nibble) = hex_nibble(byte)
    else {
      break;
    };

    value = match value.checked_mul(16).and_then(|v| v.checked_add(nibble)) {
      Some(v) => v,
      None => return u16::MAX,
    };
  }
  value
}

#[inline(always)]
fn hex_nibble(byte: u8) -> Option<u16> {
  match byte {
    b'0'..=b'9' => Some((byte - b'0') as u16),
    b'a'..=b'f' => Some((byte - b'a' + 10) as u16),
    b'A'..=b'F' => Some((byte - b'A' + 10) as u16),
    _ => None,
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                              Tests
// ————————————————————————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
  use super::*;
  use std::format;

  #[test]
  fn converts_most_significant_first() {
    assert_eq!(hex_to_u16(b"1a2b"), 0x1a2b);
    assert_eq!(hex_to_u16(b"F"), 0xf);
    assert_eq!(hex_to_u16(b"ffff"), 0xffff);
  }

  #[test]
  fn upper_and_lower_case_agree_on_full_range() {
    for value in 0..=u16::MAX {
      let lower = format!("{value:x}");
      let upper = format!("{value:X}");
      assert_eq!(hex_to_u16(lower.as_bytes()), value);
      assert_eq!(hex_to_u16(upper.as_bytes()), value);
    }
  }

  #[test]
  fn empty_is_zero() {
    assert_eq!(hex_to_u16(b""), 0);
  }

  #[test]
  fn stops_at_first_non_hex() {
    assert_eq!(hex_to_u16(b"12g4"), 0x12);
    assert_eq!(hex_to_u16(b"0x10"), 0);
    assert_eq!(hex_to_u16(b"ab cd"), 0xab);
  }

  #[test]
  fn saturates_on_overflow() {
    assert_eq!(hex_to_u16(b"10000"), u16::MAX);
    assert_eq!(hex_to_u16(b"1a2b3"), u16::MAX);
  }

  #[test]
  fn leading_zeros_do_not_overflow() {
    assert_eq!(hex_to_u16(b"00000001"), 1);
    assert_eq!(hex_to_u16(b"0000ffff"), 0xffff);
  }
}
