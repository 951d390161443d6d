//! Voltage measurement calibration
//!
//! Raw ADC counts are converted to millivolts with a fixed point slope (1/16 mV per count unit)
//! and a positive offset:
//!
//! `mV = ((counts * slope) >> 4) + offset`

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Calibration {
  pub slope:  u16,
  pub offset: u16,
}

impl Calibration {
  pub const DEFAULT: Calibration = Calibration { slope: 1, offset: 0 };

  pub const fn new(slope: u16, offset: u16) -> Self {
    Self { slope, offset }
  }

  /// Saturates at `u16::MAX`
  pub fn millivolts(&self, counts: u16) -> u16 {
    let scaled = (u32::from(counts) * u32::from(self.slope)) >> 4;
    let mv = scaled + u32::from(self.offset);
    mv.min(u32::from(u16::MAX)) as u16
  }
}

impl Default for Calibration {
  fn default() -> Self {
    Self::DEFAULT
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn applies_slope_then_offset() {
    let cal = Calibration::new(0x30, 5);
    assert_eq!(cal.millivolts(100), 100 * 3 + 5);
  }

  #[test]
  fn default_divides_by_sixteen() {
    assert_eq!(Calibration::default().millivolts(0x3ff), 0x3f);
  }

  #[test]
  fn saturates_instead_of_wrapping() {
    let cal = Calibration::new(0xffff, 0xffff);
    assert_eq!(cal.millivolts(0xffff), u16::MAX);
  }
}
