//! Corner sign classification.

/// 8-bit mask of the corners of a cell that are solid (value < 0).
///
/// Bit `i` corresponds to corner `i` (see [`crate::edge_table`]). Zero counts
/// as air.
#[inline]
pub fn build(samples: &[f32; 8]) -> u8 {
  samples
    .iter()
    .enumerate()
    .fold(0u8, |mask, (corner, &s)| mask | (((s < 0.0) as u8) << corner))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_all_air_and_all_solid() {
    assert_eq!(build(&[1.0; 8]), 0);
    assert_eq!(build(&[-1.0; 8]), 255);
  }

  #[test]
  fn test_zero_is_air() {
    assert_eq!(build(&[0.0; 8]), 0);
  }

  #[test]
  fn test_bit_order_matches_corner_index() {
    let mut samples = [1.0; 8];
    samples[0] = -1.0;
    samples[5] = -0.5;
    assert_eq!(build(&samples), 0b0010_0001);
  }
}
