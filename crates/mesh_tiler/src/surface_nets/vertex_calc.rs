//! Vertex placement inside a cell.

use glam::Vec3;

use crate::edge_table::{corner_offset, EDGE_CORNERS};

#[inline]
fn corner_position(corner: usize) -> Vec3 {
  let [x, y, z] = corner_offset(corner);
  Vec3::new(x as f32, y as f32, z as f32)
}

/// Centroid of the zero crossings on the cell's 12 edges, in cell-local
/// `[0, 1]^3` coordinates. Falls back to the cell center without crossings.
#[inline]
pub fn centroid_of_crossings(samples: &[f32; 8]) -> Vec3 {
  let mut sum = Vec3::ZERO;
  let mut count = 0u32;

  for &[c0, c1] in &EDGE_CORNERS {
    let s0 = samples[c0];
    let s1 = samples[c1];
    if (s0 < 0.0) != (s1 < 0.0) {
      let t = s0 / (s0 - s1);
      let p0 = corner_position(c0);
      sum += p0 + t * (corner_position(c1) - p0);
      count += 1;
    }
  }

  if count == 0 {
    return Vec3::splat(0.5);
  }
  sum / count as f32
}
