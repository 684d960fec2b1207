//! Outside/inside classification of a distance grid.

use std::collections::VecDeque;

use glam::Vec3;

use super::ScalarGrid;
use crate::types::Aabb;

/// Samples reachable from the grid boundary without crossing the surface band.
///
/// Built once on the base grid; finer or coarser grids over the same region
/// look up their nearest base sample. Samples that are neither in the band nor
/// reachable are enclosed by the surface.
#[derive(Clone, Debug)]
pub struct AirMask {
  grid: ScalarGrid,
  reachable: Vec<bool>,
}

impl AirMask {
  /// Flood from every boundary sample through samples whose distance
  /// exceeds `threshold` (6-connectivity).
  ///
  /// Boundary samples are always treated as outside, even when they sit
  /// inside the band.
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "field::flood_air"))]
  pub fn flood(distance: &ScalarGrid, threshold: f32) -> Self {
    let dims = distance.dims();
    let mut reachable = vec![false; distance.values.len()];
    let mut queue = VecDeque::new();

    for x in 0..dims[0] {
      for y in 0..dims[1] {
        for z in 0..dims[2] {
          let on_boundary = x == 0
            || y == 0
            || z == 0
            || x == dims[0] - 1
            || y == dims[1] - 1
            || z == dims[2] - 1;
          if !on_boundary {
            continue;
          }
          let idx = distance.index(x, y, z);
          reachable[idx] = true;
          if distance.values[idx] > threshold {
            queue.push_back([x, y, z]);
          }
        }
      }
    }

    while let Some([x, y, z]) = queue.pop_front() {
      for (axis, step) in [(0, -1i64), (0, 1), (1, -1), (1, 1), (2, -1), (2, 1)] {
        let mut n = [x as i64, y as i64, z as i64];
        n[axis] += step;
        if n[axis] < 0 || n[axis] >= dims[axis] as i64 {
          continue;
        }
        let [nx, ny, nz] = n.map(|v| v as usize);
        let idx = distance.index(nx, ny, nz);
        if reachable[idx] || distance.values[idx] <= threshold {
          continue;
        }
        reachable[idx] = true;
        queue.push_back([nx, ny, nz]);
      }
    }

    Self {
      grid: distance.clone(),
      reachable,
    }
  }

  /// Region of the base grid.
  pub fn region(&self) -> Aabb {
    self.grid.region
  }

  /// Whether the base sample nearest to `p` was reached from outside.
  pub fn is_outside(&self, p: Vec3) -> bool {
    let [x, y, z] = self.grid.nearest_sample(p);
    self.reachable[self.grid.index(x, y, z)]
  }

  /// Number of enclosed samples beyond the band.
  pub fn enclosed_count(&self, threshold: f32) -> usize {
    self
      .reachable
      .iter()
      .zip(&self.grid.values)
      .filter(|(&reached, &d)| !reached && d > threshold)
      .count()
  }
}
