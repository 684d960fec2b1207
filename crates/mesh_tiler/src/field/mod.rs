//! Scalar fields sampled on regular grids.
//!
//! # Memory Layout
//!
//! ```text
//! Samples are stored row-major with Z innermost:
//!
//!   index = (x * dims_y + y) * dims_z + z
//!
//! A grid of N cells per axis holds N + 1 samples per axis. Sample (0,0,0)
//! sits on region.min and sample (N,N,N) on region.max.
//! ```
//!
//! One x-slab (`dims_y * dims_z` samples) is contiguous, which is the unit of
//! parallel work in [`rasterize`].

pub mod distance;
pub mod flood;
pub mod rasterize;

pub use distance::{closest_point_on_triangle, point_triangle_distance};
pub use flood::AirMask;
pub use rasterize::rasterize_distance;

use glam::Vec3;

use crate::types::Aabb;

/// Scalar values on the sample points of a regular grid.
#[derive(Clone, Debug)]
pub struct ScalarGrid {
  /// Region covered by the grid (sample corners lie on its faces).
  pub region: Aabb,

  /// Cells per axis (samples = cells + 1).
  pub cells: [usize; 3],

  /// World-space cell extent per axis.
  pub cell_size: Vec3,

  pub values: Vec<f32>,
}

impl ScalarGrid {
  /// Create a grid over `region` with every sample set to `fill`.
  pub fn new(region: Aabb, cells: [usize; 3], fill: f32) -> Self {
    let cells = cells.map(|c| c.max(1));
    let size = region.size();
    let cell_size = Vec3::new(
      size.x / cells[0] as f32,
      size.y / cells[1] as f32,
      size.z / cells[2] as f32,
    );
    let len = (cells[0] + 1) * (cells[1] + 1) * (cells[2] + 1);
    Self {
      region,
      cells,
      cell_size,
      values: vec![fill; len],
    }
  }

  /// Samples per axis.
  #[inline]
  pub fn dims(&self) -> [usize; 3] {
    [self.cells[0] + 1, self.cells[1] + 1, self.cells[2] + 1]
  }

  #[inline]
  pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
    let [_, dy, dz] = self.dims();
    (x * dy + y) * dz + z
  }

  #[inline]
  pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
    self.values[self.index(x, y, z)]
  }

  /// World position of a sample.
  #[inline]
  pub fn position(&self, x: usize, y: usize, z: usize) -> Vec3 {
    self.region.min + Vec3::new(x as f32, y as f32, z as f32) * self.cell_size
  }

  /// Length of the longest cell edge.
  pub fn cell_length(&self) -> f32 {
    self.cell_size.max_element()
  }

  pub fn cell_diagonal(&self) -> f32 {
    self.cell_size.length()
  }

  /// Continuous sample-space coordinates of a point, clamped to the grid.
  fn local(&self, p: Vec3) -> Vec3 {
    let mut local = Vec3::ZERO;
    for axis in 0..3 {
      if self.cell_size[axis] > 0.0 {
        local[axis] = ((p[axis] - self.region.min[axis]) / self.cell_size[axis])
          .clamp(0.0, self.cells[axis] as f32);
      }
    }
    local
  }

  /// Closest sample to a point.
  pub fn nearest_sample(&self, p: Vec3) -> [usize; 3] {
    let local = self.local(p);
    [0, 1, 2].map(|axis| (local[axis].round() as usize).min(self.cells[axis]))
  }

  /// Trilinear interpolation of the field at a point (clamped to the grid).
  pub fn sample_trilinear(&self, p: Vec3) -> f32 {
    let local = self.local(p);
    let base = [0, 1, 2].map(|axis| (local[axis].floor() as usize).min(self.cells[axis] - 1));
    let t = local - Vec3::new(base[0] as f32, base[1] as f32, base[2] as f32);

    let mut value = 0.0;
    for corner in 0..8 {
      let [ox, oy, oz] = crate::edge_table::corner_offset(corner);
      let wx = if ox == 1 { t.x } else { 1.0 - t.x };
      let wy = if oy == 1 { t.y } else { 1.0 - t.y };
      let wz = if oz == 1 { t.z } else { 1.0 - t.z };
      value += wx * wy * wz * self.get(base[0] + ox, base[1] + oy, base[2] + oz);
    }
    value
  }
}
