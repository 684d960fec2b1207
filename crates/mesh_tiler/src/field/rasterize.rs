//! Narrow-band unsigned distance rasterization.

use glam::Vec3;
use rayon::prelude::*;

use super::{distance::point_triangle_distance, ScalarGrid};
use crate::types::{Aabb, MeshObject};

/// Write the unsigned distance from every sample to the nearest listed face.
///
/// Only samples within `band` of a face are evaluated; everything else keeps
/// `min(current, band)`. Samples are only ever lowered, so the grid can be
/// pre-filled with `band` and rasterized incrementally.
///
/// X-slabs are processed in parallel. Each slab visits only faces whose
/// band-expanded box overlaps its plane.
#[cfg_attr(
  feature = "instrument",
  tracing::instrument(skip_all, name = "field::rasterize_distance")
)]
pub fn rasterize_distance(mesh: &MeshObject, faces: &[u32], grid: &mut ScalarGrid, band: f32) {
  let reach = grid.region.expanded(Vec3::splat(band));
  let boxes: Vec<(u32, Aabb)> = faces
    .iter()
    .filter_map(|&face| {
      let tri = mesh.triangle(face as usize);
      let aabb = Aabb::from_points(tri.iter()).expanded(Vec3::splat(band));
      aabb.intersects(&reach).then_some((face, aabb))
    })
    .collect();

  let dims = grid.dims();
  let origin = grid.region.min;
  let cell = grid.cell_size;
  let slab_len = dims[1] * dims[2];

  grid.values.par_chunks_mut(slab_len).enumerate().for_each(|(x, slab)| {
    for value in slab.iter_mut() {
      *value = value.min(band);
    }

    let px = origin.x + x as f32 * cell.x;
    for (face, aabb) in &boxes {
      if px < aabb.min.x || px > aabb.max.x {
        continue;
      }
      let tri = mesh.triangle(*face as usize);
      let (y0, y1) = sample_range(aabb.min.y, aabb.max.y, origin.y, cell.y, dims[1]);
      let (z0, z1) = sample_range(aabb.min.z, aabb.max.z, origin.z, cell.z, dims[2]);

      for y in y0..y1 {
        let py = origin.y + y as f32 * cell.y;
        for z in z0..z1 {
          let p = Vec3::new(px, py, origin.z + z as f32 * cell.z);
          let slot = &mut slab[y * dims[2] + z];
          let d = point_triangle_distance(p, tri);
          if d < *slot {
            *slot = d;
          }
        }
      }
    }
  });
}

/// Half-open range of sample indices whose coordinate lies in `[lo, hi]`.
#[inline]
fn sample_range(lo: f32, hi: f32, origin: f32, cell: f32, samples: usize) -> (usize, usize) {
  if cell <= 0.0 {
    return (0, samples);
  }
  let start = ((lo - origin) / cell).ceil().max(0.0) as usize;
  let end = (((hi - origin) / cell).floor() + 1.0).max(0.0) as usize;
  (start.min(samples), end.min(samples))
}
