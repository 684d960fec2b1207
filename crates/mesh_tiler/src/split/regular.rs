//! Regular-exact strategy: lossless octree partition of the source faces.
//!
//! Faces are routed to octants by centroid until every partition fits the
//! polygon limit. Only the leaves become chunks; all of them hang directly
//! under the root and carry their octree depth as level.

use glam::Vec3;
use smallvec::SmallVec;
use tracing::{debug, info};

use super::{fits_or_degenerate, ChunkSink, Emitter, SplitStats, SplitStrategy};
use crate::constants::{MAX_REGULAR_DEPTH, REGULAR_ERROR_SCALE};
use crate::error::TilerResult;
use crate::id::{IdAllocator, TileId};
use crate::types::{Aabb, MeshObject};

/// Partitions existing faces without resampling.
pub struct RegularSplitter {
  polygon_limit: usize,
  ids: IdAllocator,
}

impl RegularSplitter {
  pub fn new(polygon_limit: usize, ids: IdAllocator) -> Self {
    Self { polygon_limit, ids }
  }

  pub fn ids(&self) -> &IdAllocator {
    &self.ids
  }
}

impl SplitStrategy for RegularSplitter {
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "regular::split"))]
  fn split(&mut self, root: &MeshObject, sink: &mut dyn ChunkSink) -> TilerResult<SplitStats> {
    let mut emitter = Emitter::new(sink, &self.ids);

    if fits_or_degenerate(root, self.polygon_limit) {
      debug!(faces = root.face_count(), "source within budget, emitting exact copy");
      emitter.emit_exact_copy(root)?;
      return Ok(emitter.finish());
    }

    let source = root.flattened();
    let partition = Partition {
      source: &source,
      indexed: source.is_indexed(),
      polygon_limit: self.polygon_limit,
    };
    let faces: Vec<u32> = (0..source.faces.len() as u32).collect();
    partition.bisect(&mut emitter, source.bounding_box, faces, 0)?;

    let stats = emitter.finish();
    info!(
      chunks = stats.chunks,
      max_level = stats.max_level,
      elapsed_us = stats.elapsed_us,
      "regular split complete"
    );
    Ok(stats)
  }

  fn finish(&mut self) {}
}

struct Partition<'a> {
  source: &'a MeshObject,
  indexed: bool,
  polygon_limit: usize,
}

impl Partition<'_> {
  fn bisect(
    &self,
    emitter: &mut Emitter<'_>,
    region: Aabb,
    faces: Vec<u32>,
    depth: u32,
  ) -> TilerResult<()> {
    if faces.len() <= self.polygon_limit {
      return self.emit_leaf(emitter, &faces, depth);
    }

    let centroids: Vec<Vec3> = faces
      .iter()
      .map(|&f| self.source.face_centroid(f as usize))
      .collect();
    if depth >= MAX_REGULAR_DEPTH || Aabb::from_points(&centroids).is_point() {
      debug!(depth, faces = faces.len(), "bisection stalled, cutting runs");
      for run in faces.chunks(self.polygon_limit) {
        self.emit_leaf(emitter, run, depth)?;
      }
      return Ok(());
    }

    let mut buckets: [Vec<u32>; 8] = Default::default();
    for (face, centroid) in faces.into_iter().zip(centroids) {
      buckets[region.octant_of(centroid) as usize].push(face);
    }

    let occupied: SmallVec<[(u8, Vec<u32>); 8]> = buckets
      .into_iter()
      .enumerate()
      .filter(|(_, bucket)| !bucket.is_empty())
      .map(|(octant, bucket)| (octant as u8, bucket))
      .collect();
    for (octant, bucket) in occupied {
      self.bisect(emitter, region.octant(octant), bucket, depth + 1)?;
    }
    Ok(())
  }

  fn emit_leaf(&self, emitter: &mut Emitter<'_>, faces: &[u32], depth: u32) -> TilerResult<()> {
    let mut mesh = self.source.extract_faces(self.source.name.clone(), faces);
    let bounds = mesh.bounding_box;
    mesh.geometric_error = bounds.diagonal() as f64 * REGULAR_ERROR_SCALE;
    emitter.emit(mesh, TileId::ROOT, depth, self.indexed, bounds, false)?;
    Ok(())
  }
}

#[cfg(test)]
#[path = "regular_test.rs"]
mod regular_test;
