//! Voxel-resample strategy.
//!
//! ```text
//! source ──► base grid (grid_resolution cells, padded)
//!              │ narrow-band distance + air flood fill
//!              ▼
//! node(region, cells, faces, parent, level)
//!   field = min(d, band) - iso·cell, negative where enclosed
//!   surface = surface_nets(field)
//!   ├── within budget or cells at minimum ──► leaf chunk
//!   └── otherwise
//!         proxy = surface at halved resolutions ──► chunk
//!         for each octant with candidate faces:
//!           node(octant, cells / 2, faces ∩ octant, proxy, level + 1)
//! ```
//!
//! Children keep the cell size of the rejected surface, so every level down
//! the tree is finer than its proxy. Each node samples one extra cell toward
//! its low side. That layer is padding: it only closes the quads across the
//! node's low faces, so neighboring chunks cover their common faces exactly
//! once and no triangle lands in two siblings.
//!
//! Leaf tiles are bounded by their geometry. Proxies are bounded by their
//! whole sampling region, which holds every descendant.

use glam::Vec3;
use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::{debug, info};

use super::{fits_or_degenerate, ChunkSink, Emitter, SplitStats, SplitStrategy};
use crate::constants::{GRID_PADDING_CELLS, MIN_GRID_RESOLUTION};
use crate::error::TilerResult;
use crate::field::{rasterize_distance, AirMask, ScalarGrid};
use crate::id::{IdAllocator, TileId};
use crate::surface_nets;
use crate::types::{Aabb, MeshObject};

/// Base field kept between `split` and `finish`.
struct Scratch {
  source: MeshObject,
  face_bounds: Vec<Aabb>,
  air: AirMask,
}

/// Resamples the source into a voxel field and re-extracts it per octree node.
pub struct VoxelSplitter {
  polygon_limit: usize,
  grid_resolution: [u32; 3],
  iso_level: f32,
  ids: IdAllocator,
  scratch: Option<Scratch>,
}

/// Extracted surface of one node.
struct NodeSurface {
  mesh: MeshObject,
  /// Region the surface was sampled over.
  bounds: Aabb,
}

impl VoxelSplitter {
  pub fn new(polygon_limit: usize, grid_resolution: [u32; 3], iso_level: f32, ids: IdAllocator) -> Self {
    Self {
      polygon_limit,
      grid_resolution,
      iso_level,
      ids,
      scratch: None,
    }
  }

  pub fn ids(&self) -> &IdAllocator {
    &self.ids
  }

  /// Whether base field memory is still held.
  pub fn has_scratch(&self) -> bool {
    self.scratch.is_some()
  }
}

impl SplitStrategy for VoxelSplitter {
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "voxel::split"))]
  fn split(&mut self, root: &MeshObject, sink: &mut dyn ChunkSink) -> TilerResult<SplitStats> {
    let mut emitter = Emitter::new(sink, &self.ids);

    if fits_or_degenerate(root, self.polygon_limit) {
      debug!(faces = root.face_count(), "source within budget, emitting exact copy");
      emitter.emit_exact_copy(root)?;
      return Ok(emitter.finish());
    }

    let cells = self.grid_resolution.map(|r| r as usize);
    let scratch = self
      .scratch
      .insert(build_scratch(root, cells, self.iso_level));
    let ctx = NodeContext {
      scratch,
      polygon_limit: self.polygon_limit,
      iso_level: self.iso_level,
    };

    let region = ctx.scratch.air.region();
    let faces: Vec<u32> = (0..ctx.scratch.source.faces.len() as u32).collect();
    ctx.node(&mut emitter, region, cells, &faces, TileId::ROOT, 0)?;

    // Nothing survived resampling: keep the source reachable
    if emitter.stats.chunks == 0 {
      debug!("resampled surface is empty, emitting exact copy");
      emitter.emit_exact_copy(root)?;
    }

    let stats = emitter.finish();
    info!(
      chunks = stats.chunks,
      over_budget = stats.over_budget,
      max_level = stats.max_level,
      elapsed_us = stats.elapsed_us,
      "voxel split complete"
    );
    Ok(stats)
  }

  fn finish(&mut self) {
    self.scratch = None;
  }
}

// =============================================================================
// Base field
// =============================================================================

/// Source box padded by `iso + GRID_PADDING_CELLS` cells of the unpadded grid.
fn padded_region(bounds: &Aabb, cells: [usize; 3], iso_level: f32) -> Aabb {
  let size = bounds.size();
  let cell = (0..3)
    .map(|axis| size[axis] / cells[axis].max(1) as f32)
    .fold(0.0f32, f32::max);
  let pad = (iso_level + GRID_PADDING_CELLS) * cell;
  bounds.expanded(Vec3::splat(pad.max(f32::EPSILON)))
}

#[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "voxel::base_field"))]
fn build_scratch(root: &MeshObject, cells: [usize; 3], iso_level: f32) -> Scratch {
  let source = root.flattened();
  let region = padded_region(&source.bounding_box, cells, iso_level);

  let mut distance = ScalarGrid::new(region, cells, f32::MAX);
  let cell = distance.cell_length();
  let band = (iso_level + 1.0) * cell;
  let faces: Vec<u32> = (0..source.faces.len() as u32).collect();
  rasterize_distance(&source, &faces, &mut distance, band);

  let air = AirMask::flood(&distance, iso_level * cell);
  debug!(
    cells = ?cells,
    cell_size = cell,
    enclosed = air.enclosed_count(iso_level * cell),
    "base field ready"
  );

  let face_bounds = (0..source.faces.len())
    .map(|f| Aabb::from_points(source.triangle(f).iter()))
    .collect();

  Scratch {
    source,
    face_bounds,
    air,
  }
}

// =============================================================================
// Node recursion
// =============================================================================

struct NodeContext<'a> {
  scratch: &'a Scratch,
  polygon_limit: usize,
  iso_level: f32,
}

impl NodeContext<'_> {
  fn node(
    &self,
    emitter: &mut Emitter<'_>,
    region: Aabb,
    cells: [usize; 3],
    faces: &[u32],
    parent: TileId,
    level: u32,
  ) -> TilerResult<()> {
    let surface = self.extract(region, cells, faces);
    let face_count = surface.mesh.faces.len();
    let can_subdivide = cells.iter().all(|&c| c / 2 >= MIN_GRID_RESOLUTION);

    if face_count <= self.polygon_limit || !can_subdivide {
      if face_count == 0 {
        return Ok(());
      }
      let over_budget = face_count > self.polygon_limit;
      if over_budget {
        debug!(level, faces = face_count, "node at minimum resolution is over budget");
      }
      let bounds = surface.mesh.bounding_box;
      emitter.emit(surface.mesh, parent, level, true, bounds, over_budget)?;
      return Ok(());
    }

    let proxy = self.coarse_proxy(region, cells, faces);
    let proxy_faces = proxy.mesh.faces.len();
    let children_parent = if proxy_faces == 0 {
      parent
    } else {
      emitter.emit(
        proxy.mesh,
        parent,
        level,
        true,
        proxy.bounds,
        proxy_faces > self.polygon_limit,
      )?
    };
    debug!(level, faces = face_count, proxy_faces, "subdividing node");

    let child_cells = cells.map(|c| c / 2);
    let children: SmallVec<[(Aabb, Vec<u32>); 8]> = (0..8u8)
      .map(|octant| {
        let child_region = region.octant(octant);
        let reach = self.reach(child_region, child_cells);
        let child_faces: Vec<u32> = faces
          .iter()
          .copied()
          .filter(|&f| self.scratch.face_bounds[f as usize].intersects(&reach))
          .collect();
        (child_region, child_faces)
      })
      .filter(|(_, child_faces)| !child_faces.is_empty())
      .collect();

    for (child_region, child_faces) in children {
      self.node(
        emitter,
        child_region,
        child_cells,
        &child_faces,
        children_parent,
        level + 1,
      )?;
    }
    Ok(())
  }

  /// Surface at successively halved resolutions until within budget or at
  /// the minimum resolution.
  fn coarse_proxy(&self, region: Aabb, cells: [usize; 3], faces: &[u32]) -> NodeSurface {
    let mut proxy_cells = cells;
    loop {
      proxy_cells = proxy_cells.map(|c| (c / 2).max(MIN_GRID_RESOLUTION));
      let surface = self.extract(region, proxy_cells, faces);
      let at_minimum = proxy_cells.iter().all(|&c| c == MIN_GRID_RESOLUTION);
      if surface.mesh.faces.len() <= self.polygon_limit || at_minimum {
        return surface;
      }
    }
  }

  /// Region a node samples: `region` plus one cell toward the low side.
  fn sampling_region(region: Aabb, cells: [usize; 3]) -> (Aabb, Vec3) {
    let size = region.size();
    let cell = Vec3::new(
      size.x / cells[0] as f32,
      size.y / cells[1] as f32,
      size.z / cells[2] as f32,
    );
    (Aabb::new(region.min - cell, region.max), cell)
  }

  /// Everything within distance band of the node's samples.
  fn reach(&self, region: Aabb, cells: [usize; 3]) -> Aabb {
    let (sampling, cell) = Self::sampling_region(region, cells);
    sampling.expanded(Vec3::splat(self.band(cell.max_element())))
  }

  fn band(&self, cell_length: f32) -> f32 {
    (self.iso_level + 1.0) * cell_length
  }

  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "voxel::extract"))]
  fn extract(&self, region: Aabb, cells: [usize; 3], faces: &[u32]) -> NodeSurface {
    let (sampling, _) = Self::sampling_region(region, cells);
    let sampling_cells = cells.map(|c| c + 1);

    let mut distance = ScalarGrid::new(sampling, sampling_cells, f32::MAX);
    let cell = distance.cell_length();
    rasterize_distance(&self.scratch.source, faces, &mut distance, self.band(cell));

    let field = self.signed_field(&distance, self.iso_level * cell);
    let surface = surface_nets::extract_padded(&field);

    let vertex_error = surface
      .positions
      .iter()
      .map(|&p| distance.sample_trilinear(p))
      .fold(0.0f32, f32::max);
    let error = vertex_error.max(0.5 * distance.cell_diagonal()) as f64;

    let mut mesh = surface.into_mesh_object(self.scratch.source.name.clone());
    mesh.geometric_error = error;
    if let Some(material) = self.scratch.source.dominant_material(faces) {
      mesh.set_uniform_material(material);
    }
    NodeSurface {
      mesh,
      bounds: sampling,
    }
  }

  /// Offset the distance field by the iso value and flip enclosed samples.
  fn signed_field(&self, distance: &ScalarGrid, iso_offset: f32) -> ScalarGrid {
    let mut field = distance.clone();
    let dims = distance.dims();
    let slab_len = dims[1] * dims[2];
    let air = &self.scratch.air;

    field
      .values
      .par_chunks_mut(slab_len)
      .enumerate()
      .for_each(|(x, slab)| {
        for y in 0..dims[1] {
          for z in 0..dims[2] {
            let slot = &mut slab[y * dims[2] + z];
            let d = *slot;
            *slot = if d > iso_offset && !air.is_outside(distance.position(x, y, z)) {
              iso_offset - d
            } else {
              d - iso_offset
            };
          }
        }
      });
    field
  }
}

#[cfg(test)]
#[path = "voxel_test.rs"]
mod voxel_test;
