//! Naive Surface Nets over a [`ScalarGrid`].
//!
//! One vertex per cell whose corners change sign, placed at the centroid of
//! the edge crossings. Every sign-changing grid edge produces one quad joining
//! the four cells around it.
//!
//! ```text
//! Pass 1: Geometry
//!   for each cell (x, y, z):
//!     corner mask from the 8 samples (bit set = negative = solid)
//!     skip mask 0 / 255
//!     vertex = cell origin + centroid of edge crossings
//!     quads for edges 0, 1, 2 (the ones leaving corner 0)
//!
//! Pass 2: Normals
//!   angle-weighted average of incident face normals
//! ```
//!
//! Quads are split along the shorter diagonal. Winding follows the sign of
//! corner 0 so front faces point from solid toward air.
//!
//! Edges on the low boundary planes of the grid have fewer than four adjacent
//! cells and produce no quad. Callers that stitch neighboring grids extend
//! each grid one cell toward its low side and use [`extract_padded`]: that
//! first layer only lends vertices to the quads of the real cells.
//!
//! ```text
//!   neighbor ──┐ ┌── this grid
//!         ... │p│ 1 │ 2 │ ...      p = padding cell, also the neighbor's last
//!              ▲                  cell; its edges along the split axis belong
//!              quads across this   to the neighbor
//!              plane are emitted here
//! ```

mod corner_mask;
mod normals;
mod vertex_calc;

use glam::Vec3;

use crate::edge_table::EDGE_TABLE;
use crate::field::ScalarGrid;
use crate::types::{Aabb, MeshObject};

/// Triangle soup with shared vertices produced by [`extract`].
#[derive(Clone, Debug, Default)]
pub struct SurfaceMesh {
  pub positions: Vec<Vec3>,
  pub normals: Vec<Vec3>,
  /// Triangle list, 3 indices per face.
  pub indices: Vec<u32>,
  pub bounds: Aabb,
}

impl SurfaceMesh {
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  pub fn is_empty(&self) -> bool {
    self.indices.is_empty()
  }

  /// Convert into a childless [`MeshObject`].
  pub fn into_mesh_object(self, name: impl Into<String>) -> MeshObject {
    let mut mesh = MeshObject::new(name);
    mesh.faces = self
      .indices
      .chunks_exact(3)
      .map(|t| [t[0], t[1], t[2]])
      .collect();
    mesh.positions = self.positions;
    mesh.normals = self.normals;
    mesh.bounding_box = self.bounds;
    mesh
  }
}

/// Vertex index per cell, -1 where the cell holds no vertex.
struct IndexBuffer {
  data: Vec<i32>,
  cells: [usize; 3],
}

impl IndexBuffer {
  fn new(cells: [usize; 3]) -> Self {
    Self {
      data: vec![-1; cells[0] * cells[1] * cells[2]],
      cells,
    }
  }

  #[inline]
  fn slot(&self, x: usize, y: usize, z: usize) -> usize {
    (x * self.cells[1] + y) * self.cells[2] + z
  }

  #[inline]
  fn get(&self, x: usize, y: usize, z: usize) -> i32 {
    self.data[self.slot(x, y, z)]
  }

  #[inline]
  fn set(&mut self, x: usize, y: usize, z: usize, value: i32) {
    let slot = self.slot(x, y, z);
    self.data[slot] = value;
  }
}

/// Extract the zero level set of `grid` (negative = solid).
pub fn extract(grid: &ScalarGrid) -> SurfaceMesh {
  extract_cells(grid, false)
}

/// Like [`extract`], but the first cell layer on every axis is shared with
/// the neighboring grid: edges running through it along their own axis emit
/// nothing here.
pub fn extract_padded(grid: &ScalarGrid) -> SurfaceMesh {
  extract_cells(grid, true)
}

#[cfg_attr(
  feature = "instrument",
  tracing::instrument(skip_all, name = "surface_nets::extract")
)]
fn extract_cells(grid: &ScalarGrid, padded: bool) -> SurfaceMesh {
  let mut output = SurfaceMesh::default();
  let mut index_buffer = IndexBuffer::new(grid.cells);

  // =========================================================================
  // Pass 1: Geometry
  // =========================================================================
  for x in 0..grid.cells[0] {
    for y in 0..grid.cells[1] {
      for z in 0..grid.cells[2] {
        process_cell(grid, [x, y, z], padded, &mut index_buffer, &mut output);
      }
    }
  }

  drop_unreferenced(&mut output);

  // =========================================================================
  // Pass 2: Normals
  // =========================================================================
  output.normals = normals::from_geometry(&output.positions, &output.indices);

  output
}

fn process_cell(
  grid: &ScalarGrid,
  pos: [usize; 3],
  padded: bool,
  index_buffer: &mut IndexBuffer,
  output: &mut SurfaceMesh,
) {
  let [x, y, z] = pos;
  let samples: [f32; 8] = std::array::from_fn(|corner| {
    let [ox, oy, oz] = crate::edge_table::corner_offset(corner);
    grid.get(x + ox, y + oy, z + oz)
  });

  let corner_mask = corner_mask::build(&samples);
  if corner_mask == 0 || corner_mask == 255 {
    return;
  }

  let local = vertex_calc::centroid_of_crossings(&samples);
  let position = grid.position(x, y, z) + local * grid.cell_size;

  let vertex_index = output.positions.len() as i32;
  index_buffer.set(x, y, z, vertex_index);
  output.positions.push(position);

  let edge_mask = EDGE_TABLE[corner_mask as usize];
  emit_triangles(pos, edge_mask, corner_mask, padded, index_buffer, output);
}

/// Compact away vertices no triangle uses (cells whose quads all belong to
/// a neighbor) and recompute the bounds.
fn drop_unreferenced(output: &mut SurfaceMesh) {
  let mut remap = vec![u32::MAX; output.positions.len()];
  let mut positions = Vec::with_capacity(output.positions.len());
  for index in output.indices.iter_mut() {
    let slot = &mut remap[*index as usize];
    if *slot == u32::MAX {
      *slot = positions.len() as u32;
      positions.push(output.positions[*index as usize]);
    }
    *index = *slot;
  }
  output.bounds = Aabb::from_points(&positions);
  output.positions = positions;
}

/// Emit the quads of edges 0, 1, 2 of a cell.
///
/// The other three cells sharing each edge precede this one in iteration
/// order, so their vertices already exist.
fn emit_triangles(
  pos: [usize; 3],
  edge_mask: u16,
  corner_mask: u8,
  padded: bool,
  index_buffer: &IndexBuffer,
  output: &mut SurfaceMesh,
) {
  let flip = (corner_mask & 1) == 0;

  for axis in 0..3 {
    if (edge_mask & (1 << axis)) == 0 || (padded && pos[axis] == 0) {
      continue;
    }

    let u = (axis + 1) % 3;
    let v = (axis + 2) % 3;
    if pos[u] == 0 || pos[v] == 0 {
      continue;
    }

    let mut pos_b = pos;
    pos_b[u] -= 1;
    pos_b[v] -= 1;
    let mut pos_c = pos;
    pos_c[u] -= 1;
    let mut pos_d = pos;
    pos_d[v] -= 1;

    let v_a = index_buffer.get(pos[0], pos[1], pos[2]);
    let v_b = index_buffer.get(pos_b[0], pos_b[1], pos_b[2]);
    let v_c = index_buffer.get(pos_c[0], pos_c[1], pos_c[2]);
    let v_d = index_buffer.get(pos_d[0], pos_d[1], pos_d[2]);
    if v_a < 0 || v_b < 0 || v_c < 0 || v_d < 0 {
      continue;
    }
    let [a, b, c, d] = [v_a, v_b, v_c, v_d].map(|i| i as u32);

    let p = |i: u32| output.positions[i as usize];
    let diag_ab = p(a).distance_squared(p(b));
    let diag_cd = p(c).distance_squared(p(d));

    let quad = match (diag_ab < diag_cd, flip) {
      (true, true) => [a, d, b, a, b, c],
      (true, false) => [a, b, d, a, c, b],
      (false, true) => [c, d, b, c, a, d],
      (false, false) => [c, b, d, c, d, a],
    };
    output.indices.extend_from_slice(&quad);
  }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
