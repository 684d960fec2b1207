//! Cube corner/edge topology and the corner-mask → edge-mask lookup table.
//!
//! ```text
//!       6──────7         Corners (bit i of the index = offset on axis i):
//!      /│     /│           0=(0,0,0)  1=(1,0,0)  2=(0,1,0)  3=(1,1,0)
//!     4─┼────5 │           4=(0,0,1)  5=(1,0,1)  6=(0,1,1)  7=(1,1,1)
//!     │ 2────┼─3
//!     │/     │/          +Y
//!     0──────1            │  +Z
//!                         │ /
//!                         └───+X
//! ```
//!
//! Edges 0, 1 and 2 leave corner 0 along X, Y and Z. Triangulation only
//! inspects those three; every other edge is edge 0/1/2 of a neighboring cell.

/// Endpoints of the 12 cube edges, sorted by first corner.
#[rustfmt::skip]
pub const EDGE_CORNERS: [[usize; 2]; 12] = [
  [0, 1], [0, 2], [0, 4],
  [1, 3], [1, 5], [2, 3],
  [2, 6], [3, 7], [4, 5],
  [4, 6], [5, 7], [6, 7],
];

/// Solid-corner mask → mask of edges whose endpoints disagree.
pub const EDGE_TABLE: [u16; 256] = build_edge_table();

const fn build_edge_table() -> [u16; 256] {
  let mut table = [0u16; 256];
  let mut mask = 0;
  while mask < 256 {
    let mut edge = 0;
    while edge < 12 {
      let [a, b] = EDGE_CORNERS[edge];
      if ((mask >> a) ^ (mask >> b)) & 1 == 1 {
        table[mask] |= 1 << edge;
      }
      edge += 1;
    }
    mask += 1;
  }
  table
}

/// Sample-space offset of a cube corner.
#[inline(always)]
pub const fn corner_offset(corner: usize) -> [usize; 3] {
  [corner & 1, (corner >> 1) & 1, (corner >> 2) & 1]
}

#[cfg(test)]
#[path = "edge_table_test.rs"]
mod edge_table_test;
