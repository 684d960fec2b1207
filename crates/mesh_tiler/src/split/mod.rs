//! Split strategies: turn one mesh into a stream of chunks.
//!
//! ```text
//! ┌──────────────┐   split(root, sink)   ┌─────────────────────┐
//! │  MeshObject  │ ────────────────────► │  Splitter           │
//! └──────────────┘                       │   Voxel | Regular   │
//!                                        └─────────┬───────────┘
//!                                                  │ Chunk (pre-order)
//!                                                  ▼
//!                                        ┌─────────────────────┐
//!                                        │  ChunkSink          │
//!                                        │   closure | channel │
//!                                        │   | TilesetBuilder  │
//!                                        └─────────────────────┘
//! ```
//!
//! Every chunk is reported before any of its descendants, and its id is
//! allocated right before the sink call. A sink error aborts the split and is
//! returned unchanged.

mod channel;
mod regular;
mod voxel;

pub use channel::ChannelSink;
pub use regular::RegularSplitter;
pub use voxel::VoxelSplitter;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::constants::{DEFAULT_GRID_RESOLUTION, DEFAULT_ISO_LEVEL, DEFAULT_POLYGON_LIMIT};
use crate::error::{TilerError, TilerResult};
use crate::id::{IdAllocator, TileId};
use crate::types::{Aabb, MeshObject};

// =============================================================================
// Chunks and sinks
// =============================================================================

/// One partial mesh produced by a split.
#[derive(Clone, Debug)]
pub struct Chunk {
  pub mesh: MeshObject,

  /// Id of the tile this chunk becomes.
  pub target_id: TileId,

  /// Tile this chunk refines. [`TileId::ROOT`] for top-level chunks.
  pub parent_id: TileId,

  /// Recursion depth. Direct children of the root are level 0.
  pub level: u32,

  /// Whether the exporter should write shared vertices.
  pub indexed_geometry: bool,

  /// Volume the chunk's geometry is guaranteed to lie in.
  pub bounds: Aabb,

  /// Leaf that could not be brought under the polygon limit.
  pub over_budget: bool,
}

/// Receives chunks as a split produces them.
pub trait ChunkSink {
  fn on_chunk(&mut self, chunk: Chunk) -> TilerResult<()>;
}

impl<F> ChunkSink for F
where
  F: FnMut(Chunk) -> TilerResult<()>,
{
  fn on_chunk(&mut self, chunk: Chunk) -> TilerResult<()> {
    self(chunk)
  }
}

// =============================================================================
// Strategy contract
// =============================================================================

/// Counters reported by a finished split.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplitStats {
  pub chunks: usize,
  pub faces_emitted: usize,
  pub over_budget: usize,
  pub max_level: u32,
  pub elapsed_us: u64,
}

/// A way of partitioning a mesh into chunks.
pub trait SplitStrategy {
  /// Partition `root`, reporting every chunk to `sink` in pre-order.
  fn split(&mut self, root: &MeshObject, sink: &mut dyn ChunkSink) -> TilerResult<SplitStats>;

  /// Release scratch memory. Safe to call repeatedly.
  fn finish(&mut self);
}

/// Shared chunk reporting: id allocation, counters, timing.
pub(crate) struct Emitter<'a> {
  sink: &'a mut dyn ChunkSink,
  ids: &'a IdAllocator,
  stats: SplitStats,
  start: Instant,
}

impl<'a> Emitter<'a> {
  pub(crate) fn new(sink: &'a mut dyn ChunkSink, ids: &'a IdAllocator) -> Self {
    Self {
      sink,
      ids,
      stats: SplitStats::default(),
      start: Instant::now(),
    }
  }

  /// Allocate an id and hand the chunk to the sink.
  pub(crate) fn emit(
    &mut self,
    mesh: MeshObject,
    parent_id: TileId,
    level: u32,
    indexed_geometry: bool,
    bounds: Aabb,
    over_budget: bool,
  ) -> TilerResult<TileId> {
    let target_id = self.ids.next();
    self.stats.chunks += 1;
    self.stats.faces_emitted += mesh.face_count();
    self.stats.max_level = self.stats.max_level.max(level);
    if over_budget {
      self.stats.over_budget += 1;
    }

    self.sink.on_chunk(Chunk {
      mesh,
      target_id,
      parent_id,
      level,
      indexed_geometry,
      bounds,
      over_budget,
    })?;
    Ok(target_id)
  }

  /// Report the whole source as one exact chunk (error 0).
  pub(crate) fn emit_exact_copy(&mut self, root: &MeshObject) -> TilerResult<TileId> {
    let mut mesh = root.flattened();
    mesh.geometric_error = 0.0;
    let bounds = mesh.bounding_box;
    let indexed = mesh.is_indexed();
    self.emit(mesh, TileId::ROOT, 0, indexed, bounds, false)
  }

  pub(crate) fn finish(mut self) -> SplitStats {
    self.stats.elapsed_us = self.start.elapsed().as_micros() as u64;
    self.stats
  }
}

/// True when the source needs no partitioning at all.
pub(crate) fn fits_or_degenerate(root: &MeshObject, polygon_limit: usize) -> bool {
  let faces = root.face_count();
  faces == 0 || faces <= polygon_limit || root.bounding_box().is_point()
}

// =============================================================================
// Configuration
// =============================================================================

/// Available split strategies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitterKind {
  /// Resample into a voxel field and re-extract per octree node.
  #[default]
  Voxel,
  /// Partition the original faces without altering them.
  Regular,
}

impl FromStr for SplitterKind {
  type Err = TilerError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "voxel" => Ok(Self::Voxel),
      "regular" => Ok(Self::Regular),
      other => Err(TilerError::config(format!(
        "unknown algorithm '{other}' (expected 'voxel' or 'regular')"
      ))),
    }
  }
}

impl fmt::Display for SplitterKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Voxel => "voxel",
      Self::Regular => "regular",
    })
  }
}

/// Parameters of a split.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
  pub algorithm: SplitterKind,

  /// Maximum triangles per chunk.
  pub polygon_limit: usize,

  /// Voxel cells per axis of the root node (voxel only).
  pub grid_resolution: [u32; 3],

  /// Offset of the resampled surface from the source, in cells (voxel only).
  pub iso_level: f32,
}

impl Default for SplitConfig {
  fn default() -> Self {
    Self {
      algorithm: SplitterKind::default(),
      polygon_limit: DEFAULT_POLYGON_LIMIT,
      grid_resolution: [DEFAULT_GRID_RESOLUTION; 3],
      iso_level: DEFAULT_ISO_LEVEL,
    }
  }
}

impl SplitConfig {
  /// Reject values no strategy can run with.
  pub fn validate(&self) -> TilerResult<()> {
    if self.polygon_limit == 0 {
      return Err(TilerError::config("polygon limit must be positive"));
    }
    if self.algorithm == SplitterKind::Voxel {
      if self.grid_resolution.iter().any(|&r| r == 0) {
        return Err(TilerError::config(format!(
          "grid resolution must be positive on every axis, got {:?}",
          self.grid_resolution
        )));
      }
      if !self.iso_level.is_finite() || self.iso_level <= 0.0 {
        return Err(TilerError::config(format!(
          "iso level must be a positive finite number, got {}",
          self.iso_level
        )));
      }
    }
    Ok(())
  }
}

// =============================================================================
// Closed strategy set
// =============================================================================

/// The strategy selected by [`SplitConfig::algorithm`].
pub enum Splitter {
  Voxel(VoxelSplitter),
  Regular(RegularSplitter),
}

impl Splitter {
  /// Validate `config` and build the matching strategy around `ids`.
  pub fn new(config: &SplitConfig, ids: IdAllocator) -> TilerResult<Self> {
    config.validate()?;
    Ok(match config.algorithm {
      SplitterKind::Voxel => Self::Voxel(VoxelSplitter::new(
        config.polygon_limit,
        config.grid_resolution,
        config.iso_level,
        ids,
      )),
      SplitterKind::Regular => Self::Regular(RegularSplitter::new(config.polygon_limit, ids)),
    })
  }

  pub fn kind(&self) -> SplitterKind {
    match self {
      Self::Voxel(_) => SplitterKind::Voxel,
      Self::Regular(_) => SplitterKind::Regular,
    }
  }

  /// Ids handed out so far.
  pub fn ids(&self) -> &IdAllocator {
    match self {
      Self::Voxel(s) => s.ids(),
      Self::Regular(s) => s.ids(),
    }
  }
}

impl SplitStrategy for Splitter {
  fn split(&mut self, root: &MeshObject, sink: &mut dyn ChunkSink) -> TilerResult<SplitStats> {
    match self {
      Self::Voxel(s) => s.split(root, sink),
      Self::Regular(s) => s.split(root, sink),
    }
  }

  fn finish(&mut self) {
    match self {
      Self::Voxel(s) => s.finish(),
      Self::Regular(s) => s.finish(),
    }
  }
}
