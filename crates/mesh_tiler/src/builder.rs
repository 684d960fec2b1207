//! Chunk sink that exports geometry and grows the tileset.
//!
//! ```text
//! Chunk ──► exporter.export(out/level_N, <name>_<counter>) ──► file name
//!       └─► Tile { error, box, content: level_N/<file> } ──► attach under parent
//! ```
//!
//! The root error is the sum of the errors of the chunks attached directly to
//! the root; the root box is the union of their boxes. Both are filled in by
//! [`TilesetBuilder::finish`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::TilerResult;
use crate::id::TileId;
use crate::split::{Chunk, ChunkSink};
use crate::tiles::{BoundingVolume, Tile, Tileset};
use crate::types::MeshObject;

/// Relative slack, per unit of root diagonal, when checking containment.
const CONTAINMENT_TOLERANCE: f64 = 1e-5;

/// Writes one chunk's geometry to disk (or elsewhere).
pub trait ChunkExporter {
  /// File extension of written chunks, without the dot.
  fn extension(&self) -> &str;

  /// Write `mesh` into `directory` and return the file name used.
  fn export(
    &mut self,
    directory: &Path,
    base_name: &str,
    mesh: &MeshObject,
    indexed: bool,
  ) -> TilerResult<String>;
}

/// What to do when a chunk fails to export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFailurePolicy {
  /// Return the error and stop the split.
  #[default]
  Abort,
  /// Drop the chunk and every later chunk below it.
  SkipChunk,
}

/// Builds a [`Tileset`] from a stream of chunks.
pub struct TilesetBuilder<E> {
  output_dir: PathBuf,
  exporter: E,
  policy: ExportFailurePolicy,
  tileset: Tileset,
  counter: usize,
  root_error: f64,
  skipped: HashSet<TileId>,
}

impl<E: ChunkExporter> TilesetBuilder<E> {
  pub fn new(output_dir: impl Into<PathBuf>, exporter: E) -> Self {
    Self {
      output_dir: output_dir.into(),
      exporter,
      policy: ExportFailurePolicy::default(),
      tileset: Tileset::new(),
      counter: 0,
      root_error: 0.0,
      skipped: HashSet::new(),
    }
  }

  pub fn with_policy(mut self, policy: ExportFailurePolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn exporter(&self) -> &E {
    &self.exporter
  }

  /// Tree built so far (root error and box not yet final).
  pub fn tileset(&self) -> &Tileset {
    &self.tileset
  }

  /// Running sum of errors of chunks attached to the root.
  pub fn root_error(&self) -> f64 {
    self.root_error
  }

  /// Chunks dropped by [`ExportFailurePolicy::SkipChunk`].
  pub fn skipped_count(&self) -> usize {
    self.skipped.len()
  }

  /// Set the root error and box, then hand out the tileset.
  pub fn finish(mut self) -> Tileset {
    self.tileset.set_root_geometric_error(self.root_error);
    self.tileset.compute_root_bounding_volume();

    let epsilon = CONTAINMENT_TOLERANCE * self.tileset.root.bounding_volume.diagonal().max(1.0);
    for id in self.tileset.containment_violations(epsilon) {
      warn!(tile = %id, "tile box escapes its parent");
    }

    info!(
      tiles = self.tileset.tile_count(),
      depth = self.tileset.max_depth(),
      root_error = self.root_error,
      skipped = self.skipped.len(),
      "tileset assembled"
    );
    self.tileset
  }
}

impl<E: ChunkExporter> ChunkSink for TilesetBuilder<E> {
  fn on_chunk(&mut self, chunk: Chunk) -> TilerResult<()> {
    if self.skipped.contains(&chunk.parent_id) {
      warn!(chunk = %chunk.target_id, parent = %chunk.parent_id, "dropping chunk below a skipped tile");
      self.skipped.insert(chunk.target_id);
      return Ok(());
    }

    let level_dir = format!("level_{}", chunk.level);
    let directory = self.output_dir.join(&level_dir);
    let name = if chunk.mesh.name.is_empty() {
      "mesh"
    } else {
      chunk.mesh.name.as_str()
    };
    let base_name = format!("{name}_{}", self.counter);
    self.counter += 1;

    let file_name =
      match self
        .exporter
        .export(&directory, &base_name, &chunk.mesh, chunk.indexed_geometry)
      {
        Ok(file_name) => file_name,
        Err(err) if self.policy == ExportFailurePolicy::SkipChunk => {
          warn!(chunk = %chunk.target_id, error = %err, "export failed, skipping chunk");
          self.skipped.insert(chunk.target_id);
          return Ok(());
        }
        Err(err) => return Err(err),
      };

    let error = chunk.mesh.geometric_error;
    let tile = Tile::new(chunk.target_id, error, BoundingVolume::from_aabb(&chunk.bounds))
      .with_content(format!("{level_dir}/{file_name}"));
    self.tileset.attach_child(chunk.parent_id, tile)?;

    if chunk.parent_id.is_root() {
      self.root_error += error;
    }
    debug!(
      chunk = %chunk.target_id,
      parent = %chunk.parent_id,
      level = chunk.level,
      faces = chunk.mesh.face_count(),
      error,
      "chunk attached"
    );
    Ok(())
  }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;
