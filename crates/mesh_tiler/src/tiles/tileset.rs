//! The tileset document: asset header plus the tile tree.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bounds::BoundingVolume;
use super::tile::{Tile, TileRefine};
use crate::error::{TilerError, TilerResult};
use crate::id::TileId;

/// Version of the tiles format written into `asset.version`.
pub const TILESET_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetAsset {
  pub version: String,
}

impl Default for TilesetAsset {
  fn default() -> Self {
    Self {
      version: TILESET_VERSION.to_string(),
    }
  }
}

/// Hierarchical tileset rooted at [`TileId::ROOT`].
///
/// The tree is only ever grown by appending children to existing tiles, so a
/// parent always exists before its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
  pub asset: TilesetAsset,

  /// Mirrors the root tile's error.
  #[serde(rename = "geometricError")]
  pub geometric_error: f64,

  pub root: Tile,
}

impl Default for Tileset {
  fn default() -> Self {
    Self::new()
  }
}

impl Tileset {
  /// Empty tileset: a content-less root with `REPLACE` refinement.
  pub fn new() -> Self {
    let mut root = Tile::new(TileId::ROOT, 0.0, BoundingVolume::default());
    root.refine = Some(TileRefine::Replace);
    Self {
      asset: TilesetAsset::default(),
      geometric_error: 0.0,
      root,
    }
  }

  /// Depth-first lookup.
  pub fn find_tile_by_id(&mut self, id: TileId) -> Option<&mut Tile> {
    self.root.find_mut(id)
  }

  pub fn tile(&self, id: TileId) -> Option<&Tile> {
    self.root.find(id)
  }

  /// Append `tile` to the children of `parent_id`.
  pub fn attach_child(&mut self, parent_id: TileId, tile: Tile) -> TilerResult<()> {
    let chunk = tile.id;
    match self.find_tile_by_id(parent_id) {
      Some(parent) => {
        parent.children.push(tile);
        Ok(())
      }
      None => Err(TilerError::ParentNotFound {
        parent: parent_id,
        chunk,
      }),
    }
  }

  pub fn set_root_geometric_error(&mut self, value: f64) {
    self.root.geometric_error = value;
    self.geometric_error = value;
  }

  /// Set the root box to the union of its direct children's boxes.
  ///
  /// A root without children keeps its current box.
  pub fn compute_root_bounding_volume(&mut self) {
    let mut children = self.root.children.iter().map(|c| c.bounding_volume);
    if let Some(first) = children.next() {
      self.root.bounding_volume = children.fold(first, |acc, b| acc.union(&b));
    }
  }

  pub fn tile_count(&self) -> usize {
    self.root.count_tiles()
  }

  pub fn max_depth(&self) -> usize {
    self.root.max_depth()
  }

  /// Tiles whose box is not inside their parent's box.
  pub fn containment_violations(&self, epsilon: f64) -> Vec<TileId> {
    let mut violations = Vec::new();
    self.root.visit(&mut |parent, tile| {
      if let Some(parent) = parent {
        if !parent.bounding_volume.contains(&tile.bounding_volume, epsilon) {
          violations.push(tile.id);
        }
      }
    });
    violations
  }

  pub fn to_json(&self) -> TilerResult<serde_json::Value> {
    Ok(serde_json::to_value(self)?)
  }

  /// Pretty-printed document.
  pub fn to_json_string(&self) -> TilerResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  pub fn write(&self, path: impl AsRef<Path>) -> TilerResult<()> {
    let path = path.as_ref();
    std::fs::write(path, self.to_json_string()?)?;
    debug!(path = %path.display(), tiles = self.tile_count(), "tileset written");
    Ok(())
  }

  /// Parse a document. Tile ids are not stored, so they are reassigned
  /// depth-first with the root as [`TileId::ROOT`].
  pub fn from_json(json: &str) -> TilerResult<Self> {
    let mut tileset: Tileset = serde_json::from_str(json)?;
    let mut next = 0;
    tileset.root.renumber(&mut next);
    Ok(tileset)
  }

  pub fn load(path: impl AsRef<Path>) -> TilerResult<Self> {
    Self::from_json(&std::fs::read_to_string(path)?)
  }
}

#[cfg(test)]
#[path = "tileset_test.rs"]
mod tileset_test;
