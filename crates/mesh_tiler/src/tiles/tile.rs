//! Tile nodes of the tileset tree.

use serde::{Deserialize, Serialize};

use super::bounds::BoundingVolume;
use crate::id::TileId;

/// How children relate to their parent's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TileRefine {
  /// Children replace the parent when refined.
  #[default]
  Replace,
  /// Children are drawn in addition to the parent.
  Add,
}

/// Reference to a tile's geometry file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileContent {
  /// Path relative to the tileset document.
  pub uri: String,
}

/// A node of the tileset tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
  /// Identity within one build. Not part of the document.
  #[serde(skip)]
  pub id: TileId,

  #[serde(rename = "boundingVolume")]
  pub bounding_volume: BoundingVolume,

  #[serde(rename = "geometricError")]
  pub geometric_error: f64,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub refine: Option<TileRefine>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content: Option<TileContent>,

  /// Written on every node, empty for leaves.
  #[serde(default)]
  pub children: Vec<Tile>,
}

impl Tile {
  pub fn new(id: TileId, geometric_error: f64, bounding_volume: BoundingVolume) -> Self {
    Self {
      id,
      bounding_volume,
      geometric_error,
      refine: None,
      content: None,
      children: Vec::new(),
    }
  }

  pub fn with_content(mut self, uri: impl Into<String>) -> Self {
    self.content = Some(TileContent { uri: uri.into() });
    self
  }

  pub fn content_uri(&self) -> Option<&str> {
    self.content.as_ref().map(|c| c.uri.as_str())
  }

  /// Depth-first search of this subtree.
  pub fn find_mut(&mut self, id: TileId) -> Option<&mut Tile> {
    if self.id == id {
      return Some(self);
    }
    self.children.iter_mut().find_map(|child| child.find_mut(id))
  }

  pub fn find(&self, id: TileId) -> Option<&Tile> {
    if self.id == id {
      return Some(self);
    }
    self.children.iter().find_map(|child| child.find(id))
  }

  /// Tiles in this subtree, including this one.
  pub fn count_tiles(&self) -> usize {
    1 + self.children.iter().map(|c| c.count_tiles()).sum::<usize>()
  }

  /// Levels in this subtree (1 for a leaf).
  pub fn max_depth(&self) -> usize {
    1 + self.children.iter().map(|c| c.max_depth()).max().unwrap_or(0)
  }

  /// Visit every tile depth-first, parents before children.
  pub fn visit<'a>(&'a self, f: &mut impl FnMut(Option<&'a Tile>, &'a Tile)) {
    self.visit_inner(None, f);
  }

  fn visit_inner<'a>(&'a self, parent: Option<&'a Tile>, f: &mut impl FnMut(Option<&'a Tile>, &'a Tile)) {
    f(parent, self);
    for child in &self.children {
      child.visit_inner(Some(self), f);
    }
  }

  /// Renumber the subtree depth-first starting at `next`.
  pub(crate) fn renumber(&mut self, next: &mut u64) {
    self.id = TileId::new(*next);
    *next += 1;
    for child in &mut self.children {
      child.renumber(next);
    }
  }
}
