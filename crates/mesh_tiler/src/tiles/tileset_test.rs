use glam::Vec3;

use super::*;
use crate::types::Aabb;

fn boxed(min: f32, max: f32) -> BoundingVolume {
  BoundingVolume::from_aabb(&Aabb::new(Vec3::splat(min), Vec3::splat(max)))
}

fn child(id: u64, min: f32, max: f32) -> Tile {
  Tile::new(TileId::new(id), 0.5, boxed(min, max)).with_content(format!("level_0/m_{id}.obj"))
}

#[test]
fn test_new_tileset() {
  let tileset = Tileset::new();
  assert_eq!(tileset.asset.version, "1.0");
  assert_eq!(tileset.root.id, TileId::ROOT);
  assert_eq!(tileset.root.refine, Some(TileRefine::Replace));
  assert_eq!(tileset.tile_count(), 1);
}

#[test]
fn test_attach_and_find() {
  let mut tileset = Tileset::new();
  tileset.attach_child(TileId::ROOT, child(1, 0.0, 1.0)).unwrap();
  tileset.attach_child(TileId::new(1), child(2, 0.0, 0.5)).unwrap();

  assert_eq!(tileset.tile_count(), 3);
  assert_eq!(tileset.max_depth(), 3);
  let found = tileset.find_tile_by_id(TileId::new(2)).unwrap();
  assert_eq!(found.content_uri(), Some("level_0/m_2.obj"));
}

#[test]
fn test_attach_to_missing_parent() {
  let mut tileset = Tileset::new();
  let err = tileset.attach_child(TileId::new(42), child(7, 0.0, 1.0)).unwrap_err();
  assert!(matches!(
    err,
    TilerError::ParentNotFound { parent, chunk } if parent == TileId::new(42) && chunk == TileId::new(7)
  ));
  assert_eq!(tileset.tile_count(), 1);
}

#[test]
fn test_root_error_mirrors_top_level() {
  let mut tileset = Tileset::new();
  tileset.set_root_geometric_error(12.5);
  assert_eq!(tileset.root.geometric_error, 12.5);
  assert_eq!(tileset.geometric_error, 12.5);
}

#[test]
fn test_root_box_is_union_of_children() {
  let mut tileset = Tileset::new();
  tileset.attach_child(TileId::ROOT, child(1, 0.0, 1.0)).unwrap();
  tileset.attach_child(TileId::ROOT, child(2, 3.0, 5.0)).unwrap();
  tileset.compute_root_bounding_volume();

  let root = tileset.root.bounding_volume;
  assert_eq!(root.min(), glam::DVec3::ZERO);
  assert_eq!(root.max(), glam::DVec3::splat(5.0));
  assert!(tileset.containment_violations(0.0).is_empty());
}

#[test]
fn test_root_box_without_children_unchanged() {
  let mut tileset = Tileset::new();
  tileset.compute_root_bounding_volume();
  assert_eq!(tileset.root.bounding_volume, BoundingVolume::default());
}

#[test]
fn test_containment_violations_reported() {
  let mut tileset = Tileset::new();
  tileset.attach_child(TileId::ROOT, child(1, 0.0, 1.0)).unwrap();
  tileset.attach_child(TileId::new(1), child(2, 0.5, 2.0)).unwrap();
  tileset.attach_child(TileId::new(1), child(3, 0.25, 0.75)).unwrap();
  tileset.compute_root_bounding_volume();

  assert_eq!(tileset.containment_violations(1e-6), vec![TileId::new(2)]);
  assert!(tileset.containment_violations(1.5).is_empty());
}

#[test]
fn test_json_document_shape() {
  let mut tileset = Tileset::new();
  tileset.attach_child(TileId::ROOT, child(1, 0.0, 2.0)).unwrap();
  tileset.set_root_geometric_error(0.5);
  tileset.compute_root_bounding_volume();

  let json = tileset.to_json().unwrap();
  assert_eq!(json["asset"]["version"], "1.0");
  assert_eq!(json["geometricError"], 0.5);
  assert_eq!(json["root"]["refine"], "REPLACE");
  assert_eq!(json["root"]["geometricError"], 0.5);
  assert!(json["root"].get("content").is_none());
  assert_eq!(json["root"]["boundingVolume"]["box"][0], 1.0);
  assert_eq!(json["root"]["children"][0]["content"]["uri"], "level_0/m_1.obj");
  let leaf_children = json["root"]["children"][0]["children"].as_array().unwrap();
  assert!(leaf_children.is_empty());
}

#[test]
fn test_pretty_string_parses_back() {
  let mut tileset = Tileset::new();
  tileset.attach_child(TileId::ROOT, child(5, 0.0, 1.0)).unwrap();
  tileset.attach_child(TileId::new(5), child(9, 0.0, 0.5)).unwrap();
  tileset.attach_child(TileId::ROOT, child(7, 1.0, 2.0)).unwrap();

  let text = tileset.to_json_string().unwrap();
  assert!(text.contains('\n'));

  let parsed = Tileset::from_json(&text).unwrap();
  assert_eq!(parsed.tile_count(), 4);
  // Ids come back in depth-first order
  let ids: Vec<u64> = parsed.root.children.iter().map(|t| t.id.raw()).collect();
  assert_eq!(ids, vec![1, 3]);
  assert_eq!(parsed.root.children[0].children[0].id, TileId::new(2));
  assert_eq!(parsed.root.children[1].content_uri(), Some("level_0/m_7.obj"));
}

#[test]
fn test_write_and_load() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("tileset.json");

  let mut tileset = Tileset::new();
  tileset.attach_child(TileId::ROOT, child(1, 0.0, 1.0)).unwrap();
  tileset.write(&path).unwrap();

  let loaded = Tileset::load(&path).unwrap();
  assert_eq!(loaded.tile_count(), 2);
  assert_eq!(loaded.asset.version, TILESET_VERSION);
}

#[test]
fn test_malformed_json_is_error() {
  assert!(matches!(Tileset::from_json("{ not json"), Err(TilerError::Json(_))));
}
