use glam::Vec3;

use super::*;
use crate::error::TilerError;
use crate::fixtures::{self, MemoryExporter};
use crate::id::IdAllocator;
use crate::split::{RegularSplitter, SplitStrategy, VoxelSplitter};
use crate::types::Aabb;

fn chunk(id: u64, parent: u64, level: u32, error: f64, min: f32, max: f32) -> Chunk {
  let mut mesh = fixtures::single_triangle();
  mesh.name = "part".to_string();
  mesh.geometric_error = error;
  Chunk {
    mesh,
    target_id: TileId::new(id),
    parent_id: TileId::new(parent),
    level,
    indexed_geometry: false,
    bounds: Aabb::new(Vec3::splat(min), Vec3::splat(max)),
    over_budget: false,
  }
}

#[test]
fn test_paths_and_names() {
  let mut builder = TilesetBuilder::new("/out", MemoryExporter::new());
  builder.on_chunk(chunk(1, 0, 0, 1.0, 0.0, 4.0)).unwrap();
  builder.on_chunk(chunk(2, 1, 1, 0.5, 0.0, 2.0)).unwrap();

  let records = &builder.exporter().records;
  assert_eq!(records[0].directory, Path::new("/out/level_0"));
  assert_eq!(records[0].file_name, "part_0.mem");
  assert_eq!(records[1].directory, Path::new("/out/level_1"));
  assert_eq!(records[1].file_name, "part_1.mem");

  let tileset = builder.finish();
  let child = &tileset.root.children[0];
  assert_eq!(child.content_uri(), Some("level_0/part_0.mem"));
  assert_eq!(child.children[0].content_uri(), Some("level_1/part_1.mem"));
}

#[test]
fn test_root_error_sums_direct_children() {
  let mut builder = TilesetBuilder::new("out", MemoryExporter::new());
  builder.on_chunk(chunk(1, 0, 0, 1.5, 0.0, 1.0)).unwrap();
  builder.on_chunk(chunk(2, 0, 0, 2.0, 1.0, 2.0)).unwrap();
  builder.on_chunk(chunk(3, 1, 1, 7.0, 0.0, 0.5)).unwrap();
  assert_eq!(builder.root_error(), 3.5);

  let tileset = builder.finish();
  assert_eq!(tileset.root.geometric_error, 3.5);
  assert_eq!(tileset.geometric_error, 3.5);
  assert_eq!(tileset.root.bounding_volume.min(), glam::DVec3::ZERO);
  assert_eq!(tileset.root.bounding_volume.max(), glam::DVec3::splat(2.0));
}

#[test]
fn test_unknown_parent_is_fatal() {
  let mut builder = TilesetBuilder::new("out", MemoryExporter::new());
  let err = builder.on_chunk(chunk(5, 4, 1, 1.0, 0.0, 1.0)).unwrap_err();
  assert!(matches!(err, TilerError::ParentNotFound { .. }));
}

#[test]
fn test_export_failure_aborts_by_default() {
  let mut builder = TilesetBuilder::new("out", MemoryExporter::failing_on(&["part_0"]));
  let err = builder.on_chunk(chunk(1, 0, 0, 1.0, 0.0, 1.0)).unwrap_err();
  assert!(matches!(err, TilerError::Export { .. }));
  assert_eq!(builder.tileset().tile_count(), 1);
}

#[test]
fn test_skip_policy_drops_subtree() {
  let mut builder = TilesetBuilder::new("out", MemoryExporter::failing_on(&["part_1"]))
    .with_policy(ExportFailurePolicy::SkipChunk);

  builder.on_chunk(chunk(1, 0, 0, 1.0, 0.0, 4.0)).unwrap();
  builder.on_chunk(chunk(2, 1, 1, 0.5, 0.0, 2.0)).unwrap(); // fails
  builder.on_chunk(chunk(3, 2, 2, 0.2, 0.0, 1.0)).unwrap(); // below skipped
  builder.on_chunk(chunk(4, 1, 1, 0.5, 2.0, 4.0)).unwrap();

  assert_eq!(builder.skipped_count(), 2);
  let tileset = builder.finish();
  assert_eq!(tileset.tile_count(), 3);
  assert!(tileset.tile(TileId::new(3)).is_none());
  assert!(tileset.tile(TileId::new(4)).is_some());
}

#[test]
fn test_unnamed_mesh_gets_placeholder() {
  let mut builder = TilesetBuilder::new("out", MemoryExporter::new());
  let mut unnamed = chunk(1, 0, 0, 0.0, 0.0, 1.0);
  unnamed.mesh.name.clear();
  builder.on_chunk(unnamed).unwrap();
  assert_eq!(builder.exporter().records[0].file_name, "mesh_0.mem");
}

#[test]
fn test_regular_split_into_builder() {
  let mesh = fixtures::plane_grid(50, 10.0);
  let mut splitter = RegularSplitter::new(2048, IdAllocator::new());
  let mut builder = TilesetBuilder::new("out", MemoryExporter::new());
  let stats = splitter.split(&mesh, &mut builder).unwrap();
  let exported: usize = builder.exporter().records.iter().map(|r| r.faces).sum();
  let tileset = builder.finish();

  assert_eq!(exported, 5000);
  assert_eq!(tileset.tile_count(), stats.chunks + 1);
  assert_eq!(tileset.max_depth(), 2);
  let sum: f64 = tileset.root.children.iter().map(|t| t.geometric_error).sum();
  assert!((tileset.root.geometric_error - sum).abs() < 1e-12);
  assert!(tileset.containment_violations(1e-6).is_empty());
}

#[test]
fn test_voxel_split_into_builder() {
  let mesh = fixtures::icosphere(3, 1.0);
  let mut splitter = VoxelSplitter::new(200, [16; 3], 1.0, IdAllocator::new());
  let mut builder = TilesetBuilder::new("out", MemoryExporter::new());
  splitter.split(&mesh, &mut builder).unwrap();
  splitter.finish();

  assert!(builder.exporter().records.iter().all(|r| r.indexed));
  let tileset = builder.finish();
  assert!(tileset.max_depth() >= 3);
  assert!(tileset.root.geometric_error > 0.0);
  assert!(tileset.containment_violations(1e-4).is_empty());
}
