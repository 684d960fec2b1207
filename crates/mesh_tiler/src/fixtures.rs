//! Deterministic meshes and recording sinks for tests and benchmarks.
//!
//! Shapes are chosen so their face counts are known in advance:
//!
//! | fixture                  | faces            |
//! |--------------------------|------------------|
//! | `single_triangle()`      | 1                |
//! | `cube(size)`             | 12               |
//! | `plane_grid(n, size)`    | `2·n²`           |
//! | `icosphere(k, radius)`   | `20·4^k`         |

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};

use crate::builder::ChunkExporter;
use crate::error::{TilerError, TilerResult};
use crate::split::{Chunk, ChunkSink};
use crate::types::MeshObject;

// =============================================================================
// Meshes
// =============================================================================

pub fn single_triangle() -> MeshObject {
  let mut mesh = MeshObject::new("triangle");
  mesh.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
  mesh.faces = vec![[0, 1, 2]];
  mesh.compute_bounding_box();
  mesh
}

/// Closed axis-aligned cube centered on the origin, outward winding.
pub fn cube(size: f32) -> MeshObject {
  let h = size * 0.5;
  let mut mesh = MeshObject::new("cube");
  mesh.positions = (0..8)
    .map(|c| {
      Vec3::new(
        if c & 1 == 1 { h } else { -h },
        if c & 2 == 2 { h } else { -h },
        if c & 4 == 4 { h } else { -h },
      )
    })
    .collect();
  #[rustfmt::skip]
  let faces = vec![
    [0, 2, 1], [1, 2, 3], // -Z
    [4, 5, 6], [5, 7, 6], // +Z
    [0, 1, 4], [1, 5, 4], // -Y
    [2, 6, 3], [3, 6, 7], // +Y
    [0, 4, 2], [2, 4, 6], // -X
    [1, 3, 5], [3, 7, 5], // +X
  ];
  mesh.faces = faces;
  mesh.compute_bounding_box();
  mesh
}

/// Flat `n × n` quad grid in the XY plane spanning `[0, size]²`, with normals
/// and UVs.
pub fn plane_grid(n: u32, size: f32) -> MeshObject {
  let mut mesh = MeshObject::new("plane");
  let step = size / n as f32;
  for y in 0..=n {
    for x in 0..=n {
      mesh.positions.push(Vec3::new(x as f32 * step, y as f32 * step, 0.0));
      mesh.normals.push(Vec3::Z);
      mesh.uvs.push(Vec2::new(x as f32 / n as f32, y as f32 / n as f32));
    }
  }
  let row = n + 1;
  for y in 0..n {
    for x in 0..n {
      let i = y * row + x;
      mesh.faces.push([i, i + 1, i + row + 1]);
      mesh.faces.push([i, i + row + 1, i + row]);
    }
  }
  mesh.compute_bounding_box();
  mesh
}

/// Subdivided icosahedron projected onto a sphere at the origin.
pub fn icosphere(subdivisions: u32, radius: f32) -> MeshObject {
  let t = (1.0 + 5.0f32.sqrt()) / 2.0;
  let mut positions: Vec<Vec3> = [
    [-1.0, t, 0.0],
    [1.0, t, 0.0],
    [-1.0, -t, 0.0],
    [1.0, -t, 0.0],
    [0.0, -1.0, t],
    [0.0, 1.0, t],
    [0.0, -1.0, -t],
    [0.0, 1.0, -t],
    [t, 0.0, -1.0],
    [t, 0.0, 1.0],
    [-t, 0.0, -1.0],
    [-t, 0.0, 1.0],
  ]
  .iter()
  .map(|&p| Vec3::from_array(p).normalize())
  .collect();

  #[rustfmt::skip]
  let mut faces: Vec<[u32; 3]> = vec![
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
  ];

  for _ in 0..subdivisions {
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
      *midpoints.entry((a.min(b), a.max(b))).or_insert_with(|| {
        let p = ((positions[a as usize] + positions[b as usize]) * 0.5).normalize();
        positions.push(p);
        positions.len() as u32 - 1
      })
    };

    let mut next = Vec::with_capacity(faces.len() * 4);
    for [a, b, c] in faces {
      let ab = midpoint(a, b, &mut positions);
      let bc = midpoint(b, c, &mut positions);
      let ca = midpoint(c, a, &mut positions);
      next.extend_from_slice(&[[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
    }
    faces = next;
  }

  let mut mesh = MeshObject::new("sphere");
  mesh.normals = positions.clone();
  mesh.positions = positions.into_iter().map(|p| p * radius).collect();
  mesh.faces = faces;
  mesh.compute_bounding_box();
  mesh
}

/// Group node holding `parts` as children and no geometry of its own.
pub fn group(name: &str, parts: Vec<MeshObject>) -> MeshObject {
  let mut root = MeshObject::new(name);
  root.children = parts;
  root.compute_bounding_box();
  root
}

// =============================================================================
// Sinks and exporters
// =============================================================================

/// Sink that stores every chunk, optionally failing on the n-th call.
#[derive(Default)]
pub struct RecordingSink {
  pub chunks: Vec<Chunk>,
  pub fail_at: Option<usize>,
}

impl RecordingSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn failing_at(index: usize) -> Self {
    Self {
      chunks: Vec::new(),
      fail_at: Some(index),
    }
  }
}

impl ChunkSink for RecordingSink {
  fn on_chunk(&mut self, chunk: Chunk) -> TilerResult<()> {
    if self.fail_at == Some(self.chunks.len()) {
      return Err(TilerError::config(format!("sink rejected chunk {}", chunk.target_id)));
    }
    self.chunks.push(chunk);
    Ok(())
  }
}

/// One call recorded by [`MemoryExporter`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExportRecord {
  pub directory: PathBuf,
  pub file_name: String,
  pub faces: usize,
  pub indexed: bool,
}

/// Exporter that writes nothing and remembers what it was asked to write.
#[derive(Default)]
pub struct MemoryExporter {
  pub records: Vec<ExportRecord>,
  /// Base names that fail with an I/O error.
  pub fail_names: HashSet<String>,
}

impl MemoryExporter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn failing_on(names: &[&str]) -> Self {
    Self {
      records: Vec::new(),
      fail_names: names.iter().map(|n| n.to_string()).collect(),
    }
  }
}

impl ChunkExporter for MemoryExporter {
  fn extension(&self) -> &str {
    "mem"
  }

  fn export(
    &mut self,
    directory: &Path,
    base_name: &str,
    mesh: &MeshObject,
    indexed: bool,
  ) -> TilerResult<String> {
    let file_name = format!("{base_name}.{}", self.extension());
    if self.fail_names.contains(base_name) {
      return Err(TilerError::Export {
        path: directory.join(&file_name),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "refused"),
      });
    }
    self.records.push(ExportRecord {
      directory: directory.to_path_buf(),
      file_name: file_name.clone(),
      faces: mesh.face_count(),
      indexed,
    });
    Ok(file_name)
  }
}
