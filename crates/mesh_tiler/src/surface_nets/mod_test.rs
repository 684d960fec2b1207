use std::collections::HashMap;

use glam::Vec3;

use super::*;

fn sphere_grid(cells: usize, radius: f32) -> ScalarGrid {
  sphere_field(Aabb::new(Vec3::splat(-2.0), Vec3::splat(2.0)), [cells; 3], radius)
}

fn sphere_field(region: Aabb, cells: [usize; 3], radius: f32) -> ScalarGrid {
  let mut grid = ScalarGrid::new(region, cells, 0.0);
  let dims = grid.dims();
  for x in 0..dims[0] {
    for y in 0..dims[1] {
      for z in 0..dims[2] {
        let idx = grid.index(x, y, z);
        grid.values[idx] = grid.position(x, y, z).length() - radius;
      }
    }
  }
  grid
}

fn face_normal(mesh: &SurfaceMesh, tri: &[u32]) -> Vec3 {
  let p = |i: u32| mesh.positions[i as usize];
  (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]))
}

#[test]
fn test_homogeneous_field_is_empty() {
  let air = ScalarGrid::new(Aabb::new(Vec3::ZERO, Vec3::ONE), [8; 3], 1.0);
  assert!(extract(&air).is_empty());

  let solid = ScalarGrid::new(Aabb::new(Vec3::ZERO, Vec3::ONE), [8; 3], -1.0);
  let mesh = extract(&solid);
  assert!(mesh.is_empty());
  assert!(mesh.positions.is_empty());
}

#[test]
fn test_sphere_vertices_near_radius() {
  let grid = sphere_grid(16, 1.2);
  let mesh = extract(&grid);
  assert!(mesh.triangle_count() > 50);

  let tolerance = grid.cell_diagonal();
  for p in &mesh.positions {
    assert!((p.length() - 1.2).abs() < tolerance, "vertex {:?} off surface", p);
  }
}

#[test]
fn test_sphere_is_closed() {
  let mesh = extract(&sphere_grid(12, 1.0));

  let mut edges: HashMap<(u32, u32), i32> = HashMap::new();
  for tri in mesh.indices.chunks_exact(3) {
    for k in 0..3 {
      let (a, b) = (tri[k], tri[(k + 1) % 3]);
      // +1 for a->b, -1 for b->a: consistent winding cancels out
      let key = (a.min(b), a.max(b));
      *edges.entry(key).or_default() += if a < b { 1 } else { -1 };
    }
  }
  assert!(edges.values().all(|&balance| balance == 0));
}

#[test]
fn test_sphere_faces_point_outward() {
  let mesh = extract(&sphere_grid(12, 1.0));
  for tri in mesh.indices.chunks_exact(3) {
    let centroid = tri.iter().map(|&i| mesh.positions[i as usize]).sum::<Vec3>() / 3.0;
    assert!(face_normal(&mesh, tri).dot(centroid) > -1e-6);
  }
  for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
    assert!(n.dot(*p) > 0.0);
  }
}

#[test]
fn test_bounds_cover_vertices() {
  let mesh = extract(&sphere_grid(10, 1.0));
  for p in &mesh.positions {
    assert!(mesh.bounds.contains(&Aabb::new(*p, *p), 0.0));
  }
  assert!(mesh.bounds.max.x < 1.5 && mesh.bounds.min.x > -1.5);
}

#[test]
fn test_into_mesh_object() {
  let surface = extract(&sphere_grid(8, 1.0));
  let faces = surface.triangle_count();
  let vertices = surface.positions.len();
  let mesh = surface.into_mesh_object("blob");

  assert_eq!(mesh.name, "blob");
  assert_eq!(mesh.faces.len(), faces);
  assert_eq!(mesh.positions.len(), vertices);
  assert!(mesh.has_normals());
  assert!(mesh.is_indexed());
  assert_eq!(mesh.bounding_box, mesh.bounding_box());
}

#[test]
fn test_plane_faces_toward_air() {
  // Solid for x < 0.5, air above
  let mut grid = ScalarGrid::new(Aabb::new(Vec3::ZERO, Vec3::ONE), [4; 3], 0.0);
  let dims = grid.dims();
  for x in 0..dims[0] {
    for y in 0..dims[1] {
      for z in 0..dims[2] {
        let idx = grid.index(x, y, z);
        grid.values[idx] = grid.position(x, y, z).x - 0.6;
      }
    }
  }

  let mesh = extract(&grid);
  assert!(!mesh.is_empty());
  for tri in mesh.indices.chunks_exact(3) {
    assert!(face_normal(&mesh, tri).x > 0.0);
  }
  for p in &mesh.positions {
    assert!((p.x - 0.6).abs() < 1e-5);
  }
}

/// Triangle keyed by its sorted, quantized corner positions.
fn triangle_keys(mesh: &SurfaceMesh) -> Vec<[[i64; 3]; 3]> {
  mesh
    .indices
    .chunks_exact(3)
    .map(|tri| {
      let mut key = [0, 1, 2].map(|k| {
        let p = mesh.positions[tri[k] as usize] * 1e4;
        [p.x.round() as i64, p.y.round() as i64, p.z.round() as i64]
      });
      key.sort();
      key
    })
    .collect()
}

#[test]
fn test_padded_halves_stitch_without_overlap() {
  // 16 cells of 0.25 over [-2, 2], each grid extended one cell toward min
  let cell = 0.25;
  let low = Vec3::splat(-2.0 - cell);
  let whole = sphere_field(Aabb::new(low, Vec3::splat(2.0)), [17; 3], 1.3);
  let left = sphere_field(Aabb::new(low, Vec3::new(0.0, 2.0, 2.0)), [9, 17, 17], 1.3);
  let right = sphere_field(
    Aabb::new(Vec3::new(-cell, low.y, low.z), Vec3::splat(2.0)),
    [9, 17, 17],
    1.3,
  );

  let whole = extract_padded(&whole);
  let left = extract_padded(&left);
  let right = extract_padded(&right);
  assert_eq!(
    left.triangle_count() + right.triangle_count(),
    whole.triangle_count()
  );

  let left_keys: std::collections::HashSet<_> = triangle_keys(&left).into_iter().collect();
  let shared = triangle_keys(&right)
    .iter()
    .filter(|key| left_keys.contains(*key))
    .count();
  assert_eq!(shared, 0);
}

#[test]
fn test_padding_layer_keeps_only_referenced_vertices() {
  let region = Aabb::new(Vec3::splat(-2.25), Vec3::splat(2.0));
  let mesh = extract_padded(&sphere_field(region, [17; 3], 1.3));
  assert!(!mesh.is_empty());

  let mut used = vec![false; mesh.positions.len()];
  for &i in &mesh.indices {
    used[i as usize] = true;
  }
  assert!(used.iter().all(|&u| u));
  assert_eq!(mesh.bounds, Aabb::from_points(&mesh.positions));
}
