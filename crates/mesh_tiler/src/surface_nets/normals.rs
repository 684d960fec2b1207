//! Vertex normals from triangle geometry.

use glam::Vec3;

/// Angle-weighted vertex normals ("mean weighted by angle", Thürmer and
/// Wüthrich 1998).
///
/// Each face contributes its unit normal scaled by the interior angle at the
/// vertex. Degenerate faces are skipped. Vertices without a usable face get
/// `+Y`.
pub fn from_geometry(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
  let mut normals = vec![Vec3::ZERO; positions.len()];

  for tri in indices.chunks_exact(3) {
    let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
    let (p0, p1, p2) = (positions[i0], positions[i1], positions[i2]);

    let e01 = p1 - p0;
    let e02 = p2 - p0;
    let e12 = p2 - p1;

    let face_normal = e01.cross(e02);
    let len_sq = face_normal.length_squared();
    if len_sq < 1e-12 {
      continue;
    }
    let unit = face_normal * len_sq.sqrt().recip();

    normals[i0] += unit * vertex_angle(e01, e02);
    normals[i1] += unit * vertex_angle(-e01, e12);
    normals[i2] += unit * vertex_angle(-e02, -e12);
  }

  for n in &mut normals {
    *n = n.try_normalize().unwrap_or(Vec3::Y);
  }
  normals
}

/// Angle between two edge vectors in radians, 0 if either is degenerate.
#[inline]
fn vertex_angle(e1: Vec3, e2: Vec3) -> f32 {
  let len1_sq = e1.length_squared();
  let len2_sq = e2.length_squared();
  if len1_sq < 1e-12 || len2_sq < 1e-12 {
    return 0.0;
  }
  let cos_angle = e1.dot(e2) / (len1_sq.sqrt() * len2_sq.sqrt());
  cos_angle.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_single_triangle_faces_up() {
    let normals = from_geometry(&[Vec3::ZERO, Vec3::X, Vec3::Y], &[0, 1, 2]);
    for n in normals {
      assert!((n - Vec3::Z).length() < 1e-6);
    }
  }

  #[test]
  fn test_degenerate_triangle_falls_back() {
    let normals = from_geometry(&[Vec3::ZERO, Vec3::X, Vec3::X * 2.0], &[0, 1, 2]);
    assert!(normals.iter().all(|&n| n == Vec3::Y));
  }

  #[test]
  fn test_angle_weighting_on_folded_quad() {
    // Two faces sharing edge 0-1, one in the XY plane and one in the XZ plane
    let positions = [Vec3::ZERO, Vec3::X, Vec3::Y, -Vec3::Z];
    let normals = from_geometry(&positions, &[0, 1, 2, 0, 1, 3]);
    let shared = normals[0];
    assert!((shared.length() - 1.0).abs() < 1e-5);
    // Equal 90 degree angles at vertex 0 => bisector of +Z and +Y
    let expected = Vec3::new(0.0, 1.0, 1.0).normalize();
    assert!((shared - expected).length() < 1e-5, "{:?}", shared);
  }

  #[test]
  fn test_angle_helper() {
    assert!((vertex_angle(Vec3::X, Vec3::Y) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    assert_eq!(vertex_angle(Vec3::ZERO, Vec3::Y), 0.0);
  }
}
