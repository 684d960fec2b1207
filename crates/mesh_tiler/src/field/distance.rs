//! Point to triangle queries.

use glam::Vec3;

/// Closest point on triangle `abc` to `p`.
///
/// Voronoi-region walk (Ericson, Real-Time Collision Detection 5.1.5).
/// Degenerate triangles fall back to the nearest vertex/edge region.
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
  let ab = b - a;
  let ac = c - a;
  let ap = p - a;

  let d1 = ab.dot(ap);
  let d2 = ac.dot(ap);
  if d1 <= 0.0 && d2 <= 0.0 {
    return a;
  }

  let bp = p - b;
  let d3 = ab.dot(bp);
  let d4 = ac.dot(bp);
  if d3 >= 0.0 && d4 <= d3 {
    return b;
  }

  let vc = d1 * d4 - d3 * d2;
  if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
    return a + ab * (d1 / (d1 - d3));
  }

  let cp = p - c;
  let d5 = ab.dot(cp);
  let d6 = ac.dot(cp);
  if d6 >= 0.0 && d5 <= d6 {
    return c;
  }

  let vb = d5 * d2 - d1 * d6;
  if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
    return a + ac * (d2 / (d2 - d6));
  }

  let va = d3 * d6 - d5 * d4;
  if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
    let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
    return b + (c - b) * w;
  }

  let sum = va + vb + vc;
  if sum.abs() <= f32::EPSILON {
    return a;
  }
  let v = vb / sum;
  let w = vc / sum;
  a + ab * v + ac * w
}

/// Unsigned distance from `p` to triangle `abc`.
#[inline]
pub fn point_triangle_distance(p: Vec3, [a, b, c]: [Vec3; 3]) -> f32 {
  p.distance(closest_point_on_triangle(p, a, b, c))
}
