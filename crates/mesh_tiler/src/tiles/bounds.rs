//! Box bounding volumes in the 3D Tiles layout.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::types::Aabb;

/// Oriented box: center followed by the three half-axis vectors.
///
/// ```text
/// [cx, cy, cz,  hx, 0, 0,  0, hy, 0,  0, 0, hz]
///  └ center ┘  └─ x ──┘  └─ y ──┘  └─ z ──┘
/// ```
///
/// Boxes built here are always axis aligned.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingVolume {
  #[serde(rename = "box")]
  pub data: [f64; 12],
}

impl BoundingVolume {
  pub fn from_center_half_extents(center: DVec3, half: DVec3) -> Self {
    #[rustfmt::skip]
    let data = [
      center.x, center.y, center.z,
      half.x, 0.0, 0.0,
      0.0, half.y, 0.0,
      0.0, 0.0, half.z,
    ];
    Self { data }
  }

  /// Axis-aligned box around `aabb`. An empty box gives the zero volume.
  pub fn from_aabb(aabb: &Aabb) -> Self {
    if !aabb.is_valid() {
      return Self::default();
    }
    Self::from_center_half_extents(aabb.center().as_dvec3(), aabb.half_extents().as_dvec3())
  }

  pub fn center(&self) -> DVec3 {
    DVec3::new(self.data[0], self.data[1], self.data[2])
  }

  /// Extent along each world axis, summed over the three half-axes.
  pub fn half_extents(&self) -> DVec3 {
    let axis = |i: usize| DVec3::new(self.data[i], self.data[i + 1], self.data[i + 2]).abs();
    axis(3) + axis(6) + axis(9)
  }

  pub fn min(&self) -> DVec3 {
    self.center() - self.half_extents()
  }

  pub fn max(&self) -> DVec3 {
    self.center() + self.half_extents()
  }

  /// World-axis-aligned box enclosing this volume.
  pub fn to_aabb(&self) -> Aabb {
    Aabb::new(self.min().as_vec3(), self.max().as_vec3())
  }

  /// Smallest axis-aligned volume enclosing both.
  pub fn union(&self, other: &Self) -> Self {
    let min = self.min().min(other.min());
    let max = self.max().max(other.max());
    Self::from_center_half_extents((min + max) * 0.5, (max - min) * 0.5)
  }

  /// Whether `other` lies inside this volume, allowing `epsilon` slack.
  pub fn contains(&self, other: &Self, epsilon: f64) -> bool {
    (other.min() + DVec3::splat(epsilon)).cmpge(self.min()).all()
      && (other.max() - DVec3::splat(epsilon)).cmple(self.max()).all()
  }

  /// Length of the box diagonal.
  pub fn diagonal(&self) -> f64 {
    self.half_extents().length() * 2.0
  }
}

impl From<Aabb> for BoundingVolume {
  fn from(aabb: Aabb) -> Self {
    Self::from_aabb(&aabb)
  }
}

impl From<&BoundingVolume> for Aabb {
  fn from(volume: &BoundingVolume) -> Self {
    volume.to_aabb()
  }
}

#[cfg(test)]
mod tests {
  use glam::Vec3;

  use super::*;

  #[test]
  fn test_from_aabb_layout() {
    let volume = BoundingVolume::from_aabb(&Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0)));
    assert_eq!(
      volume.data,
      [1.0, 2.0, 3.0, 1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 3.0]
    );
  }

  #[test]
  fn test_empty_aabb_gives_zero_volume() {
    assert_eq!(BoundingVolume::from_aabb(&Aabb::empty()).data, [0.0; 12]);
  }

  #[test]
  fn test_min_max_and_aabb_round_trip() {
    let aabb = Aabb::new(Vec3::new(-1.0, 2.0, -3.0), Vec3::new(1.0, 5.0, 0.5));
    let volume = BoundingVolume::from(aabb);
    assert_eq!(volume.min(), DVec3::new(-1.0, 2.0, -3.0));
    assert_eq!(volume.max(), DVec3::new(1.0, 5.0, 0.5));
    assert_eq!(volume.to_aabb(), aabb);
  }

  #[test]
  fn test_negative_half_axes_are_absolute() {
    let mut volume = BoundingVolume::from_center_half_extents(DVec3::ZERO, DVec3::ONE);
    volume.data[3] = -1.0;
    assert_eq!(volume.half_extents(), DVec3::ONE);
  }

  #[test]
  fn test_union_and_contains() {
    let a = BoundingVolume::from_aabb(&Aabb::new(Vec3::ZERO, Vec3::ONE));
    let b = BoundingVolume::from_aabb(&Aabb::new(Vec3::splat(2.0), Vec3::splat(3.0)));
    let both = a.union(&b);

    assert_eq!(both.min(), DVec3::ZERO);
    assert_eq!(both.max(), DVec3::splat(3.0));
    assert!(both.contains(&a, 0.0));
    assert!(both.contains(&b, 0.0));
    assert!(!a.contains(&both, 1e-3));
  }

  #[test]
  fn test_serializes_as_box() {
    let volume = BoundingVolume::from_aabb(&Aabb::new(Vec3::ZERO, Vec3::splat(2.0)));
    let json = serde_json::to_value(volume).unwrap();
    assert_eq!(json["box"].as_array().unwrap().len(), 12);
    assert_eq!(json["box"][0], 1.0);
  }
}
