//! Core geometry types: bounding boxes and mesh/group objects.

use glam::{Vec2, Vec3};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
  pub min: Vec3,
  pub max: Vec3,
}

impl Aabb {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: Vec3::splat(f32::INFINITY),
      max: Vec3::splat(f32::NEG_INFINITY),
    }
  }

  /// Create AABB from min/max corners.
  pub fn new(min: Vec3, max: Vec3) -> Self {
    Self { min, max }
  }

  /// Smallest box containing all points (empty for no points).
  pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
    let mut aabb = Self::empty();
    for p in points {
      aabb.encapsulate(*p);
    }
    aabb
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: Vec3) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  /// Smallest box containing both boxes. Empty boxes are neutral.
  pub fn union(&self, other: &Aabb) -> Self {
    Self {
      min: self.min.min(other.min),
      max: self.max.max(other.max),
    }
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
  }

  #[inline]
  pub fn center(&self) -> Vec3 {
    (self.min + self.max) * 0.5
  }

  /// Get the size of the AABB (max - min).
  #[inline]
  pub fn size(&self) -> Vec3 {
    self.max - self.min
  }

  #[inline]
  pub fn half_extents(&self) -> Vec3 {
    self.size() * 0.5
  }

  /// Length of the space diagonal (0 for invalid boxes).
  pub fn diagonal(&self) -> f32 {
    if self.is_valid() {
      self.size().length()
    } else {
      0.0
    }
  }

  /// True when the box has zero extent along every axis.
  pub fn is_point(&self) -> bool {
    self.is_valid() && self.size().max_element() <= 0.0
  }

  /// Box grown by `margin` on every side.
  pub fn expanded(&self, margin: Vec3) -> Self {
    Self {
      min: self.min - margin,
      max: self.max + margin,
    }
  }

  /// Check if this AABB overlaps with another (touching counts).
  #[inline]
  pub fn intersects(&self, other: &Aabb) -> bool {
    self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
  }

  /// Check if `other` lies inside this box, allowing `epsilon` slack.
  pub fn contains(&self, other: &Aabb, epsilon: f32) -> bool {
    (other.min + Vec3::splat(epsilon)).cmpge(self.min).all()
      && (other.max - Vec3::splat(epsilon)).cmple(self.max).all()
  }

  /// Sub-box for one octant.
  ///
  /// Octant: 0-7 where bits represent upper halves:
  /// - bit 0: X
  /// - bit 1: Y
  /// - bit 2: Z
  pub fn octant(&self, octant: u8) -> Self {
    let center = self.center();
    let mut min = self.min;
    let mut max = center;
    for axis in 0..3 {
      if (octant >> axis) & 1 == 1 {
        min[axis] = center[axis];
        max[axis] = self.max[axis];
      }
    }
    Self { min, max }
  }

  /// Octant of this box that owns `point` (upper half on ties).
  pub fn octant_of(&self, point: Vec3) -> u8 {
    let center = self.center();
    let mut octant = 0u8;
    for axis in 0..3 {
      if point[axis] >= center[axis] {
        octant |= 1 << axis;
      }
    }
    octant
  }
}

impl Default for Aabb {
  fn default() -> Self {
    Self::empty()
  }
}

/// A named node of geometry.
///
/// Vertex attributes are parallel arrays: `normals` and `uvs` are either empty
/// or exactly as long as `positions`. Faces index into this object's own
/// vertices; children carry their own vertex arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshObject {
  pub name: String,

  pub positions: Vec<Vec3>,

  pub normals: Vec<Vec3>,

  pub uvs: Vec<Vec2>,

  /// Triangles as vertex index triples.
  pub faces: Vec<[u32; 3]>,

  /// Material names referenced by `face_materials`.
  pub materials: Vec<String>,

  /// Index into `materials` per face, `None` where a face has no material.
  /// Empty when no face of this object carries one.
  pub face_materials: Vec<Option<u32>>,

  /// Nested groups.
  pub children: Vec<MeshObject>,

  /// Cached by [`MeshObject::compute_bounding_box`].
  pub bounding_box: Aabb,

  /// Deviation from the source geometry this object replaces.
  /// 0 for exact copies, positive for resampled geometry.
  pub geometric_error: f64,
}

impl MeshObject {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Default::default()
    }
  }

  pub fn has_normals(&self) -> bool {
    !self.normals.is_empty() && self.normals.len() == self.positions.len()
  }

  pub fn has_uvs(&self) -> bool {
    !self.uvs.is_empty() && self.uvs.len() == self.positions.len()
  }

  pub fn has_materials(&self) -> bool {
    !self.face_materials.is_empty() && self.face_materials.len() == self.faces.len()
  }

  /// True if any face in the subtree carries a material.
  pub fn uses_materials(&self) -> bool {
    self.face_materials.iter().any(Option::is_some)
      || self.children.iter().any(|c| c.uses_materials())
  }

  /// Material name of one face.
  pub fn face_material(&self, face: usize) -> Option<&str> {
    if !self.has_materials() {
      return None;
    }
    self.face_materials[face].map(|m| self.materials[m as usize].as_str())
  }

  /// Index of `name` in `materials`, appending it if new.
  pub fn intern_material(&mut self, name: &str) -> u32 {
    match self.materials.iter().position(|m| m == name) {
      Some(index) => index as u32,
      None => {
        self.materials.push(name.to_owned());
        (self.materials.len() - 1) as u32
      }
    }
  }

  /// Assign one material to every face.
  pub fn set_uniform_material(&mut self, name: &str) {
    self.materials = vec![name.to_owned()];
    self.face_materials = vec![Some(0); self.faces.len()];
  }

  /// Most frequent material among the listed faces (first seen wins ties).
  pub fn dominant_material(&self, faces: &[u32]) -> Option<&str> {
    if !self.has_materials() {
      return None;
    }
    let mut counts = vec![0usize; self.materials.len()];
    for &face in faces {
      if let Some(m) = self.face_materials[face as usize] {
        counts[m as usize] += 1;
      }
    }
    let (index, &count) = counts
      .iter()
      .enumerate()
      .rev()
      .max_by_key(|&(_, count)| *count)?;
    (count > 0).then(|| self.materials[index].as_str())
  }

  /// Number of triangles including all descendants.
  pub fn face_count(&self) -> usize {
    self.faces.len() + self.children.iter().map(|c| c.face_count()).sum::<usize>()
  }

  /// Number of vertices including all descendants.
  pub fn vertex_count(&self) -> usize {
    self.positions.len() + self.children.iter().map(|c| c.vertex_count()).sum::<usize>()
  }

  /// True if no faces exist anywhere in the subtree.
  pub fn is_empty(&self) -> bool {
    self.face_count() == 0
  }

  /// Bounding box over the vertices referenced by faces, including children.
  ///
  /// Unreferenced vertices are ignored so stray points do not inflate
  /// bounds.
  pub fn bounding_box(&self) -> Aabb {
    let mut aabb = Aabb::empty();
    for face in &self.faces {
      for &i in face {
        aabb.encapsulate(self.positions[i as usize]);
      }
    }
    self
      .children
      .iter()
      .fold(aabb, |acc, child| acc.union(&child.bounding_box()))
  }

  /// Compute and cache the bounding box.
  pub fn compute_bounding_box(&mut self) -> Aabb {
    self.bounding_box = self.bounding_box();
    self.bounding_box
  }

  /// Corner positions of one face.
  #[inline]
  pub fn triangle(&self, face: usize) -> [Vec3; 3] {
    let [a, b, c] = self.faces[face];
    [
      self.positions[a as usize],
      self.positions[b as usize],
      self.positions[c as usize],
    ]
  }

  /// Centroid of one face.
  #[inline]
  pub fn face_centroid(&self, face: usize) -> Vec3 {
    let [a, b, c] = self.triangle(face);
    (a + b + c) / 3.0
  }

  /// True when some vertex is shared by more than one face.
  pub fn is_indexed(&self) -> bool {
    let mut used = vec![false; self.positions.len()];
    for face in &self.faces {
      for &i in face {
        let slot = &mut used[i as usize];
        if *slot {
          return true;
        }
        *slot = true;
      }
    }
    self.children.iter().any(|c| c.is_indexed())
  }

  /// Merge this object and all descendants into one childless object.
  ///
  /// Attributes missing on some parts are dropped for the whole result so the
  /// parallel arrays stay aligned.
  pub fn flattened(&self) -> MeshObject {
    let mut parts = Vec::new();
    self.collect_parts(&mut parts);

    let keep_normals = parts.iter().all(|p| p.has_normals() || p.positions.is_empty());
    let keep_uvs = parts.iter().all(|p| p.has_uvs() || p.positions.is_empty());
    let keep_materials = parts.iter().any(|p| p.has_materials());

    let mut out = MeshObject::new(self.name.clone());
    out.geometric_error = self.geometric_error;
    for part in parts {
      let base = out.positions.len() as u32;
      out.positions.extend_from_slice(&part.positions);
      if keep_normals {
        out.normals.extend_from_slice(&part.normals);
      }
      if keep_uvs {
        out.uvs.extend_from_slice(&part.uvs);
      }
      out
        .faces
        .extend(part.faces.iter().map(|f| [f[0] + base, f[1] + base, f[2] + base]));
      if keep_materials {
        for face in 0..part.faces.len() {
          let material = part.face_material(face).map(|name| out.intern_material(name));
          out.face_materials.push(material);
        }
      }
    }
    if out.positions.is_empty() {
      out.normals.clear();
      out.uvs.clear();
    }
    out.compute_bounding_box();
    out
  }

  fn collect_parts<'a>(&'a self, parts: &mut Vec<&'a MeshObject>) {
    parts.push(self);
    for child in &self.children {
      child.collect_parts(parts);
    }
  }

  /// New childless object holding only the listed faces.
  ///
  /// Vertices are compacted in first-use order and attributes are carried
  /// over. Only the materials the listed faces use are kept.
  pub fn extract_faces(&self, name: impl Into<String>, faces: &[u32]) -> MeshObject {
    let mut remap = vec![u32::MAX; self.positions.len()];
    let mut out = MeshObject::new(name);
    let normals = self.has_normals();
    let uvs = self.has_uvs();
    let materials = self.has_materials();

    for &face in faces {
      if materials {
        let material = self
          .face_material(face as usize)
          .map(|name| out.intern_material(name));
        out.face_materials.push(material);
      }
      let src = self.faces[face as usize];
      let mut dst = [0u32; 3];
      for (slot, &v) in dst.iter_mut().zip(src.iter()) {
        let v = v as usize;
        if remap[v] == u32::MAX {
          remap[v] = out.positions.len() as u32;
          out.positions.push(self.positions[v]);
          if normals {
            out.normals.push(self.normals[v]);
          }
          if uvs {
            out.uvs.push(self.uvs[v]);
          }
        }
        *slot = remap[v];
      }
      out.faces.push(dst);
    }
    out.compute_bounding_box();
    out
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
