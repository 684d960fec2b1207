//! Wavefront OBJ ingestion.
//!
//! ```text
//! v/vt/vn pools are global to the file.  o/g open a new child object.
//!
//!   f 1/1/1 2/2/2 3/3/3 4/4/4   ──fan──►   [1 2 3] [1 3 4]
//!
//! Each object keeps its own vertex array; a (v, vt, vn) triple becomes one
//! vertex the first time the object references it.
//! ```
//!
//! Faces before the first `o`/`g` land on the root object. `usemtl` tags the
//! faces that follow it, across object boundaries. `mtllib` files are read
//! relative to the OBJ file. Smoothing groups are skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::{Vec2, Vec3};
use tracing::{debug, info};

use mesh_tiler::{MeshObject, TilerError, TilerResult};

use crate::mtl::MaterialLibrary;

/// One face corner: position index plus optional uv/normal indices.
type Corner = (u32, Option<u32>, Option<u32>);

/// A loaded OBJ file with the materials its libraries define.
#[derive(Debug)]
pub struct LoadedObj {
	pub mesh: MeshObject,
	pub materials: MaterialLibrary,
}

/// Loads OBJ files into a [`MeshObject`] tree.
pub struct ObjLoader;

impl ObjLoader {
	/// Load an OBJ file and its material libraries. The root is named after
	/// the file stem.
	pub fn load(path: impl AsRef<Path>) -> TilerResult<LoadedObj> {
		let path = path.as_ref();
		let file = File::open(path)?;
		let name = path
			.file_stem()
			.map(|s| s.to_string_lossy().into_owned())
			.unwrap_or_default();
		let (mesh, libraries) = Self::parse_document(BufReader::new(file), &name)?;

		let directory = path.parent().unwrap_or_else(|| Path::new(""));
		let mut materials = MaterialLibrary::new();
		for library in &libraries {
			materials.merge(MaterialLibrary::load(&directory.join(library))?);
		}

		info!(
			path = %path.display(),
			objects = mesh.children.len(),
			vertices = mesh.vertex_count(),
			faces = mesh.face_count(),
			materials = materials.len(),
			"mesh loaded"
		);
		Ok(LoadedObj { mesh, materials })
	}

	/// Parse OBJ text from any buffered reader.
	pub fn parse<R: BufRead>(reader: R, name: &str) -> TilerResult<MeshObject> {
		Self::parse_document(reader, name).map(|(mesh, _)| mesh)
	}

	/// Parse OBJ text, also returning the `mtllib` file names in order.
	fn parse_document<R: BufRead>(reader: R, name: &str) -> TilerResult<(MeshObject, Vec<String>)> {
		let mut state = ParseState::default();
		let mut root = ObjectBuilder::new(name);
		let mut children: Vec<ObjectBuilder> = Vec::new();
		let mut skipped = 0usize;

		for (index, line) in reader.lines().enumerate() {
			let line = line?;
			let line_no = index + 1;
			let trimmed = line.trim();
			if trimmed.is_empty() || trimmed.starts_with('#') {
				continue;
			}

			let mut parts = trimmed.split_whitespace();
			let Some(keyword) = parts.next() else {
				continue;
			};
			let args: Vec<&str> = parts.collect();

			match keyword {
				"v" => state.positions.push(parse_vec3(&args, line_no)?),
				"vn" => state.normals.push(parse_vec3(&args, line_no)?),
				"vt" => state.uvs.push(parse_vec2(&args, line_no)?),
				"f" => {
					let corners = args
						.iter()
						.map(|token| state.corner(token, line_no))
						.collect::<TilerResult<Vec<Corner>>>()?;
					if corners.len() < 3 {
						return Err(TilerError::parse(
							line_no,
							format!("face needs at least 3 vertices, got {}", corners.len()),
						));
					}
					let current = children.last_mut().unwrap_or(&mut root);
					current.add_polygon(&corners, state.material.as_deref());
				}
				"o" | "g" => {
					let group_name = if args.is_empty() {
						format!("{name}_{}", children.len())
					} else {
						args.join(" ")
					};
					children.push(ObjectBuilder::new(group_name));
				}
				"mtllib" => state.libraries.extend(args.iter().map(|s| s.to_string())),
				// Bare `usemtl` goes back to no material
				"usemtl" => state.material = (!args.is_empty()).then(|| args.join(" ")),
				_ => skipped += 1,
			}
		}

		if skipped > 0 {
			debug!(skipped, "unsupported OBJ statements ignored");
		}

		let mut mesh = root.build(&state);
		mesh.children = children
			.into_iter()
			.filter(|child| !child.corners.is_empty())
			.map(|child| child.build(&state))
			.collect();
		mesh.compute_bounding_box();
		Ok((mesh, state.libraries))
	}
}

// =============================================================================
// Attribute pools
// =============================================================================

#[derive(Default)]
struct ParseState {
	positions: Vec<Vec3>,
	normals: Vec<Vec3>,
	uvs: Vec<Vec2>,
	/// Set by the latest `usemtl`.
	material: Option<String>,
	libraries: Vec<String>,
}

impl ParseState {
	/// Parse `v`, `v/vt`, `v//vn` or `v/vt/vn` into zero-based indices.
	fn corner(&self, token: &str, line: usize) -> TilerResult<Corner> {
		let mut fields = token.split('/');
		let position = fields
			.next()
			.filter(|s| !s.is_empty())
			.ok_or_else(|| TilerError::parse(line, format!("missing vertex index in '{token}'")))?;
		let position = resolve_index(position, self.positions.len(), line)?;

		let uv = match fields.next() {
			Some(s) if !s.is_empty() => Some(resolve_index(s, self.uvs.len(), line)?),
			_ => None,
		};
		let normal = match fields.next() {
			Some(s) if !s.is_empty() => Some(resolve_index(s, self.normals.len(), line)?),
			_ => None,
		};
		Ok((position, uv, normal))
	}
}

/// One-based or negative (relative to the end) index into a pool of `len`.
fn resolve_index(token: &str, len: usize, line: usize) -> TilerResult<u32> {
	let value: i64 = token
		.parse()
		.map_err(|_| TilerError::parse(line, format!("invalid index '{token}'")))?;
	let resolved = match value {
		v if v > 0 => v - 1,
		v if v < 0 => len as i64 + v,
		_ => return Err(TilerError::parse(line, "index 0 is not valid in OBJ")),
	};
	if resolved < 0 || resolved >= len as i64 {
		return Err(TilerError::parse(
			line,
			format!("index {value} out of range ({len} defined)"),
		));
	}
	Ok(resolved as u32)
}

fn parse_floats<const N: usize>(args: &[&str], line: usize) -> TilerResult<[f32; N]> {
	if args.len() < N {
		return Err(TilerError::parse(
			line,
			format!("expected {N} components, got {}", args.len()),
		));
	}
	let mut out = [0.0; N];
	for (slot, arg) in out.iter_mut().zip(args) {
		*slot = arg
			.parse()
			.map_err(|_| TilerError::parse(line, format!("invalid number '{arg}'")))?;
	}
	Ok(out)
}

fn parse_vec3(args: &[&str], line: usize) -> TilerResult<Vec3> {
	parse_floats::<3>(args, line).map(Vec3::from_array)
}

fn parse_vec2(args: &[&str], line: usize) -> TilerResult<Vec2> {
	parse_floats::<2>(args, line).map(Vec2::from_array)
}

// =============================================================================
// Per-object vertex welding
// =============================================================================

struct ObjectBuilder {
	name: String,
	corners: Vec<Corner>,
	lookup: HashMap<Corner, u32>,
	faces: Vec<[u32; 3]>,
	materials: Vec<String>,
	face_materials: Vec<Option<u32>>,
}

impl ObjectBuilder {
	fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			corners: Vec::new(),
			lookup: HashMap::new(),
			faces: Vec::new(),
			materials: Vec::new(),
			face_materials: Vec::new(),
		}
	}

	fn vertex(&mut self, corner: Corner) -> u32 {
		*self.lookup.entry(corner).or_insert_with(|| {
			self.corners.push(corner);
			(self.corners.len() - 1) as u32
		})
	}

	fn add_polygon(&mut self, corners: &[Corner], material: Option<&str>) {
		let material = material.map(|name| self.material_index(name));
		let first = self.vertex(corners[0]);
		for pair in corners[1..].windows(2) {
			let b = self.vertex(pair[0]);
			let c = self.vertex(pair[1]);
			self.faces.push([first, b, c]);
			self.face_materials.push(material);
		}
	}

	fn material_index(&mut self, name: &str) -> u32 {
		match self.materials.iter().position(|m| m == name) {
			Some(index) => index as u32,
			None => {
				self.materials.push(name.to_owned());
				(self.materials.len() - 1) as u32
			}
		}
	}

	/// Resolve corners against the pools. Missing uvs/normals on a partially
	/// attributed object are zero-filled.
	fn build(self, state: &ParseState) -> MeshObject {
		let mut mesh = MeshObject::new(self.name);
		let has_uv = self.corners.iter().any(|c| c.1.is_some());
		let has_normal = self.corners.iter().any(|c| c.2.is_some());

		for &(position, uv, normal) in &self.corners {
			mesh.positions.push(state.positions[position as usize]);
			if has_uv {
				mesh.uvs.push(uv.map_or(Vec2::ZERO, |i| state.uvs[i as usize]));
			}
			if has_normal {
				mesh.normals.push(normal.map_or(Vec3::ZERO, |i| state.normals[i as usize]));
			}
		}
		mesh.faces = self.faces;
		if !self.materials.is_empty() {
			mesh.materials = self.materials;
			mesh.face_materials = self.face_materials;
		}
		mesh.compute_bounding_box();
		mesh
	}
}

#[cfg(test)]
#[path = "obj_loader_test.rs"]
mod obj_loader_test;
