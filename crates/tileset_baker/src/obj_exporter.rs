//! Wavefront OBJ chunk writer.
//!
//! A chunk whose faces carry materials also gets `<base>.mtl` next to it,
//! holding the definitions of just the materials it uses.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use mesh_tiler::{ChunkExporter, MeshObject, TilerError, TilerResult};

use crate::mtl::MaterialLibrary;

/// Writes each chunk as one `.obj` file.
///
/// Indexed chunks share `v` lines between faces. Flat chunks get three fresh
/// vertices per face, so no two faces reference the same line.
#[derive(Debug, Default)]
pub struct ObjExporter {
	written: usize,
	materials: MaterialLibrary,
}

impl ObjExporter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Exporter that resolves chunk material names against `materials`.
	pub fn with_materials(materials: MaterialLibrary) -> Self {
		Self {
			written: 0,
			materials,
		}
	}

	/// Number of files written so far.
	pub fn written(&self) -> usize {
		self.written
	}
}

impl ChunkExporter for ObjExporter {
	fn extension(&self) -> &str {
		"obj"
	}

	fn export(
		&mut self,
		directory: &Path,
		base_name: &str,
		mesh: &MeshObject,
		indexed: bool,
	) -> TilerResult<String> {
		let file_name = format!("{base_name}.{}", self.extension());
		let path = directory.join(&file_name);
		let export_error = |source| TilerError::Export {
			path: path.clone(),
			source,
		};

		fs::create_dir_all(directory).map_err(export_error)?;
		let flat;
		let mesh = if mesh.children.is_empty() {
			mesh
		} else {
			flat = mesh.flattened();
			&flat
		};

		let library = if mesh.has_materials() && !mesh.materials.is_empty() {
			let library = format!("{base_name}.mtl");
			self.write_library(&directory.join(&library), mesh)?;
			Some(library)
		} else {
			None
		};

		let file = File::create(&path).map_err(export_error)?;
		let mut writer = BufWriter::new(file);
		write_obj(&mut writer, mesh, indexed, library.as_deref()).map_err(export_error)?;
		writer.flush().map_err(export_error)?;

		self.written += 1;
		Ok(file_name)
	}
}

impl ObjExporter {
	fn write_library(&self, path: &Path, mesh: &MeshObject) -> TilerResult<()> {
		let export_error = |source| TilerError::Export {
			path: path.to_path_buf(),
			source,
		};
		let missing = mesh
			.materials
			.iter()
			.filter(|name| self.materials.get(name).is_none())
			.count();
		if missing > 0 {
			debug!(path = %path.display(), missing, "materials without definitions");
		}

		let file = File::create(path).map_err(export_error)?;
		let mut writer = BufWriter::new(file);
		self
			.materials
			.write_subset(&mut writer, mesh.materials.iter().map(String::as_str))
			.map_err(export_error)?;
		writer.flush().map_err(export_error)
	}
}

/// Serialize one childless mesh as OBJ text, referencing `mtllib` when given.
pub fn write_obj<W: Write>(
	writer: &mut W,
	mesh: &MeshObject,
	indexed: bool,
	mtllib: Option<&str>,
) -> std::io::Result<()> {
	let uvs = mesh.has_uvs();
	let normals = mesh.has_normals();

	if let Some(library) = mtllib {
		writeln!(writer, "mtllib {library}")?;
	}
	if !mesh.name.is_empty() {
		writeln!(writer, "o {}", mesh.name)?;
	}

	let write_vertex = |writer: &mut W, i: usize| -> std::io::Result<()> {
		let p = mesh.positions[i];
		writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
		if uvs {
			let t = mesh.uvs[i];
			writeln!(writer, "vt {} {}", t.x, t.y)?;
		}
		if normals {
			let n = mesh.normals[i];
			writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
		}
		Ok(())
	};

	let corner = |i: u32| match (uvs, normals) {
		(true, true) => format!("{i}/{i}/{i}"),
		(true, false) => format!("{i}/{i}"),
		(false, true) => format!("{i}//{i}"),
		(false, false) => i.to_string(),
	};

	// `usemtl` only where the material changes
	let mut active: Option<&str> = None;
	let mut switch_material = |writer: &mut W, face: usize| -> std::io::Result<()> {
		let material = mesh.face_material(face);
		if material != active {
			match material {
				Some(name) => writeln!(writer, "usemtl {name}")?,
				None => writeln!(writer, "usemtl")?,
			}
			active = material;
		}
		Ok(())
	};

	if indexed {
		for i in 0..mesh.positions.len() {
			write_vertex(writer, i)?;
		}
		for (f, face) in mesh.faces.iter().enumerate() {
			switch_material(writer, f)?;
			let [a, b, c] = face.map(|i| corner(i + 1));
			writeln!(writer, "f {a} {b} {c}")?;
		}
	} else {
		for (f, face) in mesh.faces.iter().enumerate() {
			for &i in face {
				write_vertex(writer, i as usize)?;
			}
			switch_material(writer, f)?;
			let base = f as u32 * 3 + 1;
			writeln!(writer, "f {} {} {}", corner(base), corner(base + 1), corner(base + 2))?;
		}
	}
	Ok(())
}

#[cfg(test)]
#[path = "obj_exporter_test.rs"]
mod obj_exporter_test;
