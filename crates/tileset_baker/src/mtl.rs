//! Wavefront MTL material libraries.
//!
//! Definitions are kept as their raw statements and written back unchanged.
//! Texture paths are copied as-is; nothing is decoded.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use tracing::{debug, warn};

use mesh_tiler::TilerResult;

/// One `newmtl` block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
	pub name: String,
	/// Statements following `newmtl`, trimmed, in file order.
	pub statements: Vec<String>,
}

impl Material {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			statements: Vec::new(),
		}
	}

	/// Paths named by `map_*`, `bump` and `disp` statements.
	pub fn texture_paths(&self) -> impl Iterator<Item = &str> {
		self.statements.iter().filter_map(|statement| {
			let (keyword, rest) = statement.split_once(char::is_whitespace)?;
			if !(keyword.starts_with("map_") || keyword == "bump" || keyword == "disp") {
				return None;
			}
			// Options like `-s 1 1 1` come first, the path is last
			rest.split_whitespace().last()
		})
	}
}

/// Materials in definition order. Later definitions of a name replace
/// earlier ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialLibrary {
	materials: Vec<Material>,
}

impl MaterialLibrary {
	pub fn new() -> Self {
		Self::default()
	}

	/// Read an `.mtl` file. A missing file gives an empty library.
	pub fn load(path: &Path) -> TilerResult<Self> {
		let file = match File::open(path) {
			Ok(file) => file,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				warn!(path = %path.display(), "material library not found, materials keep names only");
				return Ok(Self::new());
			}
			Err(err) => return Err(err.into()),
		};
		let library = Self::parse(BufReader::new(file))?;
		debug!(
			path = %path.display(),
			materials = library.len(),
			textures = library.materials.iter().map(|m| m.texture_paths().count()).sum::<usize>(),
			"material library loaded"
		);
		Ok(library)
	}

	pub fn parse<R: BufRead>(reader: R) -> TilerResult<Self> {
		let mut library = Self::new();
		let mut current: Option<Material> = None;

		for line in reader.lines() {
			let line = line?;
			let trimmed = line.trim();
			if trimmed.is_empty() || trimmed.starts_with('#') {
				continue;
			}
			match trimmed.split_once(char::is_whitespace) {
				Some(("newmtl", name)) => {
					if let Some(done) = current.replace(Material::new(name.trim())) {
						library.insert(done);
					}
				}
				_ => match current.as_mut() {
					Some(material) => material.statements.push(trimmed.to_owned()),
					None => debug!(statement = trimmed, "statement before first newmtl ignored"),
				},
			}
		}
		if let Some(done) = current {
			library.insert(done);
		}
		Ok(library)
	}

	pub fn insert(&mut self, material: Material) {
		match self.materials.iter_mut().find(|m| m.name == material.name) {
			Some(existing) => *existing = material,
			None => self.materials.push(material),
		}
	}

	/// Add every material of `other`, replacing same-named ones.
	pub fn merge(&mut self, other: MaterialLibrary) {
		for material in other.materials {
			self.insert(material);
		}
	}

	pub fn get(&self, name: &str) -> Option<&Material> {
		self.materials.iter().find(|m| m.name == name)
	}

	pub fn len(&self) -> usize {
		self.materials.len()
	}

	pub fn is_empty(&self) -> bool {
		self.materials.is_empty()
	}

	/// Write definitions for `names` in the given order. Names without a
	/// definition get an empty `newmtl` block so references still resolve.
	pub fn write_subset<'a, W: Write>(
		&self,
		writer: &mut W,
		names: impl IntoIterator<Item = &'a str>,
	) -> std::io::Result<()> {
		for (i, name) in names.into_iter().enumerate() {
			if i > 0 {
				writeln!(writer)?;
			}
			writeln!(writer, "newmtl {name}")?;
			if let Some(material) = self.get(name) {
				for statement in &material.statements {
					writeln!(writer, "{statement}")?;
				}
			}
		}
		Ok(())
	}
}

#[cfg(test)]
#[path = "mtl_test.rs"]
mod mtl_test;
