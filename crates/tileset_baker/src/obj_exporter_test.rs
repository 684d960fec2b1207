use std::io::Cursor;

use glam::{Vec2, Vec3};
use mesh_tiler::fixtures;

use super::*;
use crate::mtl::MaterialLibrary;
use crate::obj_loader::ObjLoader;

fn render(mesh: &MeshObject, indexed: bool) -> String {
	let mut out = Vec::new();
	write_obj(&mut out, mesh, indexed, None).unwrap();
	String::from_utf8(out).unwrap()
}

fn count(text: &str, prefix: &str) -> usize {
	text.lines().filter(|l| l.starts_with(prefix)).count()
}

#[test]
fn test_indexed_shares_vertices() {
	let cube = fixtures::cube(1.0);
	let text = render(&cube, true);
	assert_eq!(count(&text, "v "), cube.positions.len());
	assert_eq!(count(&text, "f "), 12);
}

#[test]
fn test_flat_writes_three_vertices_per_face() {
	let cube = fixtures::cube(1.0);
	let text = render(&cube, false);
	assert_eq!(count(&text, "v "), 36);
	assert_eq!(count(&text, "f "), 12);
	assert!(text.lines().any(|l| l == "f 34 35 36"));
}

#[test]
fn test_attributes_use_full_corner_syntax() {
	let plane = fixtures::plane_grid(1, 1.0);
	let text = render(&plane, true);
	assert_eq!(count(&text, "vt "), 4);
	assert_eq!(count(&text, "vn "), 4);
	assert!(text.lines().any(|l| l == "f 1/1/1 2/2/2 4/4/4"));
}

#[test]
fn test_written_file_loads_back() {
	let mut mesh = MeshObject::new("tri");
	mesh.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
	mesh.uvs = vec![Vec2::ZERO, Vec2::X, Vec2::Y];
	mesh.faces = vec![[0, 1, 2]];

	let loaded = ObjLoader::parse(Cursor::new(render(&mesh, true)), "tri").unwrap();
	// `o tri` opens a child object
	let child = &loaded.children[0];
	assert_eq!(child.name, "tri");
	assert_eq!(child.positions, mesh.positions);
	assert_eq!(child.uvs, mesh.uvs);
	assert_eq!(child.faces, mesh.faces);
}

#[test]
fn test_export_creates_level_directory() {
	let dir = tempfile::tempdir().unwrap();
	let level = dir.path().join("level_2");
	let mut exporter = ObjExporter::new();

	let name = exporter
		.export(&level, "cube_7", &fixtures::cube(2.0), true)
		.unwrap();
	assert_eq!(name, "cube_7.obj");
	assert_eq!(exporter.written(), 1);

	let text = std::fs::read_to_string(level.join(&name)).unwrap();
	assert_eq!(count(&text, "f "), 12);
}

#[test]
fn test_nested_mesh_is_flattened() {
	let dir = tempfile::tempdir().unwrap();
	let group = fixtures::group("pair", vec![fixtures::cube(1.0), fixtures::single_triangle()]);
	let name = ObjExporter::new()
		.export(dir.path(), "pair_0", &group, true)
		.unwrap();
	let text = std::fs::read_to_string(dir.path().join(name)).unwrap();
	assert_eq!(count(&text, "f "), 13);
}

#[test]
fn test_unwritable_directory_is_export_error() {
	let dir = tempfile::tempdir().unwrap();
	let blocker = dir.path().join("occupied");
	std::fs::write(&blocker, "not a directory").unwrap();

	let err = ObjExporter::new()
		.export(&blocker, "mesh_0", &fixtures::single_triangle(), false)
		.unwrap_err();
	match err {
		TilerError::Export { path, .. } => assert!(path.ends_with("mesh_0.obj")),
		other => panic!("unexpected error {other}"),
	}
}

fn two_tone_cube() -> MeshObject {
	let mut cube = fixtures::cube(1.0);
	cube.materials = vec!["paint".into(), "rust".into()];
	cube.face_materials = (0..cube.faces.len())
		.map(|f| match f {
			0..=3 => Some(0),
			4..=9 => Some(1),
			_ => None,
		})
		.collect();
	cube
}

#[test]
fn test_usemtl_written_on_change_only() {
	let mut out = Vec::new();
	write_obj(&mut out, &two_tone_cube(), true, Some("cube_0.mtl")).unwrap();
	let text = String::from_utf8(out).unwrap();

	assert_eq!(text.lines().next(), Some("mtllib cube_0.mtl"));
	let switches: Vec<&str> = text.lines().filter(|l| l.starts_with("usemtl")).collect();
	assert_eq!(switches, vec!["usemtl paint", "usemtl rust", "usemtl"]);
	assert_eq!(count(&text, "f "), 12);
}

#[test]
fn test_material_library_written_next_to_chunk() {
	let dir = tempfile::tempdir().unwrap();
	let library = MaterialLibrary::parse(Cursor::new(
		"newmtl rust\nKd 0.6 0.2 0.1\nmap_Kd ../../textures/rust.png\n\nnewmtl unused\nKd 1 1 1\n",
	))
	.unwrap();
	let mut exporter = ObjExporter::with_materials(library);

	let name = exporter
		.export(dir.path(), "cube_3", &two_tone_cube(), false)
		.unwrap();
	let obj = std::fs::read_to_string(dir.path().join(&name)).unwrap();
	assert!(obj.starts_with("mtllib cube_3.mtl\n"));

	// Only used materials, texture path untouched, undefined names kept
	let mtl = std::fs::read_to_string(dir.path().join("cube_3.mtl")).unwrap();
	assert_eq!(
		mtl,
		"newmtl paint\n\nnewmtl rust\nKd 0.6 0.2 0.1\nmap_Kd ../../textures/rust.png\n"
	);
}

#[test]
fn test_materials_survive_reload() {
	let dir = tempfile::tempdir().unwrap();
	let cube = two_tone_cube();
	let name = ObjExporter::new()
		.export(dir.path(), "cube_1", &cube, true)
		.unwrap();

	let loaded = ObjLoader::load(dir.path().join(name)).unwrap();
	let child = &loaded.mesh.children[0];
	let expected: Vec<Option<&str>> = (0..cube.faces.len()).map(|f| cube.face_material(f)).collect();
	let actual: Vec<Option<&str>> = (0..child.faces.len()).map(|f| child.face_material(f)).collect();
	assert_eq!(actual, expected);
	assert_eq!(loaded.materials.len(), 2);
}

#[test]
fn test_bare_mesh_writes_no_library() {
	let dir = tempfile::tempdir().unwrap();
	let name = ObjExporter::new()
		.export(dir.path(), "cube_2", &fixtures::cube(1.0), true)
		.unwrap();
	let text = std::fs::read_to_string(dir.path().join(name)).unwrap();
	assert_eq!(count(&text, "mtllib"), 0);
	assert_eq!(count(&text, "usemtl"), 0);
	assert!(!dir.path().join("cube_2.mtl").exists());
}
