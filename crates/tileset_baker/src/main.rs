//! Level-of-detail tileset baker.
//!
//! Loads an OBJ mesh, splits it into chunks under a polygon budget and writes
//! a tileset next to one OBJ file per chunk:
//!
//! ```text
//! <output>/
//!   tileset.json
//!   level_0/<name>_0.obj ...
//!   level_1/<name>_5.obj <name>_5.mtl ...
//! ```
//!
//! A chunk gets an `.mtl` only when its faces use materials.

mod config;
mod mtl;
mod obj_exporter;
mod obj_loader;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mesh_tiler::{IdAllocator, SplitStrategy, Splitter, Tileset, TilesetBuilder};

use config::{Args, BakeConfig, FileConfig};
use obj_exporter::ObjExporter;
use obj_loader::{LoadedObj, ObjLoader};

const TILESET_FILE: &str = "tileset.json";

fn main() -> Result<()> {
	let args = Args::parse();
	init_logging(args.verbose);

	let file = match &args.config {
		Some(path) => FileConfig::load(path)?,
		None => FileConfig::default(),
	};
	let config = BakeConfig::resolve(&args, file)?;

	let tileset = bake(&config)?;
	info!(
		output = %config.output.join(TILESET_FILE).display(),
		tiles = tileset.tile_count(),
		"done"
	);
	Ok(())
}

/// `RUST_LOG` wins; otherwise info, or debug with `--verbose`.
fn init_logging(verbose: bool) {
	let default = if verbose { "debug" } else { "info" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Run one bake end to end and return the written tileset.
fn bake(config: &BakeConfig) -> Result<Tileset> {
	info!(
		input = %config.input.display(),
		algorithm = %config.split.algorithm,
		limit = config.split.polygon_limit,
		"baking tileset"
	);

	let LoadedObj { mesh, materials } = ObjLoader::load(&config.input)
		.with_context(|| format!("Failed to load mesh: {}", config.input.display()))?;
	if mesh.is_empty() {
		warn!(input = %config.input.display(), "mesh has no faces, writing a trivial tileset");
	}
	if materials.is_empty() && mesh.uses_materials() {
		warn!("faces name materials but no definitions were loaded");
	}

	std::fs::create_dir_all(&config.output)
		.with_context(|| format!("Failed to create output dir: {}", config.output.display()))?;

	let mut splitter = Splitter::new(&config.split, IdAllocator::new())?;
	let mut builder = TilesetBuilder::new(&config.output, ObjExporter::with_materials(materials));
	let stats = splitter
		.split(&mesh, &mut builder)
		.context("Splitting mesh failed")?;
	splitter.finish();

	info!(
		chunks = stats.chunks,
		files = builder.exporter().written(),
		over_budget = stats.over_budget,
		max_level = stats.max_level,
		elapsed_ms = stats.elapsed_us / 1000,
		"split finished"
	);

	let tileset = builder.finish();
	write_tileset(&tileset, &config.output)?;
	Ok(tileset)
}

fn write_tileset(tileset: &Tileset, output: &Path) -> Result<()> {
	let path = output.join(TILESET_FILE);
	tileset
		.write(&path)
		.with_context(|| format!("Failed to write: {}", path.display()))
}
