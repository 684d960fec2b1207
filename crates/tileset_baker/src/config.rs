//! Bake settings: command-line flags layered over an optional TOML file.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use mesh_tiler::constants::{DEFAULT_GRID_RESOLUTION, DEFAULT_ISO_LEVEL, DEFAULT_POLYGON_LIMIT};
use mesh_tiler::{SplitConfig, SplitterKind};

/// Only chunk format the baker can write.
pub const SUPPORTED_FORMAT: &str = "obj";

/// Output directory used when neither flag nor file names one.
pub const DEFAULT_OUTPUT_DIR: &str = "./exported";

/// Bakes a mesh into a level-of-detail tileset.
#[derive(Parser, Debug, Default)]
#[command(name = "bake_tileset")]
#[command(about = "Splits an OBJ mesh into a tileset of bounded-size chunks")]
pub struct Args {
	/// Source mesh (Wavefront OBJ).
	#[arg(short, long)]
	pub input: Option<PathBuf>,

	/// Output directory for tileset.json and level_<N>/ chunk folders.
	#[arg(short, long)]
	pub output: Option<PathBuf>,

	/// Maximum triangles per chunk.
	#[arg(short = 'l', long = "limit")]
	pub polygon_limit: Option<usize>,

	/// Voxel grid cells: one value for all axes, or three comma-separated.
	#[arg(short, long, num_args = 1..=3, value_delimiter = ',')]
	pub grid: Option<Vec<u32>>,

	/// Isosurface offset in cells (voxel only).
	#[arg(long)]
	pub iso: Option<f32>,

	/// Chunk file format.
	#[arg(short, long)]
	pub format: Option<String>,

	/// Split strategy: voxel or regular.
	#[arg(short, long)]
	pub algorithm: Option<SplitterKind>,

	/// TOML file with the same keys as the flags.
	#[arg(short, long)]
	pub config: Option<PathBuf>,

	/// Log at debug level unless RUST_LOG says otherwise.
	#[arg(short, long)]
	pub verbose: bool,
}

/// Grid resolution as written in TOML: `grid = 64` or `grid = [64, 64, 32]`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GridSetting {
	Uniform(u32),
	PerAxis([u32; 3]),
}

impl GridSetting {
	fn resolve(&self) -> [u32; 3] {
		match *self {
			GridSetting::Uniform(r) => [r; 3],
			GridSetting::PerAxis(r) => r,
		}
	}
}

/// Contents of the optional TOML file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
	pub input: Option<PathBuf>,
	pub output: Option<PathBuf>,
	pub limit: Option<usize>,
	pub grid: Option<GridSetting>,
	pub iso: Option<f32>,
	pub format: Option<String>,
	pub algorithm: Option<SplitterKind>,
}

impl FileConfig {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		Self::parse(&content).with_context(|| format!("Failed to parse config TOML: {}", path.display()))
	}

	pub fn parse(content: &str) -> Result<Self> {
		Ok(toml::from_str(content)?)
	}
}

/// Fully resolved settings for one bake.
#[derive(Debug, Clone, PartialEq)]
pub struct BakeConfig {
	pub input: PathBuf,
	pub output: PathBuf,
	pub format: String,
	pub split: SplitConfig,
}

impl BakeConfig {
	/// Merge flags over file values over defaults, then validate.
	pub fn resolve(args: &Args, file: FileConfig) -> Result<Self> {
		let input = args
			.input
			.clone()
			.or(file.input)
			.context("No input mesh given (use --input or `input` in the config file)")?;

		let grid_resolution = match &args.grid {
			Some(values) => grid_from_flag(values)?,
			None => file
				.grid
				.map(|g| g.resolve())
				.unwrap_or([DEFAULT_GRID_RESOLUTION; 3]),
		};

		let config = Self {
			input,
			output: args
				.output
				.clone()
				.or(file.output)
				.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
			format: args
				.format
				.clone()
				.or(file.format)
				.unwrap_or_else(|| SUPPORTED_FORMAT.to_string()),
			split: SplitConfig {
				algorithm: args.algorithm.or(file.algorithm).unwrap_or_default(),
				polygon_limit: args.polygon_limit.or(file.limit).unwrap_or(DEFAULT_POLYGON_LIMIT),
				grid_resolution,
				iso_level: args.iso.or(file.iso).unwrap_or(DEFAULT_ISO_LEVEL),
			},
		};
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<()> {
		if !self.format.eq_ignore_ascii_case(SUPPORTED_FORMAT) {
			anyhow::bail!(
				"Unsupported chunk format '{}', only '{}' is available",
				self.format,
				SUPPORTED_FORMAT
			);
		}
		self.split.validate()?;
		Ok(())
	}
}

fn grid_from_flag(values: &[u32]) -> Result<[u32; 3]> {
	match *values {
		[r] => Ok([r; 3]),
		[x, y, z] => Ok([x, y, z]),
		_ => anyhow::bail!("--grid takes one value or three, got {}", values.len()),
	}
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
