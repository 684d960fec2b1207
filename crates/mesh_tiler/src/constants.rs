//! Tuning constants shared by the split strategies.

/// Default maximum triangle count per chunk.
pub const DEFAULT_POLYGON_LIMIT: usize = 2048;

/// Default voxel cells per axis for the root node.
pub const DEFAULT_GRID_RESOLUTION: u32 = 64;

/// Default iso offset, in cells, of the resampled surface from the source.
pub const DEFAULT_ISO_LEVEL: f32 = 1.0;

/// Smallest cell count per axis a voxel node is sampled at.
///
/// A node subdivides only while every axis keeps at least this many cells
/// after halving.
pub const MIN_GRID_RESOLUTION: usize = 2;

/// Extra cells of empty space around the source box in the base grid,
/// added on top of the iso offset.
pub const GRID_PADDING_CELLS: f32 = 2.0;

/// Bisection depth after which the regular splitter falls back to cutting
/// runs of faces in source order.
pub const MAX_REGULAR_DEPTH: u32 = 16;

/// Geometric error of a regular chunk per unit of bounding-box diagonal.
pub const REGULAR_ERROR_SCALE: f64 = 0.01;
