//! mesh_tiler - Recursive mesh partitioning into level-of-detail tilesets
//!
//! A source mesh is split into chunks that each stay under a polygon budget.
//! Chunks form a tree: coarse chunks near the root, finer ones below. The tree
//! is written as a 3D-Tiles style `tileset.json` next to one geometry file per
//! chunk.
//!
//! # Strategies
//!
//! - **Voxel**: resamples the source into a distance field and re-extracts it
//!   with Surface Nets per octree node. Internal nodes carry a coarse proxy,
//!   so the tree is a true level-of-detail hierarchy.
//! - **Regular**: partitions the original faces by octree bisection without
//!   altering them. Produces a flat set of exact leaves.
//!
//! # Example
//!
//! ```ignore
//! use mesh_tiler::{IdAllocator, SplitConfig, SplitStrategy, Splitter, TilesetBuilder};
//!
//! let mut splitter = Splitter::new(&SplitConfig::default(), IdAllocator::new())?;
//! let mut builder = TilesetBuilder::new("exported", exporter);
//! splitter.split(&mesh, &mut builder)?;
//! splitter.finish();
//! builder.finish().write("exported/tileset.json")?;
//! ```

pub mod constants;
pub mod edge_table;
pub mod error;
pub mod id;
pub mod types;

pub use error::{TilerError, TilerResult};
pub use id::{IdAllocator, TileId};
pub use types::{Aabb, MeshObject};

// Scalar fields and isosurface extraction
pub mod field;
pub mod surface_nets;

// Split strategies and the chunk stream
pub mod split;
pub use split::{
  ChannelSink, Chunk, ChunkSink, RegularSplitter, SplitConfig, SplitStats, SplitStrategy, Splitter,
  SplitterKind, VoxelSplitter,
};

// Tileset document and assembly
pub mod builder;
pub mod tiles;
pub use builder::{ChunkExporter, ExportFailurePolicy, TilesetBuilder};
pub use tiles::{BoundingVolume, Tile, TileRefine, Tileset};

// Deterministic meshes and sinks for tests and benchmarks
pub mod fixtures;
