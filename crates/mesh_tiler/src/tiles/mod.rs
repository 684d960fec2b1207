//! Tileset tree and its JSON document.

pub mod bounds;
pub mod tile;
pub mod tileset;

pub use bounds::BoundingVolume;
pub use tile::{Tile, TileContent, TileRefine};
pub use tileset::{Tileset, TilesetAsset, TILESET_VERSION};
