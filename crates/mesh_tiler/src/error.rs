//! Error types for mesh tiling.

use std::path::PathBuf;

use thiserror::Error;

use crate::id::TileId;

/// Result type for tiling operations.
pub type TilerResult<T> = Result<T, TilerError>;

/// Errors that can occur while splitting a mesh or assembling a tileset.
#[derive(Debug, Error)]
pub enum TilerError {
  /// Rejected configuration, reported before any splitting starts.
  #[error("invalid configuration: {0}")]
  Config(String),

  /// A chunk named a parent that is not in the tree.
  #[error("parent tile {parent} not found for chunk {chunk}")]
  ParentNotFound { parent: TileId, chunk: TileId },

  /// Writing a chunk file failed.
  #[error("failed to export chunk to {}: {source}", path.display())]
  Export {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Malformed model input.
  #[error("parse error at line {line}: {message}")]
  Parse { line: usize, message: String },

  /// The receiving end of a chunk channel was dropped.
  #[error("chunk receiver disconnected")]
  SinkClosed,

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

impl TilerError {
  /// Create a configuration error.
  pub fn config(details: impl Into<String>) -> Self {
    Self::Config(details.into())
  }

  /// Create a parse error for the given 1-based line.
  pub fn parse(line: usize, message: impl Into<String>) -> Self {
    Self::Parse {
      line,
      message: message.into(),
    }
  }
}
