//! Tile identifiers and their allocator.
//!
//! Identifiers correlate emitted chunks with tree nodes. A chunk receives its
//! id right before it is reported, so any later chunk may name it as parent.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// =============================================================================
// TileId - opaque identifier
// =============================================================================

/// Opaque tile identifier.
///
/// Unique within one run, never reused. Carries no meaning beyond identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
pub struct TileId(u64);

impl TileId {
  /// Reserved id of the synthetic root tile.
  pub const ROOT: Self = Self(0);

  pub const fn new(raw: u64) -> Self {
    Self(raw)
  }

  /// Get the raw ID value.
  pub fn raw(&self) -> u64 {
    self.0
  }

  pub fn is_root(&self) -> bool {
    *self == Self::ROOT
  }
}

impl fmt::Display for TileId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

// =============================================================================
// IdAllocator - per-run monotonic counter
// =============================================================================

/// Monotonic identifier source for one run.
///
/// Starts after [`TileId::ROOT`], so the root exists before the first chunk
/// asks for its parent. Atomic, so a strategy running on a worker thread can
/// share it with the consumer side.
#[derive(Debug)]
pub struct IdAllocator {
  next: AtomicU64,
}

impl IdAllocator {
  pub fn new() -> Self {
    Self {
      next: AtomicU64::new(TileId::ROOT.raw() + 1),
    }
  }

  /// Allocate the next identifier.
  pub fn next(&self) -> TileId {
    TileId(self.next.fetch_add(1, Ordering::Relaxed))
  }

  /// Number of identifiers handed out so far.
  pub fn allocated(&self) -> u64 {
    self.next.load(Ordering::Relaxed) - 1
  }
}

impl Default for IdAllocator {
  fn default() -> Self {
    Self::new()
  }
}
