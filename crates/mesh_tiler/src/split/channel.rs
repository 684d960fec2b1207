//! Channel-backed sink for running a split on a worker thread.
//!
//! ```text
//! worker:  splitter.split(&mesh, &mut ChannelSink) ──► Sender<Chunk>
//!                                                        │ FIFO
//! main:    for chunk in receiver { builder.on_chunk(chunk)? } ◄──┘
//! ```
//!
//! FIFO delivery preserves the parent-before-child order of the split.

use crossbeam_channel::{Receiver, Sender};

use super::{Chunk, ChunkSink};
use crate::error::{TilerError, TilerResult};

/// Forwards chunks into a crossbeam channel.
#[derive(Clone)]
pub struct ChannelSink {
  tx: Sender<Chunk>,
}

impl ChannelSink {
  pub fn new(tx: Sender<Chunk>) -> Self {
    Self { tx }
  }

  /// Bounded channel: the split blocks while `capacity` chunks are in flight.
  pub fn bounded(capacity: usize) -> (Self, Receiver<Chunk>) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    (Self::new(tx), rx)
  }

  pub fn unbounded() -> (Self, Receiver<Chunk>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (Self::new(tx), rx)
  }
}

impl ChunkSink for ChannelSink {
  fn on_chunk(&mut self, chunk: Chunk) -> TilerResult<()> {
    self.tx.send(chunk).map_err(|_| TilerError::SinkClosed)
  }
}
