//! Latest-frame-per-stream cache shared by one producer and many consumers

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use crossbeam::utils::CachePadded;
use tracing::debug;

use crate::capture::TimeStampedFrame;
use crate::stream::StreamType;

type FrameMap = HashMap<StreamType, TimeStampedFrame>;

/// Holds the most recent [`TimeStampedFrame`] of every active stream.
///
/// Readers load an immutable snapshot of the whole map without locking; writers publish
/// a new map, so a reader sees either all or none of a batch.
pub struct FrameCache {
    frames: ArcSwap<FrameMap>,

    /// Statistics
    stats: CachePadded<Stats>,
}

#[derive(Default)]
struct Stats {
    batches: AtomicUsize,
    frames_written: AtomicUsize,
    reads: AtomicUsize,
}

impl Default for FrameCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCache {
    pub fn new() -> Self {
        Self {
            frames: ArcSwap::from_pointee(FrameMap::new()),
            stats: CachePadded::new(Stats::default()),
        }
    }

    /// Replaces the entries named in `batch`; every other stream keeps its frame.
    ///
    /// Streams outside the tracked set are inserted as well.
    pub fn update<I>(&self, batch: I)
    where
        I: IntoIterator<Item = (StreamType, TimeStampedFrame)>,
    {
        let batch: Vec<_> = batch.into_iter().collect();
        if batch.is_empty() {
            return;
        }

        self.frames.rcu(|current| {
            let mut next = FrameMap::clone(current);
            next.extend(batch.iter().cloned());
            next
        });

        self.stats.batches.fetch_add(1, Ordering::Relaxed);
        self.stats
            .frames_written
            .fetch_add(batch.len(), Ordering::Relaxed);
        metrics::counter!("frames_published").increment(batch.len() as u64);
    }

    /// Latest frame of `stream`, or an empty frame if there is none.
    pub fn latest(&self, stream: StreamType) -> TimeStampedFrame {
        self.stats.reads.fetch_add(1, Ordering::Relaxed);
        self.frames
            .load()
            .get(&stream)
            .cloned()
            .unwrap_or_default()
    }

    /// Tracks exactly `streams`, each starting with an empty frame.
    pub fn reset(&self, streams: &[StreamType]) {
        let next: FrameMap = streams
            .iter()
            .map(|stream| (*stream, TimeStampedFrame::empty()))
            .collect();
        debug!("frame cache reset to {} streams", next.len());
        self.frames.store(Arc::new(next));
        metrics::counter!("cache_resets").increment(1);
    }

    /// Drops every stream and frame.
    pub fn clear(&self) {
        self.frames.store(Arc::new(FrameMap::new()));
    }

    /// Tracked streams in ascending order.
    pub fn active_streams(&self) -> Vec<StreamType> {
        let mut streams: Vec<_> = self.frames.load().keys().copied().collect();
        streams.sort();
        streams
    }

    pub fn is_tracked(&self, stream: StreamType) -> bool {
        self.frames.load().contains_key(&stream)
    }

    /// (batches, frames written, reads)
    pub fn stats(&self) -> (usize, usize, usize) {
        (
            self.stats.batches.load(Ordering::Relaxed),
            self.stats.frames_written.load(Ordering::Relaxed),
            self.stats.reads.load(Ordering::Relaxed),
        )
    }
}
