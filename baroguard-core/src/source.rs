//! Sample input
//!
//! The engine pulls barometer samples through [`SampleSource`], one slot at
//! a time, at most [`SAMPLE_QUEUE_DEPTH`] per slot and cycle. Anything that
//! can hand out samples per slot works: a driver shim, a replay log, or the
//! bounded [`SampleQueues`] below.
//!
//! ## Queue Semantics
//!
//! ```text
//! push ──► ┌────┬────┬────┬────┐ ──► poll
//!          │ s3 │ s4 │ s5 │ s6 │     oldest first
//!          └────┴────┴────┴────┘
//!            full: oldest (s2) dropped and counted
//! ```
//!
//! Each slot keeps the newest samples. A producer running faster than the
//! cycle loses the oldest data, never the newest.

use heapless::Deque;

use crate::constants::buffers::{MAX_SENSOR_COUNT, SAMPLE_QUEUE_DEPTH};
use crate::sensor::BaroSample;

/// Per-slot supplier of barometer samples
pub trait SampleSource {
    /// Next unread sample of `instance`, oldest first
    fn poll(&mut self, instance: usize) -> Option<BaroSample>;
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    fn poll(&mut self, instance: usize) -> Option<BaroSample> {
        (**self).poll(instance)
    }
}

/// Bounded per-slot sample queues
#[derive(Debug, Clone)]
pub struct SampleQueues<const N: usize = SAMPLE_QUEUE_DEPTH> {
    queues: [Deque<BaroSample, N>; MAX_SENSOR_COUNT],
    dropped: [u32; MAX_SENSOR_COUNT],
}

impl<const N: usize> SampleQueues<N> {
    /// Empty queues
    pub fn new() -> Self {
        Self {
            queues: core::array::from_fn(|_| Deque::new()),
            dropped: [0; MAX_SENSOR_COUNT],
        }
    }

    /// Queue a sample, evicting the oldest one when full
    ///
    /// Returns `false` only for an out-of-range slot.
    pub fn push(&mut self, instance: usize, sample: BaroSample) -> bool {
        let Some(queue) = self.queues.get_mut(instance) else {
            return false;
        };

        if queue.is_full() {
            queue.pop_front();
            self.dropped[instance] = self.dropped[instance].saturating_add(1);
        }

        queue.push_back(sample).is_ok()
    }

    /// Queued samples for `instance`
    pub fn len(&self, instance: usize) -> usize {
        self.queues.get(instance).map_or(0, Deque::len)
    }

    /// No sample queued for any instance
    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(Deque::is_empty)
    }

    /// Samples evicted from a slot so far
    pub fn dropped(&self, instance: usize) -> u32 {
        self.dropped.get(instance).copied().unwrap_or(0)
    }

    /// Drop every queued sample, keeping the drop counters
    pub fn clear(&mut self) {
        for queue in self.queues.iter_mut() {
            queue.clear();
        }
    }
}

impl<const N: usize> Default for SampleQueues<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SampleSource for SampleQueues<N> {
    fn poll(&mut self, instance: usize) -> Option<BaroSample> {
        self.queues.get_mut(instance)?.pop_front()
    }
}
