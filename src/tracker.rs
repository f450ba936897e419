use crate::error::{FilterError, Result};
use crate::ring::RingCursor;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Ring of the most recent query timestamps of a table.
#[derive(Debug, Clone)]
pub struct QueryRateTracker {
    timestamps: Vec<u64>,
    cursor: RingCursor,
}

impl QueryRateTracker {
    /// A tracker without history could never estimate a rate, so a zero
    /// `capacity` is rejected.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(FilterError::ZeroCapacity);
        }
        Ok(Self {
            timestamps: vec![0; capacity],
            cursor: RingCursor::new(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.cursor.capacity()
    }

    pub fn record_query(&mut self, timestamp_nanos: u64) {
        let slot = self.cursor.push();
        self.timestamps[slot] = timestamp_nanos;
    }

    /// Retained timestamps, at most `capacity`.
    pub fn samples(&self) -> usize {
        self.cursor.len()
    }

    /// Total queries ever recorded.
    pub fn total_queries(&self) -> u64 {
        self.cursor.written()
    }

    /// `0` is the oldest retained timestamp, `-1` the newest.
    pub fn get(&self, logical: isize) -> Option<u64> {
        self.cursor.physical(logical).map(|slot| self.timestamps[slot])
    }

    /// Nanoseconds between the oldest and newest retained query.
    pub fn span_nanos(&self) -> Option<u64> {
        Some(self.get(-1)?.saturating_sub(self.get(0)?))
    }

    /// Retained queries per stored item per second.
    ///
    /// NaN means there is nothing to estimate from yet. With `count == 0` or
    /// all samples sharing one timestamp the result is NaN or infinite;
    /// callers decide how to treat it.
    pub fn queries_per_stored_item_per_second(&self, count: usize) -> f64 {
        let Some(span) = self.span_nanos() else {
            return f64::NAN;
        };
        let stored_item_seconds = count as f64 * span as f64 / NANOS_PER_SECOND;
        self.samples() as f64 / stored_item_seconds
    }
}
