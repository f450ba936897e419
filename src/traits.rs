use crate::config::SLOT_BYTES;
use crate::error::Result;

/// Membership operations keyed by raw bytes, hashing internally.
pub trait ApproximateSetOps {
    /// Insert an item into the active table
    fn insert_item(&mut self, item: &[u8]) -> Result<()>;

    /// Check if an item exists in any live table
    fn contains_item(&mut self, item: &[u8]) -> bool;

    /// Insert only if no live table reports the item; true when inserted
    fn insert_if_absent(&mut self, item: &[u8]) -> Result<bool>;

    /// Best-effort removal from a single table
    fn remove_item(&mut self, item: &[u8]) -> bool;
}

/// Size and fill level of a fixed-capacity table.
pub trait OccupancyStats {
    fn size_k(&self) -> usize;
    fn count(&self) -> usize;

    fn occupancy(&self) -> f64 {
        self.count() as f64 / self.size_k() as f64
    }

    fn memory_bytes(&self) -> usize {
        self.size_k() * SLOT_BYTES
    }
}

/// Statistics for a filter made of rotating tables
pub trait RotationStats {
    fn table_count(&self) -> usize;
    fn max_tables(&self) -> usize;
    fn total_size_k(&self) -> usize;
    fn tables_created(&self) -> u64;
    fn tables_evicted(&self) -> u64;

    fn memory_usage(&self) -> usize {
        self.total_size_k() * SLOT_BYTES
    }
}
