use crate::config::{FilterConfig, SLOT_BYTES};
use crate::error::Result;
use crate::hash::Fingerprint;
use crate::ring::RingCursor;
use crate::rotating::RotatingTable;
use crate::stats::{FilterSnapshot, TableSnapshot};
use crate::traits::{ApproximateSetOps, OccupancyStats, RotationStats};
use tracing::{debug, info, trace, warn};

/// Owns up to `max_tables` rotating tables.
///
/// Inserts go to the newest table, lookups scan newest to oldest. When the
/// newest table overflows past `max_occupancy` a new table is appended, sized
/// from the insert and query rates of the last two tables, and the oldest one
/// is dropped once the ring is full or the memory budget requires it.
pub struct RotationManager {
    config: FilterConfig,
    tables: Vec<Option<RotatingTable>>,
    cursor: RingCursor,
    tables_created: u64,
    tables_evicted: u64,
}

impl RotationManager {
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;

        let first = RotatingTable::new(config.initial_size_k, &config)?;
        let mut manager = Self {
            tables: (0..config.max_tables).map(|_| None).collect(),
            cursor: RingCursor::new(config.max_tables),
            config,
            tables_created: 0,
            tables_evicted: 0,
        };
        manager.append(first);

        Ok(manager)
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn fingerprint(&self, item: &[u8]) -> Fingerprint {
        (self.config.fingerprint_function)(item, self.config.hash_seed)
    }

    /// Live tables from newest to oldest.
    pub fn tables(&self) -> impl Iterator<Item = &RotatingTable> + '_ {
        self.cursor
            .newest_first()
            .filter_map(move |slot| self.tables[slot].as_ref())
    }

    pub fn newest(&self) -> Option<&RotatingTable> {
        self.cursor.newest().and_then(|slot| self.tables[slot].as_ref())
    }

    fn newest_mut(&mut self) -> Option<&mut RotatingTable> {
        let slot = self.cursor.newest()?;
        self.tables[slot].as_mut()
    }

    fn append(&mut self, table: RotatingTable) {
        let size_k = table.size_k();
        let slot = self.cursor.push();
        self.tables[slot] = Some(table);
        self.tables_created += 1;
        debug!(size_k, tables = self.cursor.len(), "appended table");
    }

    fn evict_oldest(&mut self) -> Option<RotatingTable> {
        let slot = self.cursor.pop_oldest()?;
        let table = self.tables[slot].take()?;
        self.tables_evicted += 1;
        info!(
            size_k = table.size_k(),
            count = table.count(),
            tables = self.cursor.len(),
            "evicted oldest table"
        );
        Some(table)
    }

    /// Inserts into the newest table and grows if the insert overflowed a
    /// table that is already past `max_occupancy`.
    pub fn insert_fingerprint(&mut self, fp: Fingerprint) -> Result<()> {
        let max_occupancy = self.config.max_occupancy;
        let Some(newest) = self.newest_mut() else {
            return Ok(());
        };

        let overflowed = match newest.insert(fp) {
            Some(evicted) => {
                trace!(
                    index = evicted.index,
                    "fingerprint displaced out of active table"
                );
                newest.occupancy() > max_occupancy
            }
            None => false,
        };

        if overflowed {
            self.grow_if_needed()?;
        }
        Ok(())
    }

    /// Probes every live table, newest first, until one reports a hit.
    pub fn contains_fingerprint(&mut self, fp: Fingerprint) -> bool {
        let cursor = self.cursor;
        cursor.newest_first().any(|slot| {
            self.tables[slot]
                .as_mut()
                .is_some_and(|table| table.lookup(fp))
        })
    }

    /// Best-effort removal from the newest table holding `fp`.
    pub fn remove_fingerprint(&mut self, fp: Fingerprint) -> bool {
        let cursor = self.cursor;
        cursor.newest_first().any(|slot| {
            self.tables[slot]
                .as_mut()
                .is_some_and(|table| table.remove(fp))
        })
    }

    /// Estimates the size of the next table from the last two windows.
    ///
    /// `r = count / window` for each of the two newest tables, and the growth
    /// factor `r1 / r2` is scaled by how the per-item query rate moved between
    /// them. The result stays within `max_rescale` of the newest table's size
    /// in either direction.
    pub fn best_guess_size(&self) -> usize {
        let mut recent = self.tables();
        let Some(t1) = recent.next() else {
            return self.config.initial_size_k;
        };
        let Some(t2) = recent.next() else {
            return t1.size_k();
        };

        let now = self.config.clock.now_nanos();
        let insert_rate1 = t1.insert_rate_until(now);
        let insert_rate2 = t2.insert_rate_until(t1.created_at());
        let mut load_increase = insert_rate1 / insert_rate2;

        let mut check_scalar = ((100f64).ln() / (self.config.max_tables as f64).ln())
            * (t2.rate_estimate() / t1.rate_estimate());
        if check_scalar.is_nan() {
            check_scalar = 1.0;
        }
        load_increase *= check_scalar;
        if load_increase.is_nan() {
            load_increase = 1.0;
        }

        let max_rescale = self.config.max_rescale;
        let factor = if load_increase > 1.0 {
            load_increase.min(max_rescale)
        } else {
            load_increase.max(1.0 / max_rescale)
        };
        trace!(load_increase, factor, "estimated next table size");

        (factor * t1.size_k() as f64) as usize
    }

    /// Appends a new newest table sized by [`best_guess_size`], evicting old
    /// tables when the ring is full or the memory budget is exhausted.
    ///
    /// The new table is allocated before anything is evicted, so on
    /// `AllocationError` the manager is unchanged.
    ///
    /// [`best_guess_size`]: RotationManager::best_guess_size
    pub fn grow_if_needed(&mut self) -> Result<()> {
        let candidate = self.best_guess_size();

        // Sizes of live tables, oldest first
        let mut sizes: Vec<usize> = self.tables().map(|t| t.size_k()).collect();
        sizes.reverse();
        let max_total = self.config.max_total_size_k();
        let surviving = |evict: usize| sizes[evict..].iter().sum::<usize>();

        let mut evict = usize::from(self.cursor.is_full());
        let budget = max_total.saturating_sub(surviving(evict));
        let mut size_k = candidate.min(budget);
        if size_k < candidate {
            warn!(candidate, budget, "memory budget clamped new table size");
        }
        size_k = size_k.max(self.config.min_size_k);

        while evict < sizes.len() && surviving(evict) + size_k > max_total {
            evict += 1;
        }
        if evict > usize::from(self.cursor.is_full()) {
            warn!(evict, size_k, "evicting extra tables to stay within memory budget");
        }

        let table = RotatingTable::new(size_k, &self.config)?;
        for _ in 0..evict {
            self.evict_oldest();
        }
        self.append(table);
        Ok(())
    }

    /// Drops every table and starts over from a single initial table.
    pub fn clear(&mut self) -> Result<()> {
        let first = RotatingTable::new(self.config.initial_size_k, &self.config)?;
        while self.evict_oldest().is_some() {}
        self.append(first);
        Ok(())
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            tables: self.tables().map(TableSnapshot::from).collect(),
            max_tables: self.max_tables(),
            total_size_k: self.total_size_k(),
            memory_bytes: self.memory_usage(),
            max_memory: self.config.max_memory,
            tables_created: self.tables_created,
            tables_evicted: self.tables_evicted,
        }
    }
}

impl ApproximateSetOps for RotationManager {
    fn insert_item(&mut self, item: &[u8]) -> Result<()> {
        let fp = self.fingerprint(item);
        self.insert_fingerprint(fp)
    }

    fn contains_item(&mut self, item: &[u8]) -> bool {
        let fp = self.fingerprint(item);
        self.contains_fingerprint(fp)
    }

    fn insert_if_absent(&mut self, item: &[u8]) -> Result<bool> {
        let fp = self.fingerprint(item);
        if self.contains_fingerprint(fp) {
            return Ok(false);
        }
        self.insert_fingerprint(fp)?;
        Ok(true)
    }

    fn remove_item(&mut self, item: &[u8]) -> bool {
        let fp = self.fingerprint(item);
        self.remove_fingerprint(fp)
    }
}

impl RotationStats for RotationManager {
    fn table_count(&self) -> usize {
        self.cursor.len()
    }

    fn max_tables(&self) -> usize {
        self.config.max_tables
    }

    fn total_size_k(&self) -> usize {
        self.tables().map(|t| t.size_k()).sum()
    }

    fn tables_created(&self) -> u64 {
        self.tables_created
    }

    fn tables_evicted(&self) -> u64 {
        self.tables_evicted
    }

    fn memory_usage(&self) -> usize {
        self.total_size_k() * SLOT_BYTES
    }
}

impl std::fmt::Debug for RotationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RotationManager {{ tables: {}, max_tables: {}, total_size_k: {}, max_memory: {}, tables_created: {}, tables_evicted: {} }}",
            self.table_count(),
            self.config.max_tables,
            self.total_size_k(),
            self.config.max_memory,
            self.tables_created,
            self.tables_evicted
        )
    }
}
