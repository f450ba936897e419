use crate::clock::Clock;
use crate::config::FilterConfig;
use crate::error::Result;
use crate::hash::Fingerprint;
use crate::table::{CuckooTable, EvictedFingerprint};
use crate::tracker::QueryRateTracker;
use crate::traits::OccupancyStats;
use std::sync::Arc;

/// A cuckoo table stamped with its creation time that tracks how often it is
/// queried. This is the unit the rotation manager adds and retires.
pub struct RotatingTable {
    table: CuckooTable,
    queries: QueryRateTracker,
    created_at: u64,
    clock: Arc<dyn Clock>,
}

impl RotatingTable {
    /// Rejects an invalid `config` before allocating anything.
    pub fn new(size_k: usize, config: &FilterConfig) -> Result<Self> {
        config.validate()?;
        let table = CuckooTable::with_max_tries(size_k, config.max_tries)?;
        let queries = QueryRateTracker::new(config.query_history_size)?;
        let clock = Arc::clone(&config.clock);

        Ok(Self {
            table,
            queries,
            created_at: clock.now_nanos(),
            clock,
        })
    }

    /// Membership check that counts towards the query rate.
    pub fn lookup(&mut self, fp: Fingerprint) -> bool {
        self.queries.record_query(self.clock.now_nanos());
        self.table.contains(fp)
    }

    /// Inserts are not timed, only lookups feed the rate.
    pub fn insert(&mut self, fp: Fingerprint) -> Option<EvictedFingerprint> {
        self.table.insert(fp)
    }

    pub fn remove(&mut self, fp: Fingerprint) -> bool {
        self.table.remove(fp)
    }

    /// Queries per stored item per second, NaN without query history.
    pub fn rate_estimate(&self) -> f64 {
        self.queries
            .queries_per_stored_item_per_second(self.table.count())
    }

    /// Items stored per nanosecond between creation and `end_nanos`.
    pub fn insert_rate_until(&self, end_nanos: u64) -> f64 {
        self.table.count() as f64 / end_nanos.saturating_sub(self.created_at) as f64
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn age_nanos(&self) -> u64 {
        self.clock.now_nanos().saturating_sub(self.created_at)
    }

    pub fn table(&self) -> &CuckooTable {
        &self.table
    }

    pub fn queries(&self) -> &QueryRateTracker {
        &self.queries
    }
}

impl OccupancyStats for RotatingTable {
    fn size_k(&self) -> usize {
        self.table.size_k()
    }

    fn count(&self) -> usize {
        self.table.count()
    }
}

impl std::fmt::Debug for RotatingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RotatingTable {{ size_k: {}, count: {}, created_at: {}, queries: {} }}",
            self.table.size_k(),
            self.table.count(),
            self.created_at,
            self.queries.total_queries()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::FilterConfigBuilder;

    fn config_with_clock(clock: Arc<ManualClock>) -> FilterConfig {
        FilterConfigBuilder::default()
            .clock(clock)
            .query_history_size(16)
            .build()
            .expect("Unable to build FilterConfig")
    }

    #[test]
    fn test_zero_query_history_rejected() {
        let config = FilterConfig {
            query_history_size: 0,
            ..config_with_clock(Arc::new(ManualClock::new(0)))
        };
        assert!(matches!(
            RotatingTable::new(512, &config),
            Err(crate::error::FilterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_creation_time_from_clock() {
        let clock = Arc::new(ManualClock::new(1_000));
        let table = RotatingTable::new(64, &config_with_clock(clock)).unwrap();
        assert_eq!(table.created_at(), 1_000);
        assert_eq!(table.size_k(), 64);
    }

    #[test]
    fn test_lookup_records_but_insert_does_not() {
        let clock = Arc::new(ManualClock::new(0));
        let mut table =
            RotatingTable::new(64, &config_with_clock(clock.clone())).unwrap();
        let fp = Fingerprint::new(7, 0x99);

        table.insert(fp);
        table.remove(Fingerprint::new(1, 0x1));
        assert_eq!(table.queries().total_queries(), 0);

        clock.set(10);
        assert!(table.lookup(fp));
        clock.set(20);
        assert!(!table.lookup(Fingerprint::new(8, 0x42)));
        assert_eq!(table.queries().total_queries(), 2);
        assert_eq!(table.queries().get(0), Some(10));
        assert_eq!(table.queries().get(-1), Some(20));
    }

    #[test]
    fn test_rate_estimate_uses_table_count() {
        let clock = Arc::new(ManualClock::new(0));
        let mut table =
            RotatingTable::new(64, &config_with_clock(clock.clone())).unwrap();
        assert!(table.rate_estimate().is_nan());

        for i in 1..=4u64 {
            table.insert(Fingerprint::new(i, i));
        }
        clock.set(0);
        table.lookup(Fingerprint::new(1, 1));
        clock.set(1_000_000_000);
        table.lookup(Fingerprint::new(2, 2));

        // 2 samples / (4 items * 1 s)
        assert!((table.rate_estimate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_insert_rate_until() {
        let clock = Arc::new(ManualClock::new(100));
        let mut table =
            RotatingTable::new(64, &config_with_clock(clock.clone())).unwrap();
        for i in 1..=10u64 {
            table.insert(Fingerprint::new(i, i));
        }
        assert!((table.insert_rate_until(200) - 0.1).abs() < 1e-12);
        assert!(table.insert_rate_until(100).is_infinite());
    }
}
