//! Point-in-time statistics. These describe a filter, they cannot rebuild one.
use crate::common::{bytes2hr, nanos2secs};
use crate::rotating::RotatingTable;
use crate::traits::OccupancyStats;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub size_k: usize,
    pub count: usize,
    pub occupancy: f64,
    pub memory_bytes: usize,
    pub age_nanos: u64,
    pub queries: u64,
    /// `None` while the rate is NaN
    pub queries_per_item_second: Option<f64>,
}

impl From<&RotatingTable> for TableSnapshot {
    fn from(table: &RotatingTable) -> Self {
        let rate = table.rate_estimate();
        Self {
            size_k: table.size_k(),
            count: table.count(),
            occupancy: table.occupancy(),
            memory_bytes: table.memory_bytes(),
            age_nanos: table.age_nanos(),
            queries: table.queries().total_queries(),
            queries_per_item_second: (!rate.is_nan()).then_some(rate),
        }
    }
}

impl fmt::Display for TableSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Table size_k:            {}", self.size_k)?;
        writeln!(f, "Memory usage:            {}", bytes2hr(self.memory_bytes))?;
        writeln!(
            f,
            "Elements added:          {} ({:.1}%)",
            self.count,
            self.occupancy * 100.0
        )?;
        writeln!(f, "Age:                     {:.3}s", nanos2secs(self.age_nanos))?;
        match self.queries_per_item_second {
            Some(rate) => write!(f, "Checks per count second: {rate:.6}"),
            None => write!(f, "Checks per count second: n/a"),
        }
    }
}

/// Newest table first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSnapshot {
    pub tables: Vec<TableSnapshot>,
    pub max_tables: usize,
    pub total_size_k: usize,
    pub memory_bytes: usize,
    pub max_memory: usize,
    pub tables_created: u64,
    pub tables_evicted: u64,
}

impl fmt::Display for FilterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Number of tables in filter:  {} / {}",
            self.tables.len(),
            self.max_tables
        )?;
        writeln!(f, "Total size_k:                {}", self.total_size_k)?;
        writeln!(
            f,
            "Total memory usage:          {} of {}",
            bytes2hr(self.memory_bytes),
            bytes2hr(self.max_memory)
        )?;
        write!(
            f,
            "Tables created / evicted:    {} / {}",
            self.tables_created, self.tables_evicted
        )
    }
}
