//! Time-rotated cuckoo filter for approximate duplicate detection.
//!
//! This crate answers "have I seen this item before?" for high-volume streams
//! in bounded memory, forgetting old items as new tables replace old ones.
//!
//! HowTo:
//!    * Tables: the filter is a ring of up to N cuckoo tables: T_1, T_2, …, T_N.
//!    * Fingerprints: each item is hashed once to 128 bits, a 64-bit locator
//!      choosing the first bucket and a 64-bit tag that is actually stored.
//!    * Rotation: the newest table takes all inserts. Once an insert fails to
//!      place a tag and the table is more than half full, a new table is
//!      appended and the oldest one is dropped when the ring is full.
//!
//! Insertion:
//!     * Cuckoo displacement inside the newest table, at most 8 hops.
//!     * A tag still homeless after the last hop is dropped (and triggers
//!       rotation if the table is full enough).
//! Query:
//!     * Two probes per table, newest table first, stopping at the first hit.
//!     * Every probe is timestamped so each table knows how often it is
//!       queried per stored item.
//! Sizing:
//!     * The next table is sized from the insert rate and the query rate of
//!       the last two tables, at most 4x larger or smaller than the newest,
//!       never below 512 slots and never past the total memory budget.
//!
//! Known limitations:
//!     * A tag hashed to exactly 0 reads as an empty slot.
//!     * Lookups do not follow full displacement chains, so a few inserted
//!       items become invisible while still taking a slot.
//!     * Removal does not lower the table's count.
//!     * Not synchronized: wrap the manager in a `Mutex` to share it.

pub mod clock;
pub mod common;
pub mod config;
mod error;
mod hash;
mod manager;
pub mod ring;
mod rotating;
pub mod stats;
mod table;
mod tracker;
pub mod traits;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{FilterConfig, FilterConfigBuilder, FilterConfigBuilderError, SLOT_BYTES};
pub use error::{FilterError, Result};
pub use hash::{Fingerprint, FingerprintFunction, SALT_CONSTANT, default_fingerprint_function};
pub use manager::RotationManager;
pub use rotating::RotatingTable;
pub use stats::{FilterSnapshot, TableSnapshot};
pub use table::{CuckooTable, EvictedFingerprint};
pub use tracker::QueryRateTracker;
pub use traits::{ApproximateSetOps, OccupancyStats, RotationStats};
