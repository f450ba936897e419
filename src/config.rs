use crate::clock::{Clock, MonotonicClock};
use crate::error::{FilterError, Result};
use crate::hash::{FingerprintFunction, SALT_CONSTANT, default_fingerprint_function};
use derive_builder::Builder;
use std::sync::Arc;

/// Bytes taken by a single table slot.
pub const SLOT_BYTES: usize = std::mem::size_of::<u64>();

pub const INITIAL_SIZE_K: usize = 4096;
/// Number of iterations before an insert drops the displaced fingerprint
pub const MAX_TRIES: usize = 8;
/// Slot memory of all live tables, in bytes
pub const MAX_MEMORY: usize = 10 * 1024 * 1024;
pub const MIN_SIZE_K: usize = 512;
pub const MAX_TABLES: usize = 5;
pub const MAX_OCCUPANCY: f64 = 0.5;
pub const QUERY_HISTORY_SIZE: usize = 2 << 9;
pub const MAX_RESCALE: f64 = 4.0;

/// Tunables shared by every table of a rotating filter.
#[derive(Clone, Debug, Builder)]
#[builder(pattern = "owned")]
pub struct FilterConfig {
    /// Slots in the first table
    #[builder(default = "INITIAL_SIZE_K")]
    pub initial_size_k: usize,

    /// Displacement hops before an insert gives up and drops a fingerprint
    #[builder(default = "MAX_TRIES")]
    pub max_tries: usize,

    /// Memory budget in bytes for the slots of all live tables
    #[builder(default = "MAX_MEMORY")]
    pub max_memory: usize,

    /// Smallest table the manager will allocate
    #[builder(default = "MIN_SIZE_K")]
    pub min_size_k: usize,

    /// Maximum number of live tables
    #[builder(default = "MAX_TABLES")]
    pub max_tables: usize,

    /// Grow once an insert overflows and the active table is fuller than this
    #[builder(default = "MAX_OCCUPANCY")]
    pub max_occupancy: f64,

    /// Query timestamps kept per table for rate estimation
    #[builder(default = "QUERY_HISTORY_SIZE")]
    pub query_history_size: usize,

    /// Largest growth (and inverse of largest shrink) per rotation
    #[builder(default = "MAX_RESCALE")]
    pub max_rescale: f64,

    /// Seed passed to the fingerprint function
    #[builder(default = "SALT_CONSTANT")]
    pub hash_seed: u32,

    /// Function used to fingerprint items
    #[builder(default = "default_fingerprint_function")]
    pub fingerprint_function: FingerprintFunction,

    /// Time source for creation stamps and query tracking
    #[builder(default = "Arc::new(MonotonicClock::new())")]
    pub clock: Arc<dyn Clock>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            initial_size_k: INITIAL_SIZE_K,
            max_tries: MAX_TRIES,
            max_memory: MAX_MEMORY,
            min_size_k: MIN_SIZE_K,
            max_tables: MAX_TABLES,
            max_occupancy: MAX_OCCUPANCY,
            query_history_size: QUERY_HISTORY_SIZE,
            max_rescale: MAX_RESCALE,
            hash_seed: SALT_CONSTANT,
            fingerprint_function: default_fingerprint_function,
            clock: Arc::new(MonotonicClock::new()),
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.initial_size_k == 0 {
            return Err(FilterError::InvalidConfig(
                "Initial size must be > 0".into(),
            ));
        }
        if self.min_size_k == 0 {
            return Err(FilterError::InvalidConfig(
                "Minimum size must be > 0".into(),
            ));
        }
        if self.max_tries == 0 {
            return Err(FilterError::InvalidConfig(
                "Max tries must be > 0".into(),
            ));
        }
        if self.max_tables == 0 {
            return Err(FilterError::InvalidConfig(
                "Max tables must be > 0".into(),
            ));
        }
        if self.query_history_size == 0 {
            return Err(FilterError::InvalidConfig(
                "Query history size must be > 0".into(),
            ));
        }
        if !(self.max_occupancy > 0.0 && self.max_occupancy <= 1.0) {
            return Err(FilterError::InvalidConfig(
                "Max occupancy must be in (0, 1]".into(),
            ));
        }
        if !(self.max_rescale.is_finite() && self.max_rescale >= 1.0) {
            return Err(FilterError::InvalidConfig(
                "Max rescale must be finite and >= 1".into(),
            ));
        }
        if self.min_size_k.saturating_mul(SLOT_BYTES) > self.max_memory {
            return Err(FilterError::InvalidConfig(format!(
                "Minimum table ({} slots) exceeds memory budget of {} bytes",
                self.min_size_k, self.max_memory
            )));
        }
        if self.initial_size_k.saturating_mul(SLOT_BYTES) > self.max_memory {
            return Err(FilterError::InvalidConfig(format!(
                "Initial table ({} slots) exceeds memory budget of {} bytes",
                self.initial_size_k, self.max_memory
            )));
        }
        Ok(())
    }

    /// Largest number of slots all live tables may hold together.
    pub fn max_total_size_k(&self) -> usize {
        self.max_memory / SLOT_BYTES
    }

    /// Load tunables from `RCF_*` environment variables (and `.env`).
    ///
    /// Unset variables keep their default value. The result is validated.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            initial_size_k: env_or("RCF_INITIAL_SIZE_K", defaults.initial_size_k)?,
            max_tries: env_or("RCF_MAX_TRIES", defaults.max_tries)?,
            max_memory: env_or("RCF_MAX_MEMORY", defaults.max_memory)?,
            min_size_k: env_or("RCF_MIN_SIZE_K", defaults.min_size_k)?,
            max_tables: env_or("RCF_MAX_TABLES", defaults.max_tables)?,
            max_occupancy: env_or("RCF_MAX_OCCUPANCY", defaults.max_occupancy)?,
            query_history_size: env_or(
                "RCF_QUERY_HISTORY_SIZE",
                defaults.query_history_size,
            )?,
            max_rescale: env_or("RCF_MAX_RESCALE", defaults.max_rescale)?,
            hash_seed: env_or("RCF_HASH_SEED", defaults.hash_seed)?,
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "env")]
fn env_or<T>(var_name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| {
            FilterError::EnvParseError {
                var_name: var_name.to_string(),
                value,
                error: e.to_string(),
            }
        }),
        Err(_) => Ok(default),
    }
}
