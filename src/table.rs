//! Fixed-capacity cuckoo table of 64-bit fingerprint tags.
//!
//! Each slot holds one tag, `0` meaning empty. An item's first bucket is
//! `locator % size_k`; every next bucket is `(index ^ tag) % size_k`.
//!
//! Insert follows that chain for at most `max_tries` hops, swapping the
//! incoming tag with whatever occupies the slot. Lookup only probes the first
//! two buckets, so a tag pushed further down a chain keeps its slot but can no
//! longer be found. Lookup cost stays at two probes no matter how full the
//! table gets; those unreachable tags are the price.
use crate::config::MAX_TRIES;
use crate::error::{FilterError, Result};
use crate::hash::Fingerprint;
use crate::traits::OccupancyStats;

/// A fingerprint that fell out of the table at the end of a displacement
/// chain. `index` is the bucket it would have moved to next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictedFingerprint {
    pub index: usize,
    pub tag: u64,
}

pub struct CuckooTable {
    slots: Vec<u64>,
    count: usize,
    max_tries: usize,
}

impl CuckooTable {
    pub fn new(size_k: usize) -> Result<Self> {
        Self::with_max_tries(size_k, MAX_TRIES)
    }

    pub fn with_max_tries(size_k: usize, max_tries: usize) -> Result<Self> {
        if size_k == 0 {
            return Err(FilterError::ZeroCapacity);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(size_k)
            .map_err(|source| FilterError::AllocationError { size_k, source })?;
        slots.resize(size_k, 0);

        Ok(Self {
            slots,
            count: 0,
            max_tries,
        })
    }

    pub fn max_tries(&self) -> usize {
        self.max_tries
    }

    fn bucket(&self, locator: u64) -> usize {
        (locator % self.slots.len() as u64) as usize
    }

    fn next_bucket(&self, index: usize, tag: u64) -> usize {
        ((index as u64 ^ tag) % self.slots.len() as u64) as usize
    }

    /// Places `fp`, displacing occupants along its chain.
    ///
    /// Returns `None` when the tag was stored (or already present). Returns
    /// the last displaced fingerprint when the chain ran out of hops; that
    /// fingerprint is no longer stored anywhere.
    pub fn insert(&mut self, fp: Fingerprint) -> Option<EvictedFingerprint> {
        let mut index = self.bucket(fp.locator);
        let mut tag = fp.tag;

        for _ in 0..self.max_tries {
            if self.slots[index] == tag {
                return None;
            }
            let displaced = std::mem::replace(&mut self.slots[index], tag);
            if displaced == 0 {
                self.count += 1;
                return None;
            }
            tag = displaced;
            index = self.next_bucket(index, tag);
        }

        Some(EvictedFingerprint { index, tag })
    }

    /// Two-probe membership check.
    pub fn contains(&self, fp: Fingerprint) -> bool {
        let index = self.bucket(fp.locator);
        if self.slots[index] == fp.tag {
            return true;
        }
        self.slots[self.next_bucket(index, fp.tag)] == fp.tag
    }

    /// Clears the first slot holding `fp.tag` along its insert chain.
    ///
    /// `count` is left as is, so after removals it overstates occupancy.
    pub fn remove(&mut self, fp: Fingerprint) -> bool {
        let mut index = self.bucket(fp.locator);

        for _ in 0..self.max_tries {
            match self.slots[index] {
                0 => return false,
                tag if tag == fp.tag => {
                    self.slots[index] = 0;
                    return true;
                }
                _ => index = self.next_bucket(index, fp.tag),
            }
        }
        false
    }

    /// Slots currently holding a tag.
    pub fn occupied_slots(&self) -> usize {
        self.slots.iter().filter(|&&slot| slot != 0).count()
    }
}

impl OccupancyStats for CuckooTable {
    fn size_k(&self) -> usize {
        self.slots.len()
    }

    fn count(&self) -> usize {
        self.count
    }
}

impl std::fmt::Debug for CuckooTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CuckooTable {{ size_k: {}, count: {}, max_tries: {} }}",
            self.slots.len(),
            self.count,
            self.max_tries
        )
    }
}
