//! Index arithmetic for fixed-capacity circular buffers.
//!
//! ```text
//!   capacity = 4, head = 1, len = 3
//!
//!   slot:     [ 0 ][ 1 ][ 2 ][ 3 ]
//!              new  ---  old  mid
//!
//!   logical  0 => oldest  => (head + capacity - len) % capacity = 2
//!   logical -1 => newest  => 0
//! ```
//!
//! Logical indices are signed and wrap over the live entries, physical
//! indices are always in `0..capacity`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingCursor {
    capacity: usize,
    head: usize,
    len: usize,
    written: u64,
}

impl RingCursor {
    /// `capacity` must be non-zero.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring capacity must be non-zero");
        Self {
            capacity,
            head: 0,
            len: 0,
            written: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Total number of pushes over the lifetime of the cursor.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Claims the next physical slot. When full, the oldest entry is the one
    /// being overwritten.
    pub fn push(&mut self) -> usize {
        let slot = self.head;
        self.head = (self.head + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
        self.written += 1;
        slot
    }

    /// Releases the oldest entry and returns the slot it lived in.
    pub fn pop_oldest(&mut self) -> Option<usize> {
        let slot = self.physical(0)?;
        self.len -= 1;
        Some(slot)
    }

    /// Maps a logical index (`0` oldest, `-1` newest) to a physical slot.
    ///
    /// Indices outside `-len..len` wrap around the live entries.
    pub fn physical(&self, logical: isize) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let oldest = (self.head + self.capacity - self.len) % self.capacity;
        let offset = logical.rem_euclid(self.len as isize) as usize;
        Some((oldest + offset) % self.capacity)
    }

    pub fn newest(&self) -> Option<usize> {
        self.physical(-1)
    }

    pub fn oldest(&self) -> Option<usize> {
        self.physical(0)
    }

    /// Physical slots from newest to oldest.
    pub fn newest_first(&self) -> impl Iterator<Item = usize> + '_ {
        (1..=self.len).filter_map(move |back| self.physical(-(back as isize)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cursor_has_no_slots() {
        let cursor = RingCursor::new(4);
        assert!(cursor.is_empty());
        assert_eq!(cursor.newest(), None);
        assert_eq!(cursor.oldest(), None);
        assert_eq!(cursor.newest_first().count(), 0);
    }

    #[test]
    fn test_before_wrap() {
        let mut cursor = RingCursor::new(4);
        assert_eq!(cursor.push(), 0);
        assert_eq!(cursor.push(), 1);
        assert_eq!(cursor.push(), 2);

        assert_eq!(cursor.len(), 3);
        assert_eq!(cursor.oldest(), Some(0));
        assert_eq!(cursor.newest(), Some(2));
        assert_eq!(cursor.physical(-2), Some(1));
        assert_eq!(cursor.newest_first().collect::<Vec<_>>(), vec![2, 1, 0]);
    }

    #[test]
    fn test_after_wrap() {
        let mut cursor = RingCursor::new(3);
        for _ in 0..5 {
            cursor.push();
        }
        // Writes 0..5 land in slots 0,1,2,0,1 so 2 holds the oldest
        assert!(cursor.is_full());
        assert_eq!(cursor.written(), 5);
        assert_eq!(cursor.oldest(), Some(2));
        assert_eq!(cursor.newest(), Some(1));
        assert_eq!(cursor.newest_first().collect::<Vec<_>>(), vec![1, 0, 2]);
    }

    #[test]
    fn test_pop_oldest_then_push_reuses_slot() {
        let mut cursor = RingCursor::new(3);
        for _ in 0..3 {
            cursor.push();
        }
        assert_eq!(cursor.pop_oldest(), Some(0));
        assert_eq!(cursor.len(), 2);
        assert_eq!(cursor.oldest(), Some(1));
        assert_eq!(cursor.push(), 0);
        assert_eq!(cursor.newest(), Some(0));
        assert_eq!(cursor.oldest(), Some(1));
    }

    #[test]
    fn test_pop_until_empty() {
        let mut cursor = RingCursor::new(2);
        cursor.push();
        cursor.push();
        cursor.push();
        assert_eq!(cursor.pop_oldest(), Some(1));
        assert_eq!(cursor.pop_oldest(), Some(0));
        assert_eq!(cursor.pop_oldest(), None);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_logical_index_wraps_over_live_entries() {
        let mut cursor = RingCursor::new(8);
        cursor.push();
        cursor.push();
        assert_eq!(cursor.physical(2), cursor.physical(0));
        assert_eq!(cursor.physical(-3), cursor.physical(-1));
    }
}
