//! Fixed-bucket hash index mapping short byte keys to ordered position lists.
//!
//! Used by the LZSS encoder to find back-reference candidates.  Collisions
//! share a bucket and the key itself is not stored, so a lookup may return
//! positions registered under a different key; callers must verify
//! candidates against the window.  Each bucket is an append-at-tail,
//! remove-from-head list.
//!
//! `remove_oldest` deletes the bucket-wide oldest entry, whatever key it was
//! registered under.  That is only sound when insertions and removals
//! process the same key sequence in the same order, as the two ends of a
//! sliding window do; it is the invariant the LZSS slide depends on.

use std::collections::VecDeque;

pub struct ChainedIndex {
    buckets: Vec<VecDeque<usize>>,
    size: usize,
}

impl ChainedIndex {
    /// `size` is fixed for the lifetime of the table; pick a prime away
    /// from powers of two for an even spread.
    pub fn new(size: usize) -> Self {
        Self {
            buckets: vec![VecDeque::new(); size],
            size,
        }
    }
    /// Polynomial accumulation over the key bytes, as `String` hashes.
    fn hash(&self, key: &[u8]) -> usize {
        let mut h: u32 = 0;
        for &b in key {
            h = h.wrapping_mul(31).wrapping_add(b as u32);
        }
        h as usize % self.size
    }
    /// Register `pos` as the newest entry for `key`.
    pub fn insert(&mut self, key: &[u8], pos: usize) {
        let h = self.hash(key);
        self.buckets[h].push_back(pos);
    }
    /// Drop and return the oldest entry in `key`'s bucket.
    pub fn remove_oldest(&mut self, key: &[u8]) -> Option<usize> {
        let h = self.hash(key);
        self.buckets[h].pop_front()
    }
    /// All positions in `key`'s bucket, newest first.
    pub fn candidates(&self, key: &[u8]) -> impl Iterator<Item = &usize> {
        let h = self.hash(key);
        self.buckets[h].iter().rev()
    }
}

// *************** TESTS *****************

#[test]
fn candidates_come_newest_first() {
    let mut index = ChainedIndex::new(6151);
    index.insert(b"abc", 5);
    index.insert(b"abc", 9);
    index.insert(b"abc", 31);
    let found: Vec<usize> = index.candidates(b"abc").copied().collect();
    assert_eq!(found, vec![31, 9, 5]);
}

#[test]
fn removal_is_fifo_per_bucket() {
    let mut index = ChainedIndex::new(6151);
    for pos in [3, 8, 12] {
        index.insert(b"xyz", pos);
    }
    assert_eq!(index.remove_oldest(b"xyz"), Some(3));
    assert_eq!(index.remove_oldest(b"xyz"), Some(8));
    let found: Vec<usize> = index.candidates(b"xyz").copied().collect();
    assert_eq!(found, vec![12]);
}

#[test]
fn removal_takes_bucket_oldest_across_colliding_keys() {
    // [1,0,0] and [0,31,0] both hash to 961: distinct keys, same bucket
    let mut index = ChainedIndex::new(6151);
    index.insert(&[1, 0, 0], 100);
    index.insert(&[0, 31, 0], 200);
    // removing "for" the second key still takes the bucket's oldest entry
    assert_eq!(index.remove_oldest(&[0, 31, 0]), Some(100));
    assert_eq!(index.remove_oldest(&[1, 0, 0]), Some(200));
    assert_eq!(index.remove_oldest(&[1, 0, 0]), None);
}

#[test]
fn lockstep_insert_remove_drains_cleanly() {
    // both window ends see the same key sequence in the same order, so
    // FIFO removal always deletes the position that actually left
    let keys: Vec<[u8; 3]> = (0u16..500)
        .map(|i| [(i % 7) as u8, (i % 31) as u8, (i % 3) as u8])
        .collect();
    let mut index = ChainedIndex::new(6151);
    for (pos, key) in keys.iter().enumerate() {
        index.insert(key, pos);
    }
    for (pos, key) in keys.iter().enumerate() {
        assert_eq!(index.remove_oldest(key), Some(pos));
    }
    for key in &keys {
        assert_eq!(index.candidates(key).next(), None);
    }
}
