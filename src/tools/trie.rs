//! Arena trie backing the LZW dictionary.
//!
//! Entries live in a flat vector addressed by dictionary index: 0-255 are
//! the single-byte sequences, 256 is reserved for the end-of-stream code,
//! and everything above is a `(prefix index, last byte)` pair.  A sequence
//! is rebuilt by walking prefix links back to a root.  A side map from
//! `(prefix, byte)` to child index serves the encoder's longest-match
//! lookups, the same pair-keyed map idea as a `HashMap<(usize,usize),_>`.

use std::collections::HashMap;

/// 256 single-byte roots plus the reserved end-of-stream slot.
const ROOTS: usize = 257;

pub struct PrefixTrie {
    entries: Vec<(usize, u8)>,
    children: HashMap<(usize, u8), usize>,
}

impl PrefixTrie {
    pub fn new() -> Self {
        let mut trie = Self {
            entries: Vec::with_capacity(ROOTS),
            children: HashMap::new(),
        };
        for b in 0..256 {
            trie.entries.push((b, b as u8));
        }
        trie.entries.push((256, 0)); // reserved, never dereferenced
        trie
    }
    /// Number of entries; also the index the next `push` will assign.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    /// Flush back to the initial 257-entry state.
    pub fn reset(&mut self) {
        self.entries.truncate(ROOTS);
        self.children.clear();
    }
    /// Index of the sequence `prefix` + `next`, if it has been defined.
    pub fn child(&self, prefix: usize, next: u8) -> Option<usize> {
        self.children.get(&(prefix, next)).copied()
    }
    /// Define the sequence `prefix` + `next` under the next free index.
    /// The prefix must already exist: entries are only ever appended on top
    /// of sequences the dictionary has seen.
    pub fn push(&mut self, prefix: usize, next: u8) -> usize {
        debug_assert!(prefix < self.entries.len());
        let index = self.entries.len();
        self.entries.push((prefix, next));
        self.children.insert((prefix, next), index);
        index
    }
    /// Byte sequence stored under `code`, or `None` for the reserved slot
    /// and for indices that have not been assigned yet.
    pub fn bytes(&self, code: usize) -> Option<Vec<u8>> {
        if code == 256 || code >= self.entries.len() {
            return None;
        }
        let mut rev = Vec::new();
        let mut idx = code;
        loop {
            let (prefix, last) = self.entries[idx];
            rev.push(last);
            if idx < 256 {
                break;
            }
            idx = prefix;
        }
        rev.reverse();
        Some(rev)
    }
}

// *************** TESTS *****************

#[test]
fn roots_are_single_bytes() {
    let trie = PrefixTrie::new();
    assert_eq!(trie.len(), 257);
    assert_eq!(trie.bytes(0), Some(vec![0]));
    assert_eq!(trie.bytes(65), Some(vec![65]));
    assert_eq!(trie.bytes(255), Some(vec![255]));
    assert_eq!(trie.bytes(256), None);
    assert_eq!(trie.bytes(257), None);
}

#[test]
fn sequences_grow_by_one_byte() {
    let mut trie = PrefixTrie::new();
    let ab = trie.push(b'a' as usize, b'b');
    assert_eq!(ab, 257);
    let abc = trie.push(ab, b'c');
    assert_eq!(trie.child(b'a' as usize, b'b'), Some(ab));
    assert_eq!(trie.child(ab, b'c'), Some(abc));
    assert_eq!(trie.child(ab, b'z'), None);
    assert_eq!(trie.bytes(abc), Some(b"abc".to_vec()));
}

#[test]
fn reset_restores_initial_state() {
    let mut trie = PrefixTrie::new();
    let ab = trie.push(b'a' as usize, b'b');
    trie.push(ab, b'c');
    trie.reset();
    assert_eq!(trie.len(), 257);
    assert_eq!(trie.child(b'a' as usize, b'b'), None);
    assert_eq!(trie.bytes(257), None);
}
