pub mod bits;
pub mod hash_chain;
pub mod heap;
pub mod ring_buffer;
pub mod trie;
