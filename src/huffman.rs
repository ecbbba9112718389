//! Static Huffman coding.
//!
//! One prefix tree is built per call from the byte frequencies of the
//! input and transmitted in the header, so the decoder never recomputes
//! weights.  A pseudo-EoF leaf rides along in the tree; its code closes
//! the payload, which lets the stream survive the zero-padding that fills
//! the final byte.
//!
//! Header layout after the 4-byte tag: the tree in preorder (`0` =
//! internal node, `1` + 8-bit value = leaf), then one more root-to-leaf
//! path marking which leaf is the EoF.  The EoF leaf is written as an
//! ordinary leaf, so it costs no flag bit per leaf in the tree encoding.

use crate::tools::bits::{BitReader, BitWriter};
use crate::tools::heap::MinHeap;
use crate::Error;
use bit_vec::BitVec;

/// Identifier at the head of Huffman compressed streams.
pub const HUFFMAN_TAG: u32 = 0x0703_1986;

const EOF_INDEX: usize = 256;

/// Node in the tree arena; children are arena indices.
#[derive(Clone, Copy)]
enum Node {
    Leaf(u8),
    Eof,
    Internal(usize, usize),
}

/// Huffman codec handle.
pub struct Huffman;

impl crate::Codec for Huffman {
    fn name(&self) -> &'static str {
        "Huffman"
    }
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        compress(data)
    }
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        expand(data)
    }
}

/// Main compression function.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut writer = BitWriter::new();
    writer.write_bytes(&HUFFMAN_TAG.to_be_bytes());

    let (arena, root) = build_tree(data);
    encode_tree(&arena, root, &mut writer);

    let codes = code_table(&arena, root);
    let eof_code = codes[EOF_INDEX].as_ref().unwrap(); // tree always carries the EoF leaf

    // the EoF code doubles as the mark-EoF path consumed by the decoder
    write_code(eof_code, &mut writer);
    for &b in data {
        // every input byte has a nonzero count, hence a leaf
        write_code(codes[b as usize].as_ref().unwrap(), &mut writer);
    }
    write_code(eof_code, &mut writer);

    Ok(writer.finish())
}

/// Main decompression function.
pub fn expand(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut reader = BitReader::new(data);
    if reader.read_bytes(4)? != HUFFMAN_TAG.to_be_bytes() {
        return Err(Error::InvalidHeader);
    }
    let (arena, root) = decode_tree(&mut reader)?;
    let eof = mark_eof(&arena, root, &mut reader)?;

    let mut ans = Vec::new();
    loop {
        let mut idx = root;
        while let Node::Internal(left, right) = arena[idx] {
            idx = match reader.read_bit()? {
                true => right,
                false => left,
            };
        }
        if idx == eof {
            return Ok(ans);
        }
        if let Node::Leaf(value) = arena[idx] {
            ans.push(value);
        }
    }
}

/// Count byte frequencies and combine the two lightest nodes until one
/// remains.  The pseudo-EoF leaf joins as a normal heap participant, so
/// every tree has exactly one.  Heap keys are `(weight, arena index)`:
/// deterministic, but deliberately not canonical, since the tree travels
/// in the header.
fn build_tree(data: &[u8]) -> (Vec<Node>, usize) {
    let mut freqs = [0u64; 256];
    for &b in data {
        freqs[b as usize] += 1;
    }
    let mut arena: Vec<Node> = Vec::new();
    let mut heap: MinHeap<(u64, usize)> = MinHeap::new();
    for (value, &weight) in freqs.iter().enumerate() {
        if weight > 0 {
            heap.push((weight, arena.len()));
            arena.push(Node::Leaf(value as u8));
        }
    }
    heap.push((0, arena.len()));
    arena.push(Node::Eof);
    log::debug!("huffman tree spans {} leaves", arena.len());

    while heap.len() > 1 {
        let (lw, left) = heap.pop().unwrap();
        let (rw, right) = heap.pop().unwrap();
        heap.push((lw + rw, arena.len()));
        arena.push(Node::Internal(left, right));
    }
    let (_, root) = heap.pop().unwrap(); // heap cannot be empty, EoF is always pushed
    (arena, root)
}

/// Preorder serialization with an explicit stack; recursion depth would be
/// input-controlled on skewed trees.
fn encode_tree(arena: &[Node], root: usize, writer: &mut BitWriter) {
    let mut stack = vec![root];
    while let Some(idx) = stack.pop() {
        match arena[idx] {
            Node::Leaf(value) => {
                writer.write_bit(true);
                writer.write_bits(value as u32, 8);
            }
            Node::Eof => {
                // indistinguishable from an ordinary leaf in the stream
                writer.write_bit(true);
                writer.write_bits(0, 8);
            }
            Node::Internal(left, right) => {
                writer.write_bit(false);
                stack.push(right);
                stack.push(left);
            }
        }
    }
}

/// Inverse of `encode_tree`.  Internal nodes are created with placeholder
/// children and patched as the preorder stream attaches subtrees.
fn decode_tree(reader: &mut BitReader) -> Result<(Vec<Node>, usize), Error> {
    let mut arena: Vec<Node> = Vec::new();
    let mut pending: Vec<usize> = Vec::new(); // internal nodes still missing a child
    loop {
        let leaf = reader.read_bit()?;
        let idx = arena.len();
        match leaf {
            true => arena.push(Node::Leaf(reader.read_bits(8)? as u8)),
            false => arena.push(Node::Internal(usize::MAX, usize::MAX)),
        }
        if idx > 0 {
            let parent = *pending.last().ok_or(Error::InvalidHeader)?;
            match arena[parent] {
                Node::Internal(left, right) if left == usize::MAX => {
                    arena[parent] = Node::Internal(idx, right);
                }
                Node::Internal(left, _) => {
                    arena[parent] = Node::Internal(left, idx);
                    pending.pop();
                }
                _ => return Err(Error::InvalidHeader),
            }
        }
        if !leaf {
            pending.push(idx);
        } else if pending.is_empty() {
            // tree complete; a lone leaf (empty input) is a valid tree
            return Ok((arena, 0));
        }
    }
}

/// Walk the freshly parsed tree along the mark path; the leaf it lands on
/// is the pseudo-EoF.
fn mark_eof(arena: &[Node], root: usize, reader: &mut BitReader) -> Result<usize, Error> {
    let mut idx = root;
    while let Node::Internal(left, right) = arena[idx] {
        idx = match reader.read_bit()? {
            true => right,
            false => left,
        };
    }
    Ok(idx)
}

/// Derive the leaf-to-code table, again with an explicit stack.  Index 256
/// holds the EoF code.
fn code_table(arena: &[Node], root: usize) -> Vec<Option<BitVec>> {
    let mut codes: Vec<Option<BitVec>> = vec![None; 257];
    let mut stack = vec![(root, BitVec::new())];
    while let Some((idx, code)) = stack.pop() {
        match arena[idx] {
            Node::Leaf(value) => codes[value as usize] = Some(code),
            Node::Eof => codes[EOF_INDEX] = Some(code),
            Node::Internal(left, right) => {
                let mut zero = code.clone();
                zero.push(false);
                let mut one = code;
                one.push(true);
                stack.push((left, zero));
                stack.push((right, one));
            }
        }
    }
    codes
}

fn write_code(code: &BitVec, writer: &mut BitWriter) {
    for bit in code.iter() {
        writer.write_bit(bit);
    }
}

// *************** TESTS *****************

#[test]
fn empty_input_wire_format() {
    // lone EoF leaf: tag, "1" + value 0, empty mark path, empty codes, pad
    let compressed = compress(b"").expect("compression failed");
    assert_eq!(compressed, hex::decode("070319868000").unwrap());
    let expanded = expand(&compressed).expect("expansion failed");
    assert!(expanded.is_empty());
}

#[test]
fn single_byte_wire_format() {
    // root = internal(EoF, 'A'); tree 0 1 00000000 1 01000001,
    // mark path "0", payload "1", closing EoF "0", pad
    let compressed = compress(b"A").expect("compression failed");
    assert_eq!(compressed, hex::decode("07031986402828").unwrap());
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(expanded, b"A".to_vec());
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress(test_data).expect("compression failed");
    assert_eq!(compressed[0..4], HUFFMAN_TAG.to_be_bytes());
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(), expanded);
}

#[test]
fn single_distinct_byte_input() {
    // the tree degenerates to one real leaf plus the EoF leaf under one root
    let test_data = vec![b'A'; 1200];
    let compressed = compress(&test_data).expect("compression failed");
    // internal root, then the EoF leaf (value 0), then leaf 'A'
    assert_eq!(&compressed[4..6], &hex::decode("4028").unwrap()[..]);
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(test_data, expanded);
}

#[test]
fn wrong_tag_is_rejected() {
    let compressed = compress(b"abcabc").expect("compression failed");
    for i in 0..4 {
        let mut bad = compressed.clone();
        bad[i] ^= 0xff;
        assert_eq!(expand(&bad), Err(Error::InvalidHeader));
    }
}

#[test]
fn truncation_is_detected() {
    let compressed = compress(b"the quick brown fox").expect("compression failed");
    assert_eq!(expand(&compressed[..4]), Err(Error::UnexpectedEndOfStream));
    assert_eq!(
        expand(&compressed[..compressed.len() - 1]),
        Err(Error::UnexpectedEndOfStream)
    );
}
