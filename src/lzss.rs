//! LZSS compression.
//!
//! The stream after the 4-byte tag is a sequence of flagged blocks:
//! `0` + 8-bit literal, or `1` + 12-bit offset + 4-bit (length - 3).
//! Offsets count back from the current position, so offset 0 is impossible
//! in valid data and serves as the end-of-stream pointer.
//!
//! The encoder keeps one circular window holding both the 4095-byte prefix
//! history and the 18-byte lookahead, plus a hash index over every 3-byte
//! sequence in the prefix.  Index entries are registered as the cursor
//! passes a position and the oldest bucket entry is dropped when a position
//! falls out of the window, so both ends process the same key sequence in
//! lockstep (see `tools::hash_chain`).

use crate::tools::bits::{BitReader, BitWriter};
use crate::tools::hash_chain::ChainedIndex;
use crate::tools::ring_buffer::SlidingWindow;
use crate::Error;

/// Identifier at the head of LZSS compressed streams.
pub const LZSS_TAG: u32 = 0x0707_2017;

/// Pointers cost 17 bits; below this length literals are cheaper.
const THRESHOLD: usize = 3;
/// 12-bit offsets, with 0 reserved as the EoF pointer.
const PREFIX_SIZE: usize = 4095;
/// 4-bit length field stores length - 3, so 3..=18.
const MAX_MATCH: usize = 15 + THRESHOLD;
/// The window holds the prefix and the lookahead at once.
const WINDOW_SIZE: usize = PREFIX_SIZE + MAX_MATCH;
/// Prime bucket count away from any power of two; at most ~4100 live
/// entries gives a load factor around 0.67.
const BUCKETS: usize = 6151;

/// LZSS codec handle.
pub struct Lzss;

impl crate::Codec for Lzss {
    fn name(&self) -> &'static str {
        "LZSS"
    }
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        compress(data)
    }
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        expand(data)
    }
}

/// Sliding window plus the hash index over its prefix half.  The window
/// cursor separates encoded history from the unprocessed lookahead.
struct WindowOperator<'a> {
    input: &'a [u8],
    window: SlidingWindow<u8>,
    index: ChainedIndex,
    /// number of input bytes inserted into the window so far
    fed: usize,
}

impl<'a> WindowOperator<'a> {
    fn new(input: &'a [u8]) -> Result<Self, Error> {
        let mut operator = Self {
            input,
            window: SlidingWindow::new(0, WINDOW_SIZE),
            index: ChainedIndex::new(BUCKETS),
            fed: 0,
        };
        operator.fill()?;
        Ok(operator)
    }
    fn pos(&self) -> usize {
        self.window.cursor() as usize
    }
    /// unprocessed bytes between cursor and head
    fn remaining(&self) -> usize {
        self.fed - self.pos()
    }
    /// Top the lookahead back up to `MAX_MATCH` bytes.  When the window is
    /// full, each insert pushes the oldest position out, and its 3-byte key
    /// is retired from the index before the byte is overwritten.
    fn fill(&mut self) -> Result<(), Error> {
        while self.fed < self.input.len() && self.fed - self.pos() < MAX_MATCH {
            if self.window.is_full() {
                let leaving = self.window.head() + 1 - WINDOW_SIZE as i64;
                let key = self.key_at(leaving)?;
                self.index.remove_oldest(&key);
            }
            self.window.insert(self.input[self.fed]);
            self.fed += 1;
        }
        Ok(())
    }
    fn key_at(&self, pos: i64) -> Result<[u8; 3], Error> {
        Ok([
            self.window.get_abs(pos)?,
            self.window.get_abs(pos + 1)?,
            self.window.get_abs(pos + 2)?,
        ])
    }
    /// Length and offset of the longest match between the lookahead and
    /// the prefix, `(0, 0)` when no match key exists.  Candidates come
    /// newest first, so on equal length the smallest offset wins; the scan
    /// stops early on a maximal match or once candidates leave the prefix.
    fn find_longest_match(&self) -> Result<(usize, usize), Error> {
        let pos = self.pos();
        if self.remaining() < THRESHOLD {
            return Ok((0, 0));
        }
        let cap = MAX_MATCH.min(self.remaining());
        let key = self.key_at(pos as i64)?;
        let mut max_length = 0;
        let mut max_offset = 0;
        for &candidate in self.index.candidates(&key) {
            let offset = pos - candidate;
            if offset > PREFIX_SIZE {
                break;
            }
            let mut length = 0;
            while length < cap
                && self.window.read(length as i64 - offset as i64)?
                    == self.window.read(length as i64)?
            {
                length += 1;
            }
            if max_length < length {
                max_length = length;
                max_offset = offset;
                if max_length == cap {
                    break;
                }
            }
        }
        Ok((max_length, max_offset))
    }
    /// Move the cursor forward one step.  The position it leaves behind
    /// enters the prefix: if a full 3-byte key starts there, register it.
    fn slide(&mut self) -> Result<(), Error> {
        let pos = self.pos();
        if pos + THRESHOLD <= self.fed {
            let key = self.key_at(pos as i64)?;
            self.index.insert(&key, pos);
        }
        self.window.advance();
        self.fill()
    }
}

/// Main compression function.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut writer = BitWriter::new();
    writer.write_bytes(&LZSS_TAG.to_be_bytes());

    let mut operator = WindowOperator::new(data)?;
    while operator.remaining() > 0 {
        let (length, offset) = operator.find_longest_match()?;
        let steps = match length >= THRESHOLD {
            true => {
                writer.write_bit(true);
                writer.write_bits(offset as u32, 12);
                writer.write_bits((length - THRESHOLD) as u32, 4);
                length
            }
            false => {
                writer.write_bit(false);
                writer.write_bits(operator.window.read(0)? as u32, 8);
                1
            }
        };
        for _ in 0..steps {
            operator.slide()?;
        }
    }
    // EoF pointer: offset 0 cannot occur in valid data
    writer.write_bit(true);
    writer.write_bits(0, 12);
    writer.write_bits(0, 4);
    let ans = writer.finish();
    log::debug!("encoded {} bytes as {}", data.len(), ans.len());
    Ok(ans)
}

/// Main decompression function.  Only the prefix half of the window is
/// needed; back-references are copied byte by byte so a pointer may reach
/// into the bytes it is itself producing.
pub fn expand(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut reader = BitReader::new(data);
    if reader.read_bytes(4)? != LZSS_TAG.to_be_bytes() {
        return Err(Error::InvalidHeader);
    }
    let mut window: SlidingWindow<u8> = SlidingWindow::new(0, WINDOW_SIZE);
    let mut ans = Vec::new();
    loop {
        match reader.read_bit()? {
            true => {
                let offset = reader.read_bits(12)? as usize;
                let length = reader.read_bits(4)? as usize + THRESHOLD;
                if offset == 0 {
                    return Ok(ans);
                }
                // a pointer cannot reach past the bytes emitted so far
                if offset > ans.len() {
                    return Err(Error::InvalidHeader);
                }
                for _ in 0..length {
                    let b = window.get_abs(ans.len() as i64 - offset as i64)?;
                    window.insert(b);
                    ans.push(b);
                }
            }
            false => {
                let b = reader.read_bits(8)? as u8;
                window.insert(b);
                ans.push(b);
            }
        }
    }
}

// *************** TESTS *****************

#[cfg(test)]
fn scan_blocks(compressed: &[u8]) -> (usize, usize) {
    // parse the stream like the decoder, checking every pointer's ranges;
    // returns (literal count, pointer count) up to the EoF pointer
    let mut reader = BitReader::new(compressed);
    assert_eq!(reader.read_bytes(4).unwrap(), LZSS_TAG.to_be_bytes());
    let mut literals = 0;
    let mut pointers = 0;
    loop {
        match reader.read_bit().unwrap() {
            true => {
                let offset = reader.read_bits(12).unwrap() as usize;
                let length = reader.read_bits(4).unwrap() as usize;
                if offset == 0 {
                    assert_eq!(length, 0);
                    return (literals, pointers);
                }
                assert!((1..=4095).contains(&offset));
                assert!(length <= 15);
                pointers += 1;
            }
            false => {
                reader.read_bits(8).unwrap();
                literals += 1;
            }
        }
    }
}

#[test]
fn empty_input_wire_format() {
    // tag plus a bare EoF pointer
    let compressed = compress(b"").expect("compression failed");
    assert_eq!(compressed, hex::decode("07072017800000").unwrap());
    let expanded = expand(&compressed).expect("expansion failed");
    assert!(expanded.is_empty());
}

#[test]
fn compression_works() {
    // three literals, then one pointer (offset 3, length 6), then EoF
    let test_data = "ABCABCABC".as_bytes();
    let compressed = compress(test_data).expect("compression failed");
    assert_eq!(compressed, hex::decode("070720172090887003380000").unwrap());
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(), expanded);
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress(test_data).expect("compression failed");
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(), expanded);
}

#[test]
fn overlapping_back_reference() {
    // runs force pointers whose offset is smaller than their length;
    // 199 = 1 literal + 11 maximal pointers of 18
    let test_data = vec![b'x'; 199];
    let compressed = compress(&test_data).expect("compression failed");
    let (literals, pointers) = scan_blocks(&compressed);
    assert_eq!(literals, 1);
    assert_eq!(pointers, 11);
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(test_data, expanded);
}

#[test]
fn repetitive_input_is_pointer_dominated() {
    let test_data: Vec<u8> = "ABC".as_bytes().repeat(500);
    let compressed = compress(&test_data).expect("compression failed");
    let (literals, pointers) = scan_blocks(&compressed);
    assert_eq!(literals, 3);
    assert!(pointers > literals);
    assert!(compressed.len() < test_data.len() / 4);
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(test_data, expanded);
}

#[test]
fn input_larger_than_window() {
    // repeats longer than the 4095-byte prefix keep matching after the
    // index starts retiring old positions
    let test_data: Vec<u8> = "0123456789abcdef".as_bytes().repeat(1024);
    let compressed = compress(&test_data).expect("compression failed");
    scan_blocks(&compressed);
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
fn pointer_past_output_is_rejected() {
    // correctly tagged stream opening with a pointer into output that
    // does not exist yet
    let mut writer = BitWriter::new();
    writer.write_bytes(&LZSS_TAG.to_be_bytes());
    writer.write_bit(true);
    writer.write_bits(5, 12);
    writer.write_bits(0, 4);
    assert_eq!(expand(&writer.finish()), Err(Error::InvalidHeader));
}

#[test]
fn truncation_is_detected() {
    let compressed = compress("ABC".repeat(500).as_bytes()).expect("compression failed");
    assert_eq!(expand(&compressed[..4]), Err(Error::UnexpectedEndOfStream));
    assert_eq!(expand(&compressed[..5]), Err(Error::UnexpectedEndOfStream));
}
