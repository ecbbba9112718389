//! LZW compression with variable-width codes.
//!
//! The dictionary starts with the 256 single-byte sequences plus a
//! reserved end-of-stream code at 256, and grows one entry per emitted
//! code.  Codes are written MSB first at the smallest width (at least 9,
//! at most 16 bits) that leaves room for the next entry the decoder will
//! create; both ends derive the width from their dictionary size alone, so
//! nothing about widths travels in the stream.  When the dictionary hits
//! 2^16 entries it is flushed back to its initial state and the width
//! drops to 9 again.
//!
//! The decoder's dictionary trails the encoder's by one insert (it learns
//! an entry's last byte only from the following code), which is also why
//! a code equal to the dictionary size is legal: it is the entry the
//! encoder just defined, whose sequence is the previous output plus its
//! own first byte.

use crate::tools::bits::{BitReader, BitWriter};
use crate::tools::trie::PrefixTrie;
use crate::Error;

/// Identifier at the head of LZW compressed streams.
pub const LZW_TAG: u32 = 0x0409_2009;

/// Reserved dictionary slot marking the end of the stream.
const EOF_CODE: usize = 256;
const MIN_WIDTH: usize = 9;
const MAX_WIDTH: usize = 16;
/// Dictionary size that triggers a flush.
const MAX_ENTRIES: usize = 1 << MAX_WIDTH;

/// LZW codec handle.
pub struct Lzw;

impl crate::Codec for Lzw {
    fn name(&self) -> &'static str {
        "LZW"
    }
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        compress(data)
    }
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        expand(data)
    }
}

/// Smallest width that can hold every index the dictionary could need one
/// insert from now.  The encoder passes its dictionary size for data codes
/// and size + 1 for the EoF; the decoder, whose inserts trail the
/// encoder's by one until the final data code, always passes size + 1.
/// The two agree at every code boundary.
fn width_for(entries: usize) -> usize {
    let mut width = MIN_WIDTH;
    while entries + 1 >= 1 << width && width < MAX_WIDTH {
        width += 1;
    }
    width
}

/// Main compression function.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut writer = BitWriter::new();
    writer.write_bytes(&LZW_TAG.to_be_bytes());

    let mut dict = PrefixTrie::new();
    let mut current: Option<usize> = None;
    for &b in data {
        current = match current {
            None => Some(b as usize),
            Some(index) => match dict.child(index, b) {
                Some(longer) => Some(longer),
                None => {
                    writer.write_bits(index as u32, width_for(dict.len()));
                    dict.push(index, b);
                    if dict.len() == MAX_ENTRIES {
                        log::debug!("dictionary full, flushing");
                        dict.reset();
                    }
                    Some(b as usize)
                }
            },
        };
    }
    if let Some(index) = current {
        writer.write_bits(index as u32, width_for(dict.len()));
    }
    // no insert follows the final data code, so the decoder has caught up
    // by the time it reads the EoF; size it for equal dictionaries
    writer.write_bits(EOF_CODE as u32, width_for(dict.len() + 1));
    Ok(writer.finish())
}

/// Main decompression function.
pub fn expand(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut reader = BitReader::new(data);
    if reader.read_bytes(4)? != LZW_TAG.to_be_bytes() {
        return Err(Error::InvalidHeader);
    }
    let mut dict = PrefixTrie::new();
    let mut prev: Option<(usize, Vec<u8>)> = None;
    let mut ans = Vec::new();
    loop {
        let code = reader.read_bits(width_for(dict.len() + 1))? as usize;
        if code == EOF_CODE {
            return Ok(ans);
        }
        let bytes = match dict.bytes(code) {
            Some(bytes) => bytes,
            // the code the encoder defined one step ago: previous sequence
            // extended by its own first byte
            None => match &prev {
                Some((_, seq)) if code == dict.len() => {
                    let mut bytes = seq.clone();
                    bytes.push(seq[0]);
                    bytes
                }
                _ => return Err(Error::InvalidHeader),
            },
        };
        if let Some((prev_code, _)) = &prev {
            dict.push(*prev_code, bytes[0]);
        }
        ans.extend_from_slice(&bytes);
        if dict.len() == MAX_ENTRIES - 1 {
            // one insert behind the encoder's flush point
            log::debug!("dictionary full, flushing");
            dict.reset();
            prev = None;
        } else {
            prev = Some((code, bytes));
        }
    }
}

// *************** TESTS *****************

#[test]
fn empty_input_wire_format() {
    // tag, then the 9-bit EoF code 1_0000_0000, zero-padded
    let compressed = compress(b"").expect("compression failed");
    assert_eq!(compressed, hex::decode("040920098000").unwrap());
    let expanded = expand(&compressed).expect("expansion failed");
    assert!(expanded.is_empty());
}

#[test]
fn compression_works() {
    // codes 65 ("A"), 257 ("AA", defined one step earlier), 65, EoF,
    // all at width 9
    let test_data = "AAAA".as_bytes();
    let compressed = compress(test_data).expect("compression failed");
    assert_eq!(compressed, hex::decode("0409200920C0483000").unwrap());
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(), expanded);
}

#[test]
fn invertibility() {
    let test_data = "TOBEORNOTTOBEORTOBEORNOT#".as_bytes();
    let compressed = compress(test_data).expect("compression failed");
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(), expanded);
}

#[test]
fn code_width_grows_with_dictionary() {
    // enough low-redundancy data to push the dictionary past 511 and 1023
    // entries, so 9-, 10- and 11-bit codes all appear in one stream
    let test_data: Vec<u8> = (0u32..20_000)
        .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
        .collect();
    let compressed = compress(&test_data).expect("compression failed");
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(test_data, expanded);
}

#[test]
fn eof_lands_on_width_boundary() {
    // 254 distinct bytes make 253 dictionary inserts, so the encoder
    // finishes with exactly 510 entries and the EoF is the first code
    // that needs 10 bits
    let test_data: Vec<u8> = (0u8..=253).collect();
    let compressed = compress(&test_data).expect("compression failed");
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
fn bad_code_is_rejected() {
    // after the tag the dictionary holds 257 entries, so the only codes a
    // valid stream may open with are 0-255 and EoF; 258 is out of range
    let mut writer = BitWriter::new();
    writer.write_bytes(&LZW_TAG.to_be_bytes());
    writer.write_bits(258, 9);
    assert_eq!(expand(&writer.finish()), Err(Error::InvalidHeader));
}

#[test]
fn truncation_is_detected() {
    let compressed = compress("AAAA".repeat(100).as_bytes()).expect("compression failed");
    assert_eq!(expand(&compressed[..4]), Err(Error::UnexpectedEndOfStream));
    assert_eq!(expand(&compressed[..5]), Err(Error::UnexpectedEndOfStream));
}
