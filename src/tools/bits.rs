//! Bit-level reader and writer over byte buffers.
//!
//! All three codecs speak through these two structs.  Bits are packed
//! MSB-first within each byte, and multi-bit values go out most significant
//! bit first, so whole-byte operations at a byte boundary read naturally in
//! a hex dump.

use crate::Error;
use bit_vec::BitVec;

/// Input cursor over a byte buffer, advancing one bit at a time.
pub struct BitReader<'a> {
    buf: &'a [u8],
    ptr: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, ptr: 0 }
    }
    /// Next bit, or `UnexpectedEndOfStream` when the buffer is spent.
    pub fn read_bit(&mut self) -> Result<bool, Error> {
        let byte = self
            .buf
            .get(self.ptr >> 3)
            .ok_or(Error::UnexpectedEndOfStream)?;
        let bit = (byte >> (7 - (self.ptr & 7))) & 1;
        self.ptr += 1;
        Ok(bit == 1)
    }
    /// Next `num_bits` bits as an unsigned value, MSB first.
    pub fn read_bits(&mut self, num_bits: usize) -> Result<u32, Error> {
        let mut ans: u32 = 0;
        for _ in 0..num_bits {
            ans = (ans << 1) | self.read_bit()? as u32;
        }
        Ok(ans)
    }
    /// Next `count` bytes, irrespective of the current bit offset.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, Error> {
        let mut ans = Vec::with_capacity(count);
        for _ in 0..count {
            ans.push(self.read_bits(8)? as u8);
        }
        Ok(ans)
    }
}

/// Output accumulator.  Nothing reaches the final buffer until `finish`,
/// which zero-pads the trailing partial byte.
pub struct BitWriter {
    bits: BitVec,
}

impl BitWriter {
    pub fn new() -> Self {
        Self { bits: BitVec::new() }
    }
    pub fn write_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }
    /// Write the low `num_bits` bits of `value`, MSB first.  Does not check
    /// that `value` fits; excess high bits are simply dropped.
    pub fn write_bits(&mut self, value: u32, num_bits: usize) {
        for i in (0..num_bits).rev() {
            self.bits.push((value >> i) & 1 == 1);
        }
    }
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_bits(b as u32, 8);
        }
    }
    /// Flush to bytes, zero-padding the last partial byte.
    pub fn finish(self) -> Vec<u8> {
        self.bits.to_bytes()
    }
}

// *************** TESTS *****************

#[test]
fn bits_pack_msb_first() {
    let mut w = BitWriter::new();
    w.write_bit(true);
    w.write_bits(0b101, 3);
    w.write_bits(0x0f, 4);
    assert_eq!(w.finish(), vec![0b1101_1111]);
}

#[test]
fn partial_byte_is_zero_padded() {
    let mut w = BitWriter::new();
    w.write_bits(0b11, 2);
    w.write_bytes(&[0xff]);
    assert_eq!(w.finish(), vec![0b1111_1111, 0b1100_0000]);
}

#[test]
fn unaligned_bytes_round_trip() {
    let mut w = BitWriter::new();
    w.write_bit(false);
    w.write_bytes(&[0xde, 0xad, 0xbe, 0xef]);
    w.write_bits(0x123, 12);
    let buf = w.finish();

    let mut r = BitReader::new(&buf);
    assert!(!r.read_bit().expect("read failed"));
    assert_eq!(r.read_bytes(4).expect("read failed"), vec![0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(r.read_bits(12).expect("read failed"), 0x123);
}

#[test]
fn overread_fails() {
    let mut r = BitReader::new(&[0xab]);
    assert_eq!(r.read_bits(8).expect("read failed"), 0xab);
    assert_eq!(r.read_bit(), Err(Error::UnexpectedEndOfStream));

    let mut r = BitReader::new(&[0xab]);
    assert_eq!(r.read_bytes(2), Err(Error::UnexpectedEndOfStream));
}
