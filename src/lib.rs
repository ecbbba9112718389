//! Byte-stream compression with three interchangeable codecs.
//!
//! Each codec transforms a complete in-memory buffer and prepends a fixed
//! 4-byte tag, so a compressed stream identifies its own codec and can be
//! round-tripped without external metadata.  The codecs share one contract
//! ([`Codec`]) and compose freely: the output of one can be fed to another
//! and unwound in the opposite order.
//!
//! * `huffman` - static Huffman coding, tree transmitted in the header
//! * `lzss` - sliding-window back-references with a hash-chain match finder
//! * `lzw` - adaptive dictionary with growing code width (9 to 16 bits)
//!
//! ```
//! use tripack::{Codec, huffman::Huffman, lzss::Lzss};
//!
//! let data = b"sells seashells on the seashore".to_vec();
//! let packed = Lzss.compress(&data).unwrap();
//! let packed = Huffman.compress(&packed).unwrap();
//! let unwound = Huffman.decompress(&packed).unwrap();
//! assert_eq!(Lzss.decompress(&unwound).unwrap(), data);
//! ```

mod tools;
pub mod huffman;
pub mod lzss;
pub mod lzw;

/// Terminal errors of a compress or decompress call.
///
/// No partial output is valid: a call either returns the whole transformed
/// buffer or one of these.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The stream does not begin with the tag of the codec asked to decode it.
    #[error("stream tag does not match codec")]
    InvalidHeader,
    /// The stream ran out before its end-of-stream marker was reached.
    #[error("stream ended before end-of-stream marker")]
    UnexpectedEndOfStream,
    /// Access outside the live range of a sliding window.
    #[error("window access out of bounds")]
    OutOfBounds,
}

/// Contract shared by the three codecs.
///
/// All working state lives inside a single call, so one codec value can
/// serve concurrent calls on independent inputs.
pub trait Codec {
    /// Display label only, carries no logic.
    fn name(&self) -> &'static str;
    /// Compress a complete buffer.  Never fails on well-formed input;
    /// empty input yields a valid header plus an immediate end marker.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error>;
    /// Invert [`Codec::compress`].  Fails with [`Error::InvalidHeader`] if
    /// the tag belongs to another codec, [`Error::UnexpectedEndOfStream`]
    /// if the stream is truncated.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error>;
}
