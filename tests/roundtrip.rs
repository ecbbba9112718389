//! Round-trip tests exercising all three codecs through the `Codec` trait.

use rand::{Rng, SeedableRng};
use tripack::huffman::Huffman;
use tripack::lzss::Lzss;
use tripack::lzw::Lzw;
use tripack::{Codec, Error};

fn codecs() -> Vec<Box<dyn Codec>> {
    vec![Box::new(Huffman), Box::new(Lzss), Box::new(Lzw)]
}

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

#[test]
fn all_codecs_round_trip_all_shapes() {
    let _ = env_logger::builder().is_test(true).try_init();
    let corpora: Vec<Vec<u8>> = vec![
        vec![],
        vec![0x42],
        vec![b'A'; 5000],
        "sells seashells on the seashore".as_bytes().repeat(200),
        random_bytes(1 << 20, 0xC0FFEE),
    ];
    for codec in codecs() {
        for data in &corpora {
            let compressed = codec.compress(data).expect("compression failed");
            let expanded = codec.decompress(&compressed).expect("expansion failed");
            assert_eq!(
                data, &expanded,
                "{} failed on a {}-byte input",
                codec.name(),
                data.len()
            );
        }
    }
}

#[test]
fn repetitive_input_shrinks() {
    let data = "sells seashells on the seashore".as_bytes().repeat(200);
    for codec in codecs() {
        let compressed = codec.compress(&data).expect("compression failed");
        assert!(
            compressed.len() < data.len(),
            "{} did not shrink repetitive input",
            codec.name()
        );
    }
}

#[test]
fn codecs_compose_in_any_order() {
    // output of one codec is a valid input for any other; unwinding in
    // reverse order restores the original
    let data = "I am Sam. Sam I am. I do not like this Sam I am.\n"
        .as_bytes()
        .repeat(40);
    for outer in codecs() {
        for inner in codecs() {
            let packed = outer
                .compress(&inner.compress(&data).expect("compression failed"))
                .expect("compression failed");
            let unwound = inner
                .decompress(&outer.decompress(&packed).expect("expansion failed"))
                .expect("expansion failed");
            assert_eq!(
                data,
                unwound,
                "{} inside {} failed",
                inner.name(),
                outer.name()
            );
        }
    }
}

#[test]
fn codecs_reject_each_others_streams() {
    let data = b"tagged stream".to_vec();
    for producer in codecs() {
        let compressed = producer.compress(&data).expect("compression failed");
        for consumer in codecs() {
            if consumer.name() == producer.name() {
                continue;
            }
            assert_eq!(
                consumer.decompress(&compressed),
                Err(Error::InvalidHeader),
                "{} accepted a {} stream",
                consumer.name(),
                producer.name()
            );
        }
    }
}

#[test]
fn truncated_streams_are_rejected() {
    let data = random_bytes(10_000, 0xBEEF);
    for codec in codecs() {
        let compressed = codec.compress(&data).expect("compression failed");
        for cut in [4, 5, compressed.len() / 2] {
            assert_eq!(
                codec.decompress(&compressed[..cut]),
                Err(Error::UnexpectedEndOfStream),
                "{} accepted a stream cut at {}",
                codec.name(),
                cut
            );
        }
    }
}

#[test]
fn names_are_stable() {
    let labels: Vec<&str> = codecs().iter().map(|c| c.name()).collect();
    assert_eq!(labels, vec!["Huffman", "LZSS", "LZW"]);
}

#[test]
fn lzw_survives_dictionary_flushes() {
    // a megabyte of random bytes drives the dictionary to 2^16 entries
    // several times over, forcing flushes on both ends
    let data = random_bytes(1 << 20, 0x5EED);
    let compressed = tripack::lzw::compress(&data).expect("compression failed");
    let expanded = tripack::lzw::expand(&compressed).expect("expansion failed");
    assert_eq!(data, expanded);
}
