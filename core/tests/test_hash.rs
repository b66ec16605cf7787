// # Hashing stages: running accumulator, CRC-32 table and digests

use proptest::prelude::*;

use strawpipe_core::chain::{PipeChain, PipeStage, StrawChain, StrawStage};
use strawpipe_core::crypto::{crc32, CrcAccumulator, DigestAlg, DigestStage, HashPrimitive};
use strawpipe_core::io::{BufferStraw, VecPipe};

// ## 1️⃣ Accumulator

#[test]
fn peek_fold_does_not_mutate() {
    let mut acc = CrcAccumulator::new();
    acc.submit_buffer(&[9, 8, 7, 6, 5, 4]);
    assert_eq!(acc.staged(), 2);

    let first = acc.value();
    let second = acc.value();
    assert_eq!(first, second);
    assert_eq!(acc.staged(), 2);
}

#[test]
fn partial_word_is_zero_extended() {
    let mut acc = CrcAccumulator::new();
    acc.submit_byte(0xAB);
    assert_eq!(acc.value(), 0x0000_00AB);
    acc.submit_byte(0xCD);
    assert_eq!(acc.value(), 0x0000_CDAB);
}

proptest! {
    #[test]
    fn buffer_and_byte_submission_agree(data in proptest::collection::vec(any::<u8>(), 0..200)) {
        let mut whole = CrcAccumulator::new();
        let v1 = whole.submit_buffer(&data);

        let mut single = CrcAccumulator::new();
        for &b in &data {
            single.submit_byte(b);
        }
        prop_assert_eq!(v1, single.value());
        prop_assert_eq!(whole, single);
    }

    #[test]
    fn crc32_matches_crc32fast(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        prop_assert_eq!(crc32::checksum(&data), crc32fast::hash(&data));
    }
}

// ## 2️⃣ Hashing stages inside chains

#[test]
fn crc_straw_sees_every_pulled_byte() {
    let data: Vec<u8> = (0..=255u8).cycle().take(1001).collect();
    let mut c = StrawChain::default();
    let src = c.add(StrawStage::Buffer(BufferStraw::new(data.clone())));
    let crc = c.add(StrawStage::Crc(CrcAccumulator::new()));
    c.attach_upstream(crc, Some(src)).unwrap();

    let mut out = Vec::new();
    c.read_to_end(crc, &mut out).unwrap();
    assert_eq!(out, data);

    let mut expected = CrcAccumulator::new();
    expected.submit_buffer(&data);
    match c.stage(crc).unwrap() {
        StrawStage::Crc(acc) => assert_eq!(acc.value(), expected.value()),
        other => panic!("unexpected stage {other:?}"),
    }
}

#[test]
fn digest_pipe_hashes_and_forwards() {
    let mut c = PipeChain::default();
    let sha = c.add(PipeStage::Digest(DigestStage::sha1()));
    let sink = c.add(PipeStage::Vec(VecPipe::new()));
    c.attach_downstream(sha, Some(sink)).unwrap();

    c.put(sha, b"a").unwrap();
    c.put(sha, b"bc").unwrap();
    match c.stage(sha).unwrap() {
        PipeStage::Digest(d) => {
            assert_eq!(d.hex_digest(), "a9993e364706816aba3e25717850c26c9cd0d89d");
            assert_eq!(d.bytes_hashed(), 3);
        }
        other => panic!("unexpected stage {other:?}"),
    }
    match c.stage(sink).unwrap() {
        PipeStage::Vec(v) => assert_eq!(v.contents(), b"abc"),
        other => panic!("unexpected stage {other:?}"),
    }
}

#[test]
fn crc_pipe_observes_and_forwards() {
    let data: Vec<u8> = (0..77u8).collect();
    let mut c = PipeChain::default();
    let crc = c.add(PipeStage::Crc(CrcAccumulator::new()));
    let sink = c.add(PipeStage::Vec(VecPipe::new()));
    c.attach_downstream(crc, Some(sink)).unwrap();

    for piece in data.chunks(10) {
        assert_eq!(c.put(crc, piece).unwrap(), piece.len());
    }
    assert_eq!(c.end(crc).unwrap(), 0);

    let mut expected = CrcAccumulator::new();
    expected.submit_buffer(&data);
    match c.stage(crc).unwrap() {
        PipeStage::Crc(acc) => assert_eq!(acc.value(), expected.value()),
        other => panic!("unexpected stage {other:?}"),
    }
    match c.stage(sink).unwrap() {
        PipeStage::Vec(v) => assert_eq!(v.contents(), &data[..]),
        other => panic!("unexpected stage {other:?}"),
    }
}

#[test]
fn disabled_digest_passes_bytes_unhashed() {
    let mut c = StrawChain::default();
    let src = c.add(StrawStage::Buffer(BufferStraw::new(&b"skipped"[..])));
    let mut stage = DigestStage::new(DigestAlg::Sha256);
    stage.disable();
    let sha = c.add(StrawStage::Digest(stage));
    c.attach_upstream(sha, Some(src)).unwrap();

    let mut out = Vec::new();
    c.read_to_end(sha, &mut out).unwrap();
    assert_eq!(out, b"skipped");

    let empty = DigestStage::new(DigestAlg::Sha256).digest();
    match c.stage_mut(sha).unwrap() {
        StrawStage::Digest(d) => {
            assert_eq!(d.bytes_hashed(), 0);
            assert_eq!(d.digest(), empty);
            d.enable();
            d.observe(b"now");
            assert_eq!(d.bytes_hashed(), 3);
        }
        other => panic!("unexpected stage {other:?}"),
    }
}

/// Toy primitive: byte sum, to check pluggability.
struct ByteSum(u64);

impl HashPrimitive for ByteSum {
    fn update(&mut self, data: &[u8]) {
        self.0 += data.iter().map(|&b| b as u64).sum::<u64>();
    }

    fn result(&self) -> Vec<u8> {
        self.0.to_be_bytes().to_vec()
    }

    fn output_len(&self) -> usize {
        8
    }
}

#[test]
fn custom_hash_primitive_plugs_in() {
    let mut d = DigestStage::with_primitive(Box::new(ByteSum(0)));
    d.observe(&[1, 2, 3]);
    assert_eq!(d.digest(), 6u64.to_be_bytes().to_vec());
    assert_eq!(d.digest_len(), 8);
}
