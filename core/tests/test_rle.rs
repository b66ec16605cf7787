// # Zero-run RLE: codec, framed registry codecs, streaming and chain stages

use std::io::Cursor;

use proptest::prelude::*;

use strawpipe_core::chain::{PipeChain, PipeStage};
use strawpipe_core::compression::stream::{compress_stream, decompress_stream};
use strawpipe_core::compression::{
    codec_ids, create_compressor, create_decompressor, resolve, rle, CodecError, CodecMode,
};
use strawpipe_core::config::ChainConfig;
use strawpipe_core::io::VecPipe;
use strawpipe_core::types::PipelineError;

fn roundtrip(data: &[u8]) -> Vec<u8> {
    let mut enc = Vec::new();
    let written = rle::compress(data, &mut enc);
    assert_eq!(written, enc.len());
    assert!(enc.len() <= 2 * data.len());

    let mut dec = Vec::new();
    rle::decompress(&enc, &mut dec).unwrap();
    dec
}

// ## 1️⃣ Plain codec

#[test]
fn sixteen_zero_bytes() {
    let data = [0u8; 16];
    let mut enc = Vec::new();
    rle::compress(&data, &mut enc);
    assert_eq!(enc, [0x00, 16]);
    assert_eq!(roundtrip(&data), data);
}

#[test]
fn three_hundred_zeros_use_several_markers() {
    let data = vec![0u8; 300];
    let mut enc = Vec::new();
    rle::compress(&data, &mut enc);
    assert_eq!(enc, [0x00, 255, 0x00, 45]);
    assert_eq!(roundtrip(&data), data);
}

#[test]
fn all_nonzero_is_literal() {
    let data: Vec<u8> = (1..=255u8).collect();
    let mut enc = Vec::new();
    rle::compress(&data, &mut enc);
    assert_eq!(enc, data);
}

#[test]
fn empty_input() {
    assert!(roundtrip(&[]).is_empty());
}

proptest! {
    #[test]
    fn round_trip_sparse(data in proptest::collection::vec(prop_oneof![3 => Just(0u8), 1 => any::<u8>()], 0..2000)) {
        prop_assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn line_round_trip(data in proptest::collection::vec(any::<u8>(), 0..600)) {
        let mut line = Vec::new();
        rle::compress_line(&data, &mut line).unwrap();
        prop_assert_eq!(rle::line_decoded_len(&line), Some(data.len()));
        prop_assert_eq!(rle::line_extent(&line).unwrap(), Some(line.len()));

        let mut out = Vec::new();
        let res = rle::decompress_line(&line, &mut out).unwrap();
        prop_assert_eq!(res.consumed, line.len());
        prop_assert_eq!(res.written, data.len());
        prop_assert_eq!(out, data);
    }
}

#[test]
fn dangling_marker_is_reported() {
    let mut out = Vec::new();
    assert!(matches!(rle::decompress(&[5, 0], &mut out), Err(CodecError::Truncated { .. })));
}

#[test]
fn fixed_destination_reports_shortfall() {
    let mut dst = [0u8; 3];
    assert!(matches!(
        rle::decompress_into(&[0, 10], &mut dst),
        Err(CodecError::OutputTooSmall { .. })
    ));
}

// ## 2️⃣ Registry and streaming

#[test]
fn registry_knows_both_codecs() {
    assert_eq!(resolve(codec_ids::RAW).unwrap().name, "raw");
    assert_eq!(resolve(codec_ids::RLE).unwrap().max_expansion, 2);
    assert!(matches!(resolve(0x7777), Err(CodecError::UnsupportedCodec { raw: 0x7777 })));
}

#[test]
fn stream_round_trip_through_rle_frames() {
    let data: Vec<u8> = (0..10_000u32).map(|i| if i % 50 < 40 { 0 } else { (i % 200) as u8 + 1 }).collect();

    let frames: Vec<Vec<u8>> = compress_stream(
        Cursor::new(data.clone()),
        1024,
        create_compressor(codec_ids::RLE, Some(256)).unwrap(),
    )
    .collect::<Result<_, _>>()
    .unwrap();
    assert_eq!(frames.len(), 10);

    let joined: Vec<u8> = frames.concat();
    assert!(joined.len() < data.len());

    let decoded: Vec<Vec<u8>> =
        decompress_stream(Cursor::new(joined), create_decompressor(codec_ids::RLE).unwrap())
            .collect::<Result<_, _>>()
            .unwrap();
    assert_eq!(decoded.concat(), data);
}

#[test]
fn corrupted_frame_fails_checksum() {
    let frames: Vec<Vec<u8>> = compress_stream(
        Cursor::new(vec![1u8, 2, 3, 0, 0, 0, 4]),
        64,
        create_compressor(codec_ids::RAW, None).unwrap(),
    )
    .collect::<Result<_, _>>()
    .unwrap();

    let mut bad = frames.concat();
    bad[8] ^= 0xFF;
    let res: Result<Vec<Vec<u8>>, _> =
        decompress_stream(Cursor::new(bad), create_decompressor(codec_ids::RAW).unwrap()).collect();
    assert!(matches!(res, Err(CodecError::ChecksumMismatch { .. })));
}

#[test]
fn truncated_stream_is_reported() {
    let frames: Vec<Vec<u8>> = compress_stream(
        Cursor::new(vec![9u8; 100]),
        64,
        create_compressor(codec_ids::RLE, None).unwrap(),
    )
    .collect::<Result<_, _>>()
    .unwrap();

    let mut joined = frames.concat();
    joined.truncate(joined.len() - 3);
    let res: Result<Vec<Vec<u8>>, _> =
        decompress_stream(Cursor::new(joined), create_decompressor(codec_ids::RLE).unwrap()).collect();
    assert!(matches!(res, Err(CodecError::Truncated { .. })));
}

// ## 3️⃣ RLE stages in a push chain

#[test]
fn compress_then_decompress_pipe_chain() {
    let data: Vec<u8> = (0..5000u32).map(|i| if i % 9 < 6 { 0 } else { i as u8 | 0x80 }).collect();

    let mut c = PipeChain::new(ChainConfig::new(None, Some(512)));
    let comp = c.add_rle(CodecMode::Compress).unwrap();
    let decomp = c.add_rle(CodecMode::Decompress).unwrap();
    let sink = c.add(PipeStage::Vec(VecPipe::new()));
    c.attach_downstream(comp, Some(decomp)).unwrap();
    c.attach_downstream(decomp, Some(sink)).unwrap();

    for piece in data.chunks(333) {
        assert_eq!(c.put(comp, piece).unwrap(), piece.len());
    }
    c.end(comp).unwrap();

    match c.stage(sink).unwrap() {
        PipeStage::Vec(v) => assert_eq!(v.contents(), &data[..]),
        other => panic!("unexpected stage {other:?}"),
    }
    // 5000 bytes in 512-byte lines.
    assert_eq!(c.graph().counters(comp).unwrap().blocks, 10);
}

#[test]
fn corrupt_line_forwards_earlier_lines_and_resyncs() {
    let mut good = Vec::new();
    rle::compress_line(&[5, 0, 0, 6], &mut good).unwrap();
    // Header says 3 bytes, body starts with a zero-length run.
    let bad = [3u8, 0, 0x00, 0x00, 1];

    let mut c = PipeChain::default();
    let decomp = c.add_rle(CodecMode::Decompress).unwrap();
    let sink = c.add(PipeStage::Vec(VecPipe::new()));
    c.attach_downstream(decomp, Some(sink)).unwrap();

    let mut input = good.clone();
    input.extend_from_slice(&bad);
    assert!(matches!(
        c.put(decomp, &input),
        Err(PipelineError::Codec(CodecError::ZeroRun { offset: 2 }))
    ));
    match c.stage(sink).unwrap() {
        PipeStage::Vec(v) => assert_eq!(v.contents(), [5, 0, 0, 6]),
        other => panic!("unexpected stage {other:?}"),
    }

    assert_eq!(c.put(decomp, &good).unwrap(), good.len());
    match c.stage(sink).unwrap() {
        PipeStage::Vec(v) => assert_eq!(v.contents(), [5, 0, 0, 6, 5, 0, 0, 6]),
        other => panic!("unexpected stage {other:?}"),
    }
}
