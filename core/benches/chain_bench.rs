// In core/benches/chain_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use strawpipe_core::chain::{PipeChain, PipeStage, StrawChain, StrawStage};
use strawpipe_core::compression::{rle, CodecMode};
use strawpipe_core::config::ChainConfig;
use strawpipe_core::crypto::{CipherMode, CrcAccumulator};
use strawpipe_core::io::{BufferStraw, VecPipe};

const BENCH_DATA_SIZE: usize = 65536; // 64 KB

/// Sprite-like rows: mostly zero with short opaque spans.
fn generate_sparse_bytes(size: usize) -> Vec<u8> {
    (0..size).map(|i| if i % 64 < 48 { 0 } else { (i % 251) as u8 | 1 }).collect()
}

fn bench_kernels(c: &mut Criterion) {
    let data = generate_sparse_bytes(BENCH_DATA_SIZE);
    let mut encoded = Vec::new();
    rle::compress(&data, &mut encoded);

    let mut group = c.benchmark_group("Kernels");
    group.throughput(Throughput::Bytes(BENCH_DATA_SIZE as u64));

    group.bench_function("RLE compress", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(rle::max_compressed_len(data.len()));
            rle::compress(black_box(&data), &mut out);
            black_box(out)
        })
    });
    group.bench_function("RLE decompress", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(data.len());
            rle::decompress(black_box(&encoded), &mut out).unwrap();
            black_box(out)
        })
    });
    group.bench_function("CRC accumulator", |b| {
        b.iter(|| CrcAccumulator::new().submit_buffer(black_box(&data)))
    });
    group.finish();
}

fn bench_chains(c: &mut Criterion) {
    let data = generate_sparse_bytes(BENCH_DATA_SIZE);

    let mut group = c.benchmark_group("Chains");
    group.throughput(Throughput::Bytes(BENCH_DATA_SIZE as u64));

    group.bench_function("Straw buffer -> cache -> crc", |b| {
        b.iter(|| {
            let mut chain = StrawChain::new(ChainConfig::default());
            let src = chain.add(StrawStage::Buffer(BufferStraw::new(data.clone())));
            let cache = chain.add_cache();
            let crc = chain.add(StrawStage::Crc(CrcAccumulator::new()));
            chain.attach_upstream(cache, Some(src)).unwrap();
            chain.attach_upstream(crc, Some(cache)).unwrap();

            let mut out = Vec::with_capacity(data.len());
            chain.read_to_end(crc, &mut out).unwrap();
            black_box(out)
        })
    });

    group.bench_function("Pipe rle -> blowfish -> vec", |b| {
        b.iter(|| {
            let mut chain = PipeChain::new(ChainConfig::without_telemetry());
            let rle = chain.add_rle(CodecMode::Compress).unwrap();
            let cipher = chain.add_cipher(CipherMode::Encrypt, b"bench key").unwrap();
            let sink = chain.add(PipeStage::Vec(VecPipe::new()));
            chain.attach_downstream(rle, Some(cipher)).unwrap();
            chain.attach_downstream(cipher, Some(sink)).unwrap();

            for piece in data.chunks(4096) {
                chain.put(rle, black_box(piece)).unwrap();
            }
            chain.end(rle).unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_kernels, bench_chains);
criterion_main!(benches);
